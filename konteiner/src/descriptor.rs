//! [Descriptor]s hold a single registered [creator](crate::creator) along with its lifecycle state.
//! A descriptor starts either `Uninitialized` (factories and constructors) or `Initialized`
//! (values). The only transition is `Uninitialized -> Initialized`, which happens the first time
//! an instance is successfully created. Instances are never torn down or re-created.

use crate::container::ContainerView;
use crate::creator::{AnyCreator, Binding, BindingKind, CreatorId};
use crate::error::{RegistrationError, ResolutionError};
use crate::instance::InstanceAnyPtr;
use derivative::Derivative;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

pub type DescriptorPtr = Arc<Descriptor>;

/// Name used for creators without a declared name.
pub const ANONYMOUS: &str = "<anonymous>";

/// A registered creator and its cached instance.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Descriptor {
    creator: AnyCreator,
    display_name: String,
    source_location: Option<String>,
    #[derivative(Debug = "ignore")]
    instance: OnceCell<InstanceAnyPtr>,
    // outgoing edges discovered while constructing the instance
    dependencies: Mutex<Vec<CreatorId>>,
}

impl Descriptor {
    /// Creates a new descriptor. Fails if the creator has neither a name, nor a source location,
    /// since it wouldn't be possible to identify it in diagnostics.
    pub fn new(
        creator: AnyCreator,
        source_location: Option<String>,
    ) -> Result<Self, RegistrationError> {
        let display_name = match (creator.name(), &source_location) {
            (Some(name), _) => name.to_string(),
            (None, Some(location)) => format!("{ANONYMOUS} ({location})"),
            (None, None) => return Err(RegistrationError::AnonymousCreatorWithoutSource),
        };

        let instance = match creator.binding() {
            Binding::Value(value) => OnceCell::with_value(value.clone()),
            Binding::Factory(_) | Binding::Constructor(_) => OnceCell::new(),
        };

        Ok(Self {
            creator,
            display_name,
            source_location,
            instance,
            dependencies: Default::default(),
        })
    }

    #[inline]
    pub fn id(&self) -> CreatorId {
        self.creator.id()
    }

    #[inline]
    pub fn creator(&self) -> &AnyCreator {
        &self.creator
    }

    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[inline]
    pub fn source_location(&self) -> Option<&str> {
        self.source_location.as_deref()
    }

    #[inline]
    pub fn binding_kind(&self) -> BindingKind {
        self.creator.binding_kind()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Returns the cached instance, if already created.
    #[inline]
    pub fn instance(&self) -> Option<InstanceAnyPtr> {
        self.instance.get().cloned()
    }

    /// Returns the cached instance or creates a new one using given view. Concurrent callers
    /// block until the first one finishes, so the creator is invoked at most once. A failed
    /// creation leaves the descriptor uninitialized.
    ///
    /// Note: the view must already contain this descriptor in its ancestors - re-entering
    /// creation of the same descriptor would never finish.
    pub fn get_instance(
        &self,
        container: &ContainerView,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        if let Some(instance) = self.instance.get() {
            trace!("Returning cached instance of {}.", self.display_name);
            return Ok(instance.clone());
        }

        self.instance
            .get_or_try_init(|| match self.creator.binding() {
                Binding::Value(value) => Ok(value.clone()),
                Binding::Factory(factory) => {
                    debug!("Creating {} using a factory...", self.display_name);
                    factory(container)
                }
                Binding::Constructor(constructor) => {
                    debug!("Creating {} using a constructor...", self.display_name);
                    constructor(container)
                }
            })
            .cloned()
    }

    pub(crate) fn record_dependency(&self, dependency: CreatorId) {
        let mut dependencies = self.dependencies.lock();
        if !dependencies.contains(&dependency) {
            dependencies.push(dependency);
        }
    }

    /// Returns ids of creators which were requested while creating the instance.
    pub fn dependencies(&self) -> Vec<CreatorId> {
        self.dependencies.lock().clone()
    }

    /// Returns a simplified copy of the current state, for diagnostics.
    pub fn snapshot(&self) -> DescriptorSnapshot {
        DescriptorSnapshot {
            name: self.display_name.clone(),
            binding_kind: self.binding_kind(),
            source_location: self.source_location.clone(),
            initialized: self.is_initialized(),
            instance: self.instance(),
            dependencies: self.dependencies(),
        }
    }
}

/// Simplified [Descriptor] state, usable for debugging and tooling.
#[derive(Derivative, Clone, Serialize)]
#[derivative(Debug)]
pub struct DescriptorSnapshot {
    pub name: String,
    pub binding_kind: BindingKind,
    pub source_location: Option<String>,
    pub initialized: bool,
    #[derivative(Debug = "ignore")]
    #[serde(skip)]
    pub instance: Option<InstanceAnyPtr>,
    pub dependencies: Vec<CreatorId>,
}
