//! One of the basic blocks of the container is a [Creator] - a strategy for obtaining an instance,
//! which itself can pull other instances from the container.
//!
//! ## Kinds of creators
//!
//! Every creator has a fixed [Binding], decided once when the creator is built:
//!
//! * [Creator::value] - a pre-built value, used as-is and never constructed
//! * [Creator::factory] - a closure receiving a [ContainerView], called at most once
//! * [Creator::constructor] - a type implementing [Construct], constructed at most once
//!
//! ```
//! use konteiner::container::{Container, ContainerView, RegisterOptions};
//! use konteiner::creator::{Construct, Creator};
//! use konteiner::error::ResolutionError;
//! use konteiner::instance::{InstancePtr, TypedInstanceProvider};
//! use once_cell::sync::Lazy;
//!
//! struct Greeting(String);
//!
//! static GREETING: Lazy<Creator<Greeting>> =
//!     Lazy::new(|| Creator::named_value("greeting", Greeting("Hello".to_string())));
//!
//! struct Greeter {
//!     greeting: InstancePtr<Greeting>,
//! }
//!
//! impl Construct for Greeter {
//!     fn construct(container: &ContainerView) -> Result<Self, ResolutionError> {
//!         Ok(Self {
//!             greeting: container.get(&*GREETING)?,
//!         })
//!     }
//! }
//!
//! let greeter = Creator::<Greeter>::constructor();
//! let shout = Creator::named_factory("shout", |container| {
//!     container
//!         .get(&*GREETING)
//!         .map(|greeting| greeting.0.to_uppercase())
//! });
//!
//! let container = Container::new();
//! container.register(&*GREETING, RegisterOptions::default()).unwrap();
//! container.register(&greeter, RegisterOptions::default()).unwrap();
//! container.register(&shout, RegisterOptions::default()).unwrap();
//!
//! assert_eq!(container.get(&greeter).unwrap().greeting.0, "Hello");
//! assert_eq!(*container.get(&shout).unwrap(), "HELLO");
//! ```
//!
//! ## Identity
//!
//! Creators are compared by identity, not by structure. Each creator gets a unique [CreatorId]
//! when built, which is kept by clones. Building two creators from the same closure or type
//! results in two distinct registration targets.

use crate::container::ContainerView;
use crate::error::ResolutionError;
use crate::instance::{InstanceAnyPtr, InstancePtr};
use derivative::Derivative;
use serde::Serialize;
use std::any::type_name;
use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CREATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a creator, used as the registry lookup key.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct CreatorId(u64);

impl CreatorId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CREATOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for CreatorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type-erased creation strategy.
pub type CreationFunction =
    Arc<dyn Fn(&ContainerView) -> Result<InstanceAnyPtr, ResolutionError> + Send + Sync>;

fn creation_function<F>(function: F) -> CreationFunction
where
    F: Fn(&ContainerView) -> Result<InstanceAnyPtr, ResolutionError> + Send + Sync + 'static,
{
    Arc::new(function)
}

/// How a creator produces its instance.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum Binding {
    Value(#[derivative(Debug = "ignore")] InstanceAnyPtr),
    Factory(#[derivative(Debug = "ignore")] CreationFunction),
    Constructor(#[derivative(Debug = "ignore")] CreationFunction),
}

impl Binding {
    #[inline]
    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Value(_) => BindingKind::Value,
            Binding::Factory(_) => BindingKind::Factory,
            Binding::Constructor(_) => BindingKind::Constructor,
        }
    }
}

/// Data-less mirror of [Binding], for diagnostics.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum BindingKind {
    Value,
    Factory,
    Constructor,
}

/// Types which can construct themselves using dependencies from a [ContainerView].
pub trait Construct: Sized + Send + Sync + 'static {
    /// Creates an instance using dependencies pulled from given view.
    fn construct(container: &ContainerView) -> Result<Self, ResolutionError>;
}

#[derive(Debug)]
struct CreatorDefinition {
    id: CreatorId,
    name: Option<String>,
    binding: Binding,
}

/// Type-erased [Creator]. Registries work exclusively with erased creators.
#[derive(Clone, Debug)]
pub struct AnyCreator {
    definition: Arc<CreatorDefinition>,
}

impl AnyCreator {
    fn new(name: Option<String>, binding: Binding) -> Self {
        Self {
            definition: Arc::new(CreatorDefinition {
                id: CreatorId::next(),
                name,
                binding,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> CreatorId {
        self.definition.id
    }

    /// Declared name, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.definition.name.as_deref()
    }

    #[inline]
    pub fn binding(&self) -> &Binding {
        &self.definition.binding
    }

    #[inline]
    pub fn binding_kind(&self) -> BindingKind {
        self.definition.binding.kind()
    }
}

/// Typed strategy for obtaining an instance of `T`. Please see the module-level documentation for
/// more information.
pub struct Creator<T> {
    erased: AnyCreator,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Creator<T> {
    fn from_binding(name: Option<String>, binding: Binding) -> Self {
        Self {
            erased: AnyCreator::new(name, binding),
            _marker: PhantomData,
        }
    }

    fn erase_factory<F>(factory: F) -> CreationFunction
    where
        F: Fn(&ContainerView) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        creation_function(move |container| {
            factory(container).map(|instance| InstancePtr::new(instance) as InstanceAnyPtr)
        })
    }

    /// Anonymous pre-built value. Anonymous creators can only be registered with a source
    /// location.
    pub fn value(value: T) -> Self {
        Self::from_binding(None, Binding::Value(InstancePtr::new(value) as InstanceAnyPtr))
    }

    pub fn named_value<N: ToString>(name: N, value: T) -> Self {
        Self::from_binding(
            Some(name.to_string()),
            Binding::Value(InstancePtr::new(value) as InstanceAnyPtr),
        )
    }

    /// Anonymous factory. Anonymous creators can only be registered with a source location.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&ContainerView) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        Self::from_binding(None, Binding::Factory(Self::erase_factory(factory)))
    }

    pub fn named_factory<N, F>(name: N, factory: F) -> Self
    where
        N: ToString,
        F: Fn(&ContainerView) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        Self::from_binding(
            Some(name.to_string()),
            Binding::Factory(Self::erase_factory(factory)),
        )
    }

    #[inline]
    pub fn id(&self) -> CreatorId {
        self.erased.id()
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.erased.name()
    }

    #[inline]
    pub fn binding_kind(&self) -> BindingKind {
        self.erased.binding_kind()
    }

    #[inline]
    pub fn erased(&self) -> &AnyCreator {
        &self.erased
    }
}

impl<T: Construct> Creator<T> {
    /// Creator using [Construct::construct], named after the type.
    pub fn constructor() -> Self {
        Self::from_binding(
            Some(short_type_name::<T>()),
            Binding::Constructor(creation_function(|container| {
                T::construct(container).map(|instance| InstancePtr::new(instance) as InstanceAnyPtr)
            })),
        )
    }
}

impl<T> Clone for Creator<T> {
    fn clone(&self) -> Self {
        Self {
            erased: self.erased.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for Creator<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creator")
            .field("type", &type_name::<T>())
            .field("erased", &self.erased)
            .finish()
    }
}

impl<T> From<Creator<T>> for AnyCreator {
    #[inline]
    fn from(creator: Creator<T>) -> Self {
        creator.erased
    }
}

impl<T> From<&Creator<T>> for AnyCreator {
    #[inline]
    fn from(creator: &Creator<T>) -> Self {
        creator.erased.clone()
    }
}

impl From<&AnyCreator> for AnyCreator {
    #[inline]
    fn from(creator: &AnyCreator) -> Self {
        creator.clone()
    }
}

/// Anything which identifies a creator.
pub trait CreatorIdentity {
    fn creator_id(&self) -> CreatorId;
}

impl CreatorIdentity for CreatorId {
    #[inline]
    fn creator_id(&self) -> CreatorId {
        *self
    }
}

impl CreatorIdentity for AnyCreator {
    #[inline]
    fn creator_id(&self) -> CreatorId {
        self.id()
    }
}

impl<T> CreatorIdentity for Creator<T> {
    #[inline]
    fn creator_id(&self) -> CreatorId {
        self.erased.id()
    }
}

// strips the module path, but keeps generic arguments intact
fn short_type_name<T: ?Sized>() -> String {
    let name = type_name::<T>();
    let (path, generics) = name.split_at(name.find('<').unwrap_or(name.len()));
    let base = path.rsplit("::").next().unwrap_or(path);
    format!("{base}{generics}")
}
