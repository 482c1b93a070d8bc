//! Core functionality for resolving instances from registered [creators](crate::creator).
//!
//! A [Container] creates instances lazily - the first request for a given creator invokes it,
//! while subsequent requests return the cached instance. Creators pull their own dependencies
//! through a [ContainerView], which remembers the chain of instances currently being created.
//! Requesting an instance which is already in that chain results in
//! [ResolutionError::CyclicDependency].
//!
//! Each chain lives only as long as the request which started it, so unrelated requests never
//! see each other's ancestors. When a request needs an instance which another thread is currently
//! creating, it waits for the result - unless the other thread is (possibly through more threads)
//! waiting for an instance from the requesting chain. Such requests form a cycle as well.

use crate::config::ContainerConfig;
use crate::construction::Constructions;
use crate::creator::{AnyCreator, CreatorIdentity};
use crate::descriptor::{DescriptorPtr, ANONYMOUS};
use crate::error::{RegistrationError, ResolutionError};
use crate::instance::{InstanceAnyPtr, InstanceProvider};
use crate::registry::{DependencyMap, DescriptorMap, DescriptorRegistry};
use config::ConfigError;
use itertools::Itertools;
use parking_lot::{Condvar, Mutex, RwLock};
use std::iter::successors;
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace};

pub type DescriptorRegistryPtr = Box<dyn DescriptorRegistry + Send + Sync>;

/// Additional registration options.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterOptions {
    /// Tags under which the creator should be listed, for use with
    /// [InstanceProvider::get_by_tag].
    pub tags: Vec<String>,
}

impl RegisterOptions {
    pub fn with_tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self {
            tags: tags.into_iter().map(|tag| tag.to_string()).collect(),
        }
    }
}

/// Builder for [Container] with sensible defaults, for easy construction.
#[derive(Default)]
pub struct ContainerBuilder {
    config: ContainerConfig,
    registry: Option<DescriptorRegistryPtr>,
}

impl ContainerBuilder {
    /// Creates a new builder with a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder with configuration read from the environment. Please see
    /// [ContainerConfig::init_from_environment].
    pub fn from_environment() -> Result<Self, ConfigError> {
        ContainerConfig::init_from_environment().map(|config| Self::new().with_config(config))
    }

    /// Sets new configuration. Only used when no custom registry is set.
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets new [DescriptorRegistry].
    pub fn with_registry(mut self, registry: DescriptorRegistryPtr) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds resulting [Container].
    pub fn build(self) -> Container {
        let registry = self.registry.unwrap_or_else(|| {
            Box::new(DescriptorMap::new(self.config.allow_overriding)) as DescriptorRegistryPtr
        });

        Container::with_registry(registry)
    }
}

/// Container of lazily created instances. Uses descriptors from the [DescriptorRegistry] to find
/// creators and cache their instances.
pub struct Container {
    registry: RwLock<DescriptorRegistryPtr>,
    constructions: Mutex<Constructions>,
    construction_finished: Condvar,
}

impl Default for Container {
    fn default() -> Self {
        ContainerBuilder::new().build()
    }
}

impl Container {
    /// Creates an empty container with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: DescriptorRegistryPtr) -> Self {
        Self {
            registry: RwLock::new(registry),
            constructions: Default::default(),
            construction_finished: Condvar::new(),
        }
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Creates an empty container with configuration read from the environment.
    pub fn from_environment() -> Result<Self, ConfigError> {
        ContainerBuilder::from_environment().map(ContainerBuilder::build)
    }

    /// Registers given creator. Nothing is created until the first request.
    pub fn register<C: Into<AnyCreator>>(
        &self,
        creator: C,
        options: RegisterOptions,
    ) -> Result<(), RegistrationError> {
        let creator = creator.into();
        debug!("Registering {:?}...", creator.name().unwrap_or(ANONYMOUS));

        self.registry.write().add(creator, None, &options.tags)
    }

    /// Registers given creator, noting the location it was discovered at. Anonymous creators
    /// need a location to be registered.
    pub fn register_with_source<C, S>(
        &self,
        creator: C,
        source_location: S,
        options: RegisterOptions,
    ) -> Result<(), RegistrationError>
    where
        C: Into<AnyCreator>,
        S: Into<String>,
    {
        let creator = creator.into();
        let source_location = source_location.into();
        debug!(
            "Registering {:?} from {}...",
            creator.name().unwrap_or(ANONYMOUS),
            source_location
        );

        self.registry
            .write()
            .add(creator, Some(source_location), &options.tags)
    }

    /// Removes given creator. Instances already created by other creators are not affected.
    /// Returns if the creator was registered.
    pub fn remove<C: CreatorIdentity + ?Sized>(&self, creator: &C) -> bool {
        self.registry.write().remove(creator.creator_id())
    }

    /// Checks if given creator is registered.
    pub fn contains<C: CreatorIdentity + ?Sized>(&self, creator: &C) -> bool {
        self.registry.read().get(creator.creator_id()).is_some()
    }

    /// Returns a diagnostic snapshot of all registered creators. Does not create any instances.
    pub fn dependency_map(&self) -> DependencyMap {
        self.registry.read().dependency_map()
    }

    /// Returns a view without any ancestors, equivalent to using the container directly.
    pub fn view(&self) -> ContainerView<'_> {
        ContainerView {
            container: self,
            ancestors: None,
        }
    }

    fn resolve(
        &self,
        creator: &AnyCreator,
        ancestors: Option<&Ancestor>,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        let descriptor = self.registry.read().get(creator.id()).ok_or_else(|| {
            ResolutionError::NotRegistered {
                id: creator.id(),
                name: creator.name().unwrap_or(ANONYMOUS).to_string(),
            }
        })?;

        self.resolve_descriptor(&descriptor, ancestors)
    }

    fn resolve_tag(
        &self,
        tag: &str,
        ancestors: Option<&Ancestor>,
    ) -> Result<Vec<InstanceAnyPtr>, ResolutionError> {
        let descriptors = self.registry.read().get_by_tag(tag)?;

        // every member starts from the same chain, without seeing its siblings
        descriptors
            .iter()
            .map(|descriptor| self.resolve_descriptor(descriptor, ancestors))
            .collect()
    }

    fn resolve_descriptor(
        &self,
        descriptor: &DescriptorPtr,
        ancestors: Option<&Ancestor>,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        if let Some(ancestors) = ancestors {
            if ancestors.contains(descriptor) {
                return Err(ResolutionError::CyclicDependency(
                    ancestors.chain_to(descriptor),
                ));
            }
        }

        let instance = self.construct(descriptor, ancestors)?;

        if let Some(parent) = ancestors {
            parent.descriptor.record_dependency(descriptor.id());
        }

        Ok(instance)
    }

    fn construct(
        &self,
        descriptor: &DescriptorPtr,
        ancestors: Option<&Ancestor>,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        if let Some(instance) = descriptor.instance() {
            trace!("Returning cached instance of {}.", descriptor.display_name());
            return Ok(instance);
        }

        let current = thread::current().id();

        let mut constructions = self.constructions.lock();
        loop {
            if let Some(instance) = descriptor.instance() {
                return Ok(instance);
            }

            if constructions.builder(descriptor).is_none() {
                constructions.start(descriptor, current);
                break;
            }

            let chain = ancestors
                .map(|ancestors| ancestors.descriptors())
                .unwrap_or_default();

            if let Some(cycle) = constructions.find_cycle(current, descriptor, &chain) {
                return Err(ResolutionError::CyclicDependency(
                    cycle
                        .iter()
                        .map(|descriptor| descriptor.display_name().to_string())
                        .collect_vec(),
                ));
            }

            trace!(
                "Waiting for {} being created by another thread...",
                descriptor.display_name()
            );

            constructions.wait_for(current, descriptor, chain);
            self.construction_finished.wait(&mut constructions);
            constructions.stop_waiting(current);
        }
        drop(constructions);

        let _guard = ConstructionGuard {
            container: self,
            descriptor,
        };

        let frame = Ancestor {
            descriptor,
            parent: ancestors,
        };
        let view = ContainerView {
            container: self,
            ancestors: Some(&frame),
        };

        descriptor.get_instance(&view)
    }
}

// marks the end of construction, also when the creator panics
struct ConstructionGuard<'a> {
    container: &'a Container,
    descriptor: &'a DescriptorPtr,
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        self.container.constructions.lock().finish(self.descriptor);
        self.container.construction_finished.notify_all();
    }
}

impl InstanceProvider for Container {
    #[inline]
    fn get_any(&self, creator: &AnyCreator) -> Result<InstanceAnyPtr, ResolutionError> {
        self.resolve(creator, None)
    }

    #[inline]
    fn get_by_tag(&self, tag: &str) -> Result<Vec<InstanceAnyPtr>, ResolutionError> {
        self.resolve_tag(tag, None)
    }
}

// immutable chain of descriptors under construction, linked from the innermost one
#[derive(Copy, Clone)]
struct Ancestor<'a> {
    descriptor: &'a DescriptorPtr,
    parent: Option<&'a Ancestor<'a>>,
}

impl<'a> Ancestor<'a> {
    fn iter(&self) -> impl Iterator<Item = &Ancestor<'a>> {
        successors(Some(self), |ancestor| ancestor.parent)
    }

    fn contains(&self, descriptor: &DescriptorPtr) -> bool {
        self.iter()
            .any(|ancestor| Arc::ptr_eq(ancestor.descriptor, descriptor))
    }

    fn descriptors(&self) -> Vec<DescriptorPtr> {
        let mut descriptors = self
            .iter()
            .map(|ancestor| ancestor.descriptor.clone())
            .collect_vec();
        descriptors.reverse();
        descriptors
    }

    fn names(&self) -> Vec<String> {
        let mut names = self
            .iter()
            .map(|ancestor| ancestor.descriptor.display_name().to_string())
            .collect_vec();
        names.reverse();
        names
    }

    fn chain_to(&self, descriptor: &DescriptorPtr) -> Vec<String> {
        let mut chain = self.names();
        chain.push(descriptor.display_name().to_string());
        chain
    }
}

/// Scoped handle to a [Container], passed to creators. Requests made through a view extend the
/// chain of instances being created, which is used to detect cycles.
#[derive(Copy, Clone)]
pub struct ContainerView<'a> {
    container: &'a Container,
    ancestors: Option<&'a Ancestor<'a>>,
}

impl ContainerView<'_> {
    /// Returns display names of instances currently being created, starting from the outermost
    /// request. Empty for views created directly from a container.
    pub fn resolution_path(&self) -> Vec<String> {
        self.ancestors
            .map(|ancestors| ancestors.names())
            .unwrap_or_default()
    }
}

impl InstanceProvider for ContainerView<'_> {
    #[inline]
    fn get_any(&self, creator: &AnyCreator) -> Result<InstanceAnyPtr, ResolutionError> {
        self.container.resolve(creator, self.ancestors)
    }

    #[inline]
    fn get_by_tag(&self, tag: &str) -> Result<Vec<InstanceAnyPtr>, ResolutionError> {
        self.container.resolve_tag(tag, self.ancestors)
    }
}

#[cfg(test)]
mod tests {
    use crate::container::{Container, DescriptorRegistryPtr, RegisterOptions};
    use crate::creator::Creator;
    use crate::descriptor::Descriptor;
    use crate::error::ResolutionError;
    use crate::instance::{InstanceProvider, TypedInstanceProvider};
    use crate::registry::MockDescriptorRegistry;
    use mockall::predicate::*;
    use std::sync::Arc;

    fn create_container(registry: MockDescriptorRegistry) -> Container {
        Container::with_registry(Box::new(registry) as DescriptorRegistryPtr)
    }

    #[test]
    fn should_return_instance() {
        let creator = Creator::named_value("value", 5);
        let descriptor = Arc::new(Descriptor::new(creator.erased().clone(), None).unwrap());

        let mut registry = MockDescriptorRegistry::new();
        registry
            .expect_get()
            .with(eq(creator.id()))
            .times(1)
            .return_const(Some(descriptor));

        let container = create_container(registry);
        assert_eq!(*container.get(&creator).unwrap(), 5);
    }

    #[test]
    fn should_not_return_missing_instance() {
        let creator = Creator::named_value("missing", 5);

        let mut registry = MockDescriptorRegistry::new();
        registry
            .expect_get()
            .with(eq(creator.id()))
            .times(1)
            .return_const(None);

        let container = create_container(registry);
        assert!(matches!(
            container.get(&creator).unwrap_err(),
            ResolutionError::NotRegistered { id, name } if id == creator.id() && name == "missing"
        ));
    }

    #[test]
    fn should_detect_self_cycle() {
        let creator = Creator::named_factory("a", |container| {
            container.get_any(&Creator::<u8>::named_value("x", 0).into())
        });
        let descriptor = Arc::new(Descriptor::new(creator.erased().clone(), None).unwrap());

        // every lookup resolves to the same descriptor
        let mut registry = MockDescriptorRegistry::new();
        registry
            .expect_get()
            .times(2)
            .return_const(Some(descriptor));

        let container = create_container(registry);
        assert!(matches!(
            container.get_any(creator.erased()).unwrap_err(),
            ResolutionError::CyclicDependency(chain) if chain == vec!["a", "a"]
        ));
    }

    #[test]
    fn should_forward_registration() {
        let creator = Creator::named_value("value", 5);

        let mut registry = MockDescriptorRegistry::new();
        registry
            .expect_add()
            .withf(|_, source_location, tags| {
                source_location.as_deref() == Some("v.rs") && tags.to_vec() == vec!["t".to_string()]
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let container = create_container(registry);
        container
            .register_with_source(&creator, "v.rs", RegisterOptions::with_tags(["t"]))
            .unwrap();
    }

    #[test]
    fn should_forward_removal() {
        let creator = Creator::named_value("value", 5);

        let mut registry = MockDescriptorRegistry::new();
        registry
            .expect_remove()
            .with(eq(creator.id()))
            .times(1)
            .return_const(true);

        let container = create_container(registry);
        assert!(container.remove(&creator));
    }

    #[test]
    fn should_resolve_tag_members() {
        let first = Creator::named_value("first", 1);
        let second = Creator::named_value("second", 2);
        let descriptors = vec![
            Arc::new(Descriptor::new(first.erased().clone(), None).unwrap()),
            Arc::new(Descriptor::new(second.erased().clone(), None).unwrap()),
        ];

        let mut registry = MockDescriptorRegistry::new();
        registry
            .expect_get_by_tag()
            .with(eq("t"))
            .times(1)
            .return_const(Ok(descriptors));

        let container = create_container(registry);
        let instances = container.get_by_tag_typed::<i32>("t").unwrap();
        assert_eq!(
            instances.iter().map(|instance| **instance).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn should_reject_incompatible_tag_members() {
        let descriptors = vec![Arc::new(
            Descriptor::new(Creator::named_value("first", 1).erased().clone(), None).unwrap(),
        )];

        let mut registry = MockDescriptorRegistry::new();
        registry
            .expect_get_by_tag()
            .times(1)
            .return_const(Ok(descriptors));

        let container = create_container(registry);
        assert!(matches!(
            container.get_by_tag_typed::<String>("t").unwrap_err(),
            ResolutionError::IncompatibleInstance(..)
        ));
    }

    #[test]
    fn should_expose_resolution_path() {
        let container = Container::new();
        assert!(container.view().resolution_path().is_empty());
    }
}
