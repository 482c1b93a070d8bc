//! Functionality related to storing [Descriptor]s. A registry indexes descriptors by the identity
//! of their creator and by tags. [Container](crate::container::Container) uses a registry to find
//! descriptors when resolving instances.

use crate::creator::{AnyCreator, CreatorId};
use crate::descriptor::{Descriptor, DescriptorPtr, DescriptorSnapshot};
use crate::error::{RegistrationError, ResolutionError};
use fxhash::FxHashMap;
use itertools::Itertools;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tracing::{info, warn};

/// Diagnostic view of a registry: every descriptor snapshot keyed by creator identity.
pub type DependencyMap = FxHashMap<CreatorId, DescriptorSnapshot>;

/// A registry of descriptors, which can be used when resolving instances.
#[cfg_attr(test, automock)]
pub trait DescriptorRegistry {
    /// Adds a new descriptor for given creator, optionally listing it under given tags.
    /// Re-adding a creator from the same source location is ignored, while a different location
    /// replaces the existing descriptor (subject to registry configuration).
    fn add(
        &mut self,
        creator: AnyCreator,
        source_location: Option<String>,
        tags: &[String],
    ) -> Result<(), RegistrationError>;

    /// Returns the descriptor for given creator.
    fn get(&self, id: CreatorId) -> Option<DescriptorPtr>;

    /// Returns all descriptors listed under given tag, in registration order.
    fn get_by_tag(&self, tag: &str) -> Result<Vec<DescriptorPtr>, ResolutionError>;

    /// Removes the descriptor for given creator from all indices. Returns if it was present.
    fn remove(&mut self, id: CreatorId) -> bool;

    /// Returns a snapshot of all descriptors.
    fn dependency_map(&self) -> DependencyMap;
}

/// Default [DescriptorRegistry] keeping descriptors in hash maps.
#[derive(Debug)]
pub struct DescriptorMap {
    by_identity: FxHashMap<CreatorId, DescriptorPtr>,
    by_tag: FxHashMap<String, Vec<DescriptorPtr>>,
    allow_overriding: bool,
}

impl Default for DescriptorMap {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DescriptorMap {
    pub fn new(allow_overriding: bool) -> Self {
        Self {
            by_identity: Default::default(),
            by_tag: Default::default(),
            allow_overriding,
        }
    }

    fn prune_tags(&mut self, id: CreatorId) {
        self.by_tag.retain(|_, descriptors| {
            descriptors.retain(|descriptor| descriptor.id() != id);
            !descriptors.is_empty()
        });
    }

    fn tags_of(&self, id: CreatorId) -> Vec<&str> {
        self.by_tag
            .iter()
            .filter(|(_, descriptors)| descriptors.iter().any(|descriptor| descriptor.id() == id))
            .map(|(tag, _)| tag.as_str())
            .sorted()
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}

impl DescriptorRegistry for DescriptorMap {
    fn add(
        &mut self,
        creator: AnyCreator,
        source_location: Option<String>,
        tags: &[String],
    ) -> Result<(), RegistrationError> {
        let descriptor = Descriptor::new(creator, source_location)?;
        let id = descriptor.id();

        if let Some(existing) = self.by_identity.get(&id) {
            if existing.source_location() == descriptor.source_location() {
                warn!(
                    "Attempt to re-add {} from {:?}, ignoring...",
                    existing.display_name(),
                    existing.source_location()
                );
                return Ok(());
            }

            if !self.allow_overriding {
                return Err(RegistrationError::OverrideNotAllowed {
                    name: existing.display_name().to_string(),
                    previous: existing.source_location().map(str::to_string),
                    current: descriptor.source_location().map(str::to_string),
                });
            }

            info!(
                "Overriding {} from {:?} with one from {:?}, dropping tags {:?}",
                existing.display_name(),
                existing.source_location(),
                descriptor.source_location(),
                self.tags_of(id)
            );

            self.prune_tags(id);
        }

        let descriptor = Arc::new(descriptor);
        for tag in tags.iter().unique() {
            self.by_tag
                .entry(tag.clone())
                .or_default()
                .push(descriptor.clone());
        }

        self.by_identity.insert(id, descriptor);
        Ok(())
    }

    #[inline]
    fn get(&self, id: CreatorId) -> Option<DescriptorPtr> {
        self.by_identity.get(&id).cloned()
    }

    fn get_by_tag(&self, tag: &str) -> Result<Vec<DescriptorPtr>, ResolutionError> {
        self.by_tag
            .get(tag)
            .filter(|descriptors| !descriptors.is_empty())
            .cloned()
            .ok_or_else(|| ResolutionError::NotRegisteredTag(tag.to_string()))
    }

    fn remove(&mut self, id: CreatorId) -> bool {
        if self.by_identity.remove(&id).is_none() {
            return false;
        }

        self.prune_tags(id);
        true
    }

    fn dependency_map(&self) -> DependencyMap {
        self.by_identity
            .iter()
            .map(|(id, descriptor)| (*id, descriptor.snapshot()))
            .collect()
    }
}
