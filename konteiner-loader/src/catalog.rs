//! Rust has no way of loading code from a discovered file at runtime, so creators need to be known
//! upfront. A [CreatorCatalog] maps identifiers derived from file names to such creators.

use fxhash::FxHashMap;
use konteiner::creator::AnyCreator;
#[cfg(test)]
use mockall::automock;

/// Source of creators for discovered files.
#[cfg_attr(test, automock)]
pub trait CreatorCatalog {
    /// Returns the creator for given identifier, if known.
    fn creator(&self, identifier: &str) -> Option<AnyCreator>;
}

impl CreatorCatalog for FxHashMap<String, AnyCreator> {
    #[inline]
    fn creator(&self, identifier: &str) -> Option<AnyCreator> {
        self.get(identifier).cloned()
    }
}
