//! Bulk registration of creators for files found in a directory tree.

use crate::catalog::CreatorCatalog;
use crate::config::LoaderConfig;
use crate::discovery::discover;
use crate::error::LoaderError;
use config::ConfigError;
use derive_more::Constructor;
use konteiner::container::{Container, RegisterOptions};
use std::path::Path;
use tracing::{debug, info};

/// Per-call options for [PathLoader::register_path]. Unset values fall back to the loader
/// configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterPathOptions {
    /// Tags to list every registered creator under.
    pub tags: Vec<String>,
    pub exclude: Option<Vec<String>>,
    pub dir_search_depth: Option<i32>,
    pub supported_extensions: Option<Vec<String>>,
}

impl RegisterPathOptions {
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.tags = tags.into_iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn with_exclude<I, T>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.exclude = Some(exclude.into_iter().map(|entry| entry.to_string()).collect());
        self
    }

    pub fn with_dir_search_depth(mut self, dir_search_depth: i32) -> Self {
        self.dir_search_depth = Some(dir_search_depth);
        self
    }

    pub fn with_supported_extensions<I, T>(mut self, supported_extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.supported_extensions = Some(
            supported_extensions
                .into_iter()
                .map(|extension| extension.to_string())
                .collect(),
        );
        self
    }
}

/// Registers creators for discovered files in a [Container]. Each discovered file must have a
/// matching creator in the given [CreatorCatalog] and is registered with its path as the source
/// location.
#[derive(Clone, Debug, Default, Constructor)]
pub struct PathLoader {
    config: LoaderConfig,
}

impl PathLoader {
    /// Creates a loader with configuration read from the environment. Please see
    /// [LoaderConfig::init_from_environment].
    pub fn from_environment() -> Result<Self, ConfigError> {
        LoaderConfig::init_from_environment().map(Self::new)
    }

    #[inline]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Discovers files under given path and registers their creators. Stops at the first error;
    /// creators registered before it stay registered.
    pub fn register_path<P, C>(
        &self,
        container: &Container,
        path: P,
        options: &RegisterPathOptions,
        catalog: &C,
    ) -> Result<(), LoaderError>
    where
        P: AsRef<Path>,
        C: CreatorCatalog + ?Sized,
    {
        let path = path.as_ref();
        info!("Registering creators from {}...", path.display());

        let config = self.merge_options(options);
        for file in discover(path, &config)? {
            let file = file?;
            let creator =
                catalog
                    .creator(&file.identifier)
                    .ok_or_else(|| LoaderError::MissingCreator {
                        identifier: file.identifier.clone(),
                        location: file.location.clone(),
                    })?;

            debug!(
                "Found {} at {}.",
                file.identifier,
                file.location.display()
            );

            container.register_with_source(
                creator,
                file.location.display().to_string(),
                RegisterOptions {
                    tags: options.tags.clone(),
                },
            )?;
        }

        Ok(())
    }

    fn merge_options(&self, options: &RegisterPathOptions) -> LoaderConfig {
        LoaderConfig {
            exclude: options
                .exclude
                .clone()
                .unwrap_or_else(|| self.config.exclude.clone()),
            dir_search_depth: options
                .dir_search_depth
                .unwrap_or(self.config.dir_search_depth),
            supported_extensions: options
                .supported_extensions
                .clone()
                .unwrap_or_else(|| self.config.supported_extensions.clone()),
        }
    }
}

/// Adds [PathLoader::register_path] with the default loader configuration to [Container].
pub trait RegisterPath {
    fn register_path<P, C>(
        &self,
        path: P,
        options: &RegisterPathOptions,
        catalog: &C,
    ) -> Result<(), LoaderError>
    where
        P: AsRef<Path>,
        C: CreatorCatalog + ?Sized;
}

impl RegisterPath for Container {
    fn register_path<P, C>(
        &self,
        path: P,
        options: &RegisterPathOptions,
        catalog: &C,
    ) -> Result<(), LoaderError>
    where
        P: AsRef<Path>,
        C: CreatorCatalog + ?Sized,
    {
        PathLoader::default().register_path(self, path, options, catalog)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::MockCreatorCatalog;
    use crate::config::LoaderConfig;
    use crate::error::LoaderError;
    use crate::loader::{PathLoader, RegisterPathOptions};
    use konteiner::container::Container;
    use konteiner::creator::Creator;
    use konteiner::instance::TypedInstanceProvider;
    use mockall::predicate::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logger.rs"), "").unwrap();
        fs::write(dir.path().join("messenger-service.rs"), "").unwrap();
        dir
    }

    #[test]
    fn should_register_discovered_creators() {
        let dir = create_tree();
        let logger = Creator::named_value("logger", 1u8);
        let messenger = Creator::factory(|_| Ok(2u8));

        let mut catalog = MockCreatorCatalog::new();
        catalog
            .expect_creator()
            .with(eq("logger"))
            .times(1)
            .return_const(Some(logger.erased().clone()));
        catalog
            .expect_creator()
            .with(eq("messengerService"))
            .times(1)
            .return_const(Some(messenger.erased().clone()));

        let container = Container::new();
        PathLoader::default()
            .register_path(
                &container,
                dir.path(),
                &RegisterPathOptions::default().with_tags(["service"]),
                &catalog,
            )
            .unwrap();

        assert_eq!(*container.get(&logger).unwrap(), 1);
        assert_eq!(container.get_by_tag_typed::<u8>("service").unwrap().len(), 2);
        assert_eq!(
            container.dependency_map()[&messenger.id()].source_location,
            Some(
                dir.path()
                    .join("messenger-service.rs")
                    .display()
                    .to_string()
            )
        );
    }

    #[test]
    fn should_keep_registrations_before_missing_creator() {
        let dir = create_tree();
        let logger = Creator::named_value("logger", 1u8);

        let mut catalog = MockCreatorCatalog::new();
        catalog
            .expect_creator()
            .with(eq("logger"))
            .return_const(Some(logger.erased().clone()));
        catalog
            .expect_creator()
            .with(eq("messengerService"))
            .return_const(None);

        let container = Container::new();
        let error = PathLoader::default()
            .register_path(&container, dir.path(), &Default::default(), &catalog)
            .unwrap_err();

        assert!(matches!(
            error,
            LoaderError::MissingCreator { identifier, .. } if identifier == "messengerService"
        ));
        assert!(container.contains(&logger));
    }

    #[test]
    fn should_prefer_options_over_config() {
        let dir = create_tree();
        let logger = Creator::named_value("logger", 1u8);

        let mut catalog = MockCreatorCatalog::new();
        catalog
            .expect_creator()
            .with(eq("logger"))
            .times(1)
            .return_const(Some(logger.erased().clone()));

        let loader = PathLoader::new(LoaderConfig::default().with_exclude(["logger"]));
        loader
            .register_path(
                &Container::new(),
                dir.path(),
                &RegisterPathOptions::default().with_exclude(["messenger"]),
                &catalog,
            )
            .unwrap();
    }

    #[test]
    fn should_register_nothing_for_unsupported_files() {
        let dir = create_tree();

        let catalog = MockCreatorCatalog::new();
        let container = Container::new();
        PathLoader::default()
            .register_path(
                &container,
                dir.path(),
                &RegisterPathOptions::default().with_supported_extensions([".md"]),
                &catalog,
            )
            .unwrap();

        assert!(container.dependency_map().is_empty());
    }
}
