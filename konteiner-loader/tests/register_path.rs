use fxhash::FxHashMap;
use konteiner::config::ContainerConfig;
use konteiner::container::{Container, RegisterOptions};
use konteiner::creator::{AnyCreator, Creator};
use konteiner::error::RegistrationError;
use konteiner::instance::{InstanceProvider, InstancePtr, TypedInstanceProvider};
use konteiner_loader::config::LoaderConfig;
use konteiner_loader::error::LoaderError;
use konteiner_loader::{PathLoader, RegisterPath, RegisterPathOptions};
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct Logger {
    prefix: String,
}

struct Messenger {
    logger: InstancePtr<Logger>,
}

impl Messenger {
    fn format(&self, message: &str) -> String {
        format!("{}{}", self.logger.prefix, message)
    }
}

static LOGGER: Lazy<Creator<Logger>> = Lazy::new(|| {
    Creator::factory(|_| {
        Ok(Logger {
            prefix: "> ".to_string(),
        })
    })
});

static MESSENGER: Lazy<Creator<Messenger>> = Lazy::new(|| {
    Creator::factory(|container| {
        Ok(Messenger {
            logger: container.get(&*LOGGER)?,
        })
    })
});

fn catalog() -> FxHashMap<String, AnyCreator> {
    [
        ("logger".to_string(), LOGGER.erased().clone()),
        ("messengerService".to_string(), MESSENGER.erased().clone()),
    ]
    .into_iter()
    .collect()
}

fn create_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("services/internal")).unwrap();
    fs::write(root.join("services/messenger-service.rs"), "").unwrap();
    fs::write(root.join("services/internal/logger.rs"), "").unwrap();
    fs::write(root.join("services/internal/logger.test.rs"), "").unwrap();

    dir
}

fn location(root: &Path, relative: &str) -> Option<String> {
    Some(root.join(relative).display().to_string())
}

#[test]
fn should_resolve_graph_from_discovered_files() {
    let dir = create_tree();

    let container = Container::new();
    container
        .register_path(
            dir.path().join("services"),
            &RegisterPathOptions::default()
                .with_dir_search_depth(-1)
                .with_exclude([r"\.test\.rs$"])
                .with_tags(["service"]),
            &catalog(),
        )
        .unwrap();

    assert_eq!(container.get(&*MESSENGER).unwrap().format("hi"), "> hi");
    assert_eq!(container.get_by_tag("service").unwrap().len(), 2);

    let map = container.dependency_map();
    assert_eq!(
        map[&MESSENGER.id()].source_location,
        location(dir.path(), "services/messenger-service.rs")
    );
    assert_eq!(
        map[&LOGGER.id()].name,
        format!(
            "<anonymous> ({})",
            dir.path().join("services/internal/logger.rs").display()
        )
    );
    assert_eq!(map[&MESSENGER.id()].dependencies, vec![LOGGER.id()]);
}

#[test]
fn should_report_unknown_files() {
    let dir = create_tree();

    let container = Container::new();
    let error = container
        .register_path(
            dir.path().join("services"),
            &RegisterPathOptions::default().with_dir_search_depth(-1),
            &catalog(),
        )
        .unwrap_err();

    // logger.test.rs has no creator of its own
    assert!(matches!(
        error,
        LoaderError::MissingCreator { identifier, .. } if identifier == "loggerTest"
    ));
}

#[test]
fn should_ignore_re_registering_same_path() {
    let dir = create_tree();
    let options = RegisterPathOptions::default().with_exclude([r"\.test\.rs$"]);

    let container = Container::new();
    for _ in 0..2 {
        container
            .register_path(dir.path().join("services/internal"), &options, &catalog())
            .unwrap();
    }

    assert_eq!(container.dependency_map().len(), 1);
}

#[test]
fn should_reject_override_from_other_path() {
    let dir = create_tree();
    let container = Container::builder()
        .with_config(ContainerConfig::default().with_allow_overriding(false))
        .build();
    container
        .register_with_source(&*LOGGER, "elsewhere.rs", RegisterOptions::default())
        .unwrap();

    let error = PathLoader::new(LoaderConfig::default().with_exclude([r"\.test\.rs$"]))
        .register_path(
            &container,
            dir.path().join("services/internal"),
            &RegisterPathOptions::default(),
            &catalog(),
        )
        .unwrap_err();

    assert!(matches!(
        error,
        LoaderError::Registration(RegistrationError::OverrideNotAllowed { .. })
    ));
}
