use fxhash::FxHashMap;
use konteiner::container::Container;
use konteiner::creator::{AnyCreator, Creator};
use konteiner::instance::TypedInstanceProvider;
use konteiner_loader::{RegisterPath, RegisterPathOptions};
use std::fs;

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // a directory tree standing in for a real project layout
    let dir = tempfile::tempdir().expect("error creating directory");
    fs::create_dir_all(dir.path().join("internal")).expect("error creating directory");
    fs::write(dir.path().join("greeting-service.rs"), "").expect("error writing file");
    fs::write(dir.path().join("internal/name.rs"), "").expect("error writing file");

    let name = Creator::factory(|_| Ok("world".to_string()));
    let greeting = {
        let name = name.clone();
        Creator::factory(move |container| Ok(format!("Hello {}!", container.get(&name)?)))
    };

    // discovered files are matched to creators using identifiers derived from file names
    let catalog: FxHashMap<String, AnyCreator> = [
        ("greetingService".to_string(), greeting.clone().into()),
        ("name".to_string(), name.into()),
    ]
    .into_iter()
    .collect();

    let container = Container::new();
    container
        .register_path(
            dir.path(),
            &RegisterPathOptions::default().with_dir_search_depth(2),
            &catalog,
        )
        .expect("error registering path");

    // prints "Hello world!"
    println!("{}", container.get(&greeting).expect("error creating greeting"));

    // anonymous creators are named after the files they were found in
    for snapshot in container.dependency_map().values() {
        println!("{}", snapshot.name);
    }
}
