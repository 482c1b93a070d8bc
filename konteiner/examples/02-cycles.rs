// note: this example assumes you've analyzed the previous ones

use konteiner::container::{Container, RegisterOptions};
use konteiner::creator::Creator;
use konteiner::instance::TypedInstanceProvider;
use once_cell::sync::Lazy;

// creators referencing each other need to live somewhere both can reach
static CHICKEN: Lazy<Creator<String>> = Lazy::new(|| {
    Creator::named_factory("chicken", |container| {
        container.get(&*EGG).map(|egg| format!("chicken from {egg}"))
    })
});

static EGG: Lazy<Creator<String>> = Lazy::new(|| {
    Creator::named_factory("egg", |container| {
        container
            .get(&*CHICKEN)
            .map(|chicken| format!("egg from {chicken}"))
    })
});

fn main() {
    let container = Container::new();
    container
        .register(&*CHICKEN, RegisterOptions::default())
        .expect("error registering chicken");
    container
        .register(&*EGG, RegisterOptions::default())
        .expect("error registering egg");

    // prints: Cyclic dependency found! ["chicken"->"egg"->"chicken"]
    if let Err(error) = container.get(&*CHICKEN) {
        println!("{error}");
    }

    // the dependency map shows nothing got created
    for snapshot in container.dependency_map().values() {
        println!("{}: initialized = {}", snapshot.name, snapshot.initialized);
    }
}
