// note: this example assumes you've analyzed the previous ones

use konteiner::config::ContainerConfig;
use konteiner::container::{Container, RegisterOptions};
use konteiner::creator::Creator;

fn main() {
    // configuration is read from konteiner.json and KONTEINER_* environment variables, but can
    // also be created by hand
    let config = ContainerConfig::default().with_allow_overriding(false);
    let container = Container::builder().with_config(config).build();

    let greeting = Creator::named_value("greeting", "Hello".to_string());
    container
        .register_with_source(&greeting, "greetings/en.rs", RegisterOptions::default())
        .expect("error registering greeting");

    // registering the same creator from elsewhere is now an error
    // prints: Attempted to override creator greeting registered from Some("greetings/en.rs") with one from Some("greetings/de.rs")
    if let Err(error) =
        container.register_with_source(&greeting, "greetings/de.rs", RegisterOptions::default())
    {
        println!("{error}");
    }
}
