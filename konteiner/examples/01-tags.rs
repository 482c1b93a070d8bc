// note: this example assumes you've analyzed the previous one

use konteiner::container::{Container, RegisterOptions};
use konteiner::creator::Creator;
use konteiner::instance::TypedInstanceProvider;

trait Plugin {
    fn name(&self) -> &str;
}

struct Compression;

impl Plugin for Compression {
    fn name(&self) -> &str {
        "compression"
    }
}

struct Encryption;

impl Plugin for Encryption {
    fn name(&self) -> &str {
        "encryption"
    }
}

type PluginPtr = Box<dyn Plugin + Send + Sync>;

fn main() {
    // tagged instances need to share a type to be retrieved together
    let compression =
        Creator::named_factory("compression", |_| Ok(Box::new(Compression) as PluginPtr));
    let encryption =
        Creator::named_factory("encryption", |_| Ok(Box::new(Encryption) as PluginPtr));

    let container = Container::new();
    for plugin in [&compression, &encryption] {
        container
            .register(plugin, RegisterOptions::with_tags(["plugin"]))
            .expect("error registering plugin");
    }

    let plugins = container
        .get_by_tag_typed::<PluginPtr>("plugin")
        .expect("error creating plugins");

    // prints "compression" and "encryption", in registration order
    for plugin in plugins {
        println!("{}", plugin.name());
    }
}
