use konteiner::container::{Container, RegisterOptions};
use konteiner::creator::Creator;
use konteiner::instance::{InstancePtr, TypedInstanceProvider};

// this is a dependency we would like to use in our service
struct Logger;

impl Logger {
    fn log(&self, message: &str) {
        println!("{message}");
    }
}

// this is a service depending on the logger
struct Messenger {
    logger: InstancePtr<Logger>,
}

impl Messenger {
    fn send_message(&self, message: &str) {
        self.logger.log(message);
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // creators describe how to obtain instances - nothing is created yet
    let logger = Creator::named_factory("logger", |_| Ok(Logger));
    let messenger = {
        let logger = logger.clone();

        // the view passed to a factory is used to pull dependencies
        Creator::named_factory("messenger", move |container| {
            Ok(Messenger {
                logger: container.get(&logger)?,
            })
        })
    };

    let container = Container::new();
    container
        .register(&logger, RegisterOptions::default())
        .expect("error registering logger");
    container
        .register(&messenger, RegisterOptions::default())
        .expect("error registering messenger");

    // the messenger gets created along with the logger on first request, and cached afterwards
    let messenger = container
        .get(&messenger)
        .expect("error creating messenger");

    // prints "Hello world!"
    messenger.send_message("Hello world!");
}
