//! Dependency injection container creating object graphs lazily, from registered
//! [creators](creator).
//!
//! Creators are registered in a [Container], which creates instances on first request and caches
//! them afterwards. Each creator pulls its own dependencies through the
//! [view](container::ContainerView) it receives, which makes it possible to detect dependency
//! cycles while they happen, rather than at registration time.
//!
//! ```
//! use konteiner::container::{Container, RegisterOptions};
//! use konteiner::creator::Creator;
//! use konteiner::instance::TypedInstanceProvider;
//!
//! let name = Creator::named_value("name", "world".to_string());
//! let greeting = {
//!     let name = name.clone();
//!     Creator::named_factory("greeting", move |container| {
//!         Ok(format!("Hello {}!", container.get(&name)?))
//!     })
//! };
//!
//! let container = Container::new();
//! container.register(&name, RegisterOptions::default()).unwrap();
//! container.register(&greeting, RegisterOptions::default()).unwrap();
//!
//! assert_eq!(*container.get(&greeting).unwrap(), "Hello world!");
//! ```

pub mod config;
mod construction;
pub mod container;
pub mod creator;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod registry;

pub use container::{Container, ContainerView, RegisterOptions};
pub use creator::{AnyCreator, Construct, Creator};
