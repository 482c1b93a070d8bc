//! Bulk registration of [konteiner] creators for files discovered in a directory tree.
//!
//! Files are discovered according to the [LoaderConfig](config::LoaderConfig) and each gets an
//! identifier derived from its name (`messenger-service.rs` becomes `messengerService`). The
//! identifier is then used to find a creator in a [CreatorCatalog](catalog::CreatorCatalog), which
//! gets registered with the file path as its source location.
//!
//! ```
//! use fxhash::FxHashMap;
//! use konteiner::container::Container;
//! use konteiner::creator::{AnyCreator, Creator};
//! use konteiner::instance::TypedInstanceProvider;
//! use konteiner_loader::{RegisterPath, RegisterPathOptions};
//! use std::fs;
//!
//! let dir = tempfile::tempdir().unwrap();
//! fs::write(dir.path().join("messenger-service.rs"), "").unwrap();
//!
//! let messenger = Creator::factory(|_| Ok("hi".to_string()));
//! let catalog: FxHashMap<String, AnyCreator> = [("messengerService".to_string(), messenger.clone().into())]
//!     .into_iter()
//!     .collect();
//!
//! let container = Container::new();
//! container
//!     .register_path(dir.path(), &RegisterPathOptions::default(), &catalog)
//!     .unwrap();
//!
//! assert_eq!(*container.get(&messenger).unwrap(), "hi");
//! ```

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod loader;

pub use loader::{PathLoader, RegisterPath, RegisterPathOptions};
