//! Instance pointers and generic access to resolved instances.

use crate::creator::{AnyCreator, Creator};
use crate::error::ResolutionError;
use std::any::{type_name, Any};
use std::error::Error;
use std::sync::Arc;

pub type InstancePtr<T> = Arc<T>;

pub type InstanceAnyPtr = InstancePtr<dyn Any + Send + Sync + 'static>;

/// Shared error returned by user creation strategies, wrapped in
/// [ResolutionError::ConstructorError].
pub type ErrorPtr = Arc<dyn Error + Send + Sync + 'static>;

/// Wraps any error in an [ErrorPtr] based [ResolutionError], for use in creation strategies.
pub fn constructor_error<E: Error + Send + Sync + 'static>(error: E) -> ResolutionError {
    ResolutionError::ConstructorError(Arc::new(error) as ErrorPtr)
}

/// Generic provider for instances built from registered creators.
pub trait InstanceProvider {
    /// Returns the instance for given creator, creating it on first request.
    fn get_any(&self, creator: &AnyCreator) -> Result<InstanceAnyPtr, ResolutionError>;

    /// Returns instances for all creators registered under given tag, in registration order.
    fn get_by_tag(&self, tag: &str) -> Result<Vec<InstanceAnyPtr>, ResolutionError>;
}

/// Helper trait for [InstanceProvider] providing strongly-typed access.
pub trait TypedInstanceProvider {
    /// Typesafe version of [InstanceProvider::get_any].
    fn get<T: Send + Sync + 'static>(
        &self,
        creator: &Creator<T>,
    ) -> Result<InstancePtr<T>, ResolutionError>;

    /// Typesafe version of [InstanceProvider::get_by_tag]. Fails if any tagged instance is not of
    /// type `T`.
    fn get_by_tag_typed<T: Send + Sync + 'static>(
        &self,
        tag: &str,
    ) -> Result<Vec<InstancePtr<T>>, ResolutionError>;
}

fn downcast<T: Send + Sync + 'static>(
    instance: InstanceAnyPtr,
) -> Result<InstancePtr<T>, ResolutionError> {
    instance
        .downcast::<T>()
        .map_err(|_| ResolutionError::IncompatibleInstance(type_name::<T>()))
}

impl<P: InstanceProvider + ?Sized> TypedInstanceProvider for P {
    fn get<T: Send + Sync + 'static>(
        &self,
        creator: &Creator<T>,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        self.get_any(creator.erased()).and_then(downcast)
    }

    fn get_by_tag_typed<T: Send + Sync + 'static>(
        &self,
        tag: &str,
    ) -> Result<Vec<InstancePtr<T>>, ResolutionError> {
        self.get_by_tag(tag)?.into_iter().map(downcast).collect()
    }
}
