use crate::error::StoreError;
use std::path::Path;
use std::sync::Arc;

/// Capability to read and mutate one namespace of extended attributes.
///
/// Implementations operate on a single file path per call and never cache between
/// calls; every query observes the current on-disk state.
pub trait AttributeStore {
    /// Returns the length-prefixed listing of attribute names on `file`
    /// (see [`encode_listing`](crate::encode_listing)). A file without attributes
    /// yields an empty buffer.
    ///
    /// # Errors
    /// [`StoreError::FileNotFound`] if `file` does not exist; other variants for
    /// failures of the underlying facility.
    fn list(&self, file: &Path) -> Result<Vec<u8>, StoreError>;

    /// Returns the raw value bytes of `attribute`.
    ///
    /// # Errors
    /// [`StoreError::AttributeNotFound`] if the attribute is not set.
    fn get(&self, file: &Path, attribute: &str) -> Result<Vec<u8>, StoreError>;

    /// Stores `value` as its decimal string representation.
    ///
    /// # Errors
    /// Any failure of the underlying facility.
    fn set(&self, file: &Path, attribute: &str, value: u8) -> Result<(), StoreError>;

    /// Removes `attribute`. Removing an attribute that is not set succeeds.
    ///
    /// # Errors
    /// Any failure other than the attribute being absent.
    fn delete(&self, file: &Path, attribute: &str) -> Result<(), StoreError>;

    /// Marks `file` immutable so its attributes cannot be changed further.
    ///
    /// # Errors
    /// [`StoreError::Unsupported`] where the platform has no immutable flag.
    fn set_immutable(&self, file: &Path) -> Result<(), StoreError>;
}

impl<S: AttributeStore + ?Sized> AttributeStore for &S {
    fn list(&self, file: &Path) -> Result<Vec<u8>, StoreError> {
        (**self).list(file)
    }

    fn get(&self, file: &Path, attribute: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(file, attribute)
    }

    fn set(&self, file: &Path, attribute: &str, value: u8) -> Result<(), StoreError> {
        (**self).set(file, attribute, value)
    }

    fn delete(&self, file: &Path, attribute: &str) -> Result<(), StoreError> {
        (**self).delete(file, attribute)
    }

    fn set_immutable(&self, file: &Path) -> Result<(), StoreError> {
        (**self).set_immutable(file)
    }
}

impl<S: AttributeStore + ?Sized> AttributeStore for Arc<S> {
    fn list(&self, file: &Path) -> Result<Vec<u8>, StoreError> {
        (**self).list(file)
    }

    fn get(&self, file: &Path, attribute: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(file, attribute)
    }

    fn set(&self, file: &Path, attribute: &str, value: u8) -> Result<(), StoreError> {
        (**self).set(file, attribute, value)
    }

    fn delete(&self, file: &Path, attribute: &str) -> Result<(), StoreError> {
        (**self).delete(file, attribute)
    }

    fn set_immutable(&self, file: &Path) -> Result<(), StoreError> {
        (**self).set_immutable(file)
    }
}
