use crate::error::StoreError;
use crate::namespace::Namespace;
use std::path::Path;

fn unsupported(file: &Path) -> StoreError {
    StoreError::Unsupported {
        message: file.display().to_string().into(),
        context: Some("Extended attributes are not available on this platform".into()),
    }
}

pub(super) fn list(_namespace: Namespace, file: &Path) -> Result<Vec<u8>, StoreError> {
    Err(unsupported(file))
}

pub(super) fn get(_namespace: Namespace, file: &Path, _attribute: &str) -> Result<Vec<u8>, StoreError> {
    Err(unsupported(file))
}

pub(super) fn set(
    _namespace: Namespace,
    file: &Path,
    _attribute: &str,
    _value: &[u8],
) -> Result<(), StoreError> {
    Err(unsupported(file))
}

pub(super) fn delete(_namespace: Namespace, file: &Path, _attribute: &str) -> Result<(), StoreError> {
    Err(unsupported(file))
}

pub(super) fn set_immutable(file: &Path) -> Result<(), StoreError> {
    Err(unsupported(file))
}
