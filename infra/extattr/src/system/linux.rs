use super::ffi::{ATTRIBUTE_MISSING, c_name, c_path, last_error, read_sized};
use crate::error::StoreError;
use crate::listing::encode_listing;
use crate::namespace::Namespace;
use std::path::Path;

pub(super) fn list(namespace: Namespace, file: &Path) -> Result<Vec<u8>, StoreError> {
    let path = c_path(file)?;
    let raw = read_sized(file, None, |buf, len| {
        // SAFETY: `path` is NUL-terminated; `buf` is either null with `len == 0` or
        // points at `len` writable bytes owned by `read_sized`.
        unsafe { libc::listxattr(path.as_ptr(), buf.cast(), len) }
    })?;

    // The kernel hands back NUL-separated fully-qualified names.
    let prefix = namespace.linux_prefix().as_bytes();
    let names = raw
        .split(|&b| b == 0)
        .filter_map(|name| name.strip_prefix(prefix))
        .filter(|name| !name.is_empty());

    encode_listing(names)
}

pub(super) fn get(namespace: Namespace, file: &Path, attribute: &str) -> Result<Vec<u8>, StoreError> {
    let path = c_path(file)?;
    let name = qualified(namespace, attribute)?;
    read_sized(file, Some(attribute), |buf, len| {
        // SAFETY: both strings are NUL-terminated and outlive the call; `buf` is
        // null with `len == 0` or valid for `len` bytes.
        unsafe { libc::getxattr(path.as_ptr(), name.as_ptr(), buf, len) }
    })
}

pub(super) fn set(
    namespace: Namespace,
    file: &Path,
    attribute: &str,
    value: &[u8],
) -> Result<(), StoreError> {
    let path = c_path(file)?;
    let name = qualified(namespace, attribute)?;
    // SAFETY: `value` is a live slice of `value.len()` bytes; the strings are NUL-terminated.
    let rc =
        unsafe { libc::setxattr(path.as_ptr(), name.as_ptr(), value.as_ptr().cast(), value.len(), 0) };
    if rc == -1 {
        return Err(last_error(file, Some(attribute)));
    }
    Ok(())
}

pub(super) fn delete(namespace: Namespace, file: &Path, attribute: &str) -> Result<(), StoreError> {
    let path = c_path(file)?;
    let name = qualified(namespace, attribute)?;
    // SAFETY: both strings are NUL-terminated and outlive the call.
    let rc = unsafe { libc::removexattr(path.as_ptr(), name.as_ptr()) };
    if rc == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(ATTRIBUTE_MISSING) {
            return Ok(());
        }
        return Err(super::ffi::map_os_error(err, file, Some(attribute)));
    }
    Ok(())
}

pub(super) fn set_immutable(file: &Path) -> Result<(), StoreError> {
    Err(StoreError::Unsupported {
        message: file.display().to_string().into(),
        context: Some("Immutable flag is only available on FreeBSD".into()),
    })
}

fn qualified(namespace: Namespace, attribute: &str) -> Result<std::ffi::CString, StoreError> {
    c_name(&format!("{}{attribute}", namespace.linux_prefix()))
}
