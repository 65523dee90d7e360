use super::ffi::{ATTRIBUTE_MISSING, c_name, c_path, last_error, map_os_error, read_sized};
use crate::error::StoreError;
use crate::namespace::Namespace;
use std::os::freebsd::fs::MetadataExt;
use std::path::Path;

/// The kernel already returns the length-prefixed listing; it is passed through as is.
pub(super) fn list(namespace: Namespace, file: &Path) -> Result<Vec<u8>, StoreError> {
    let path = c_path(file)?;
    let ns = namespace.extattr_namespace();
    read_sized(file, None, |buf, len| {
        // SAFETY: `path` is NUL-terminated; `buf` is null with `len == 0` or valid
        // for `len` bytes.
        unsafe { libc::extattr_list_file(path.as_ptr(), ns, buf, len) }
    })
}

pub(super) fn get(namespace: Namespace, file: &Path, attribute: &str) -> Result<Vec<u8>, StoreError> {
    let path = c_path(file)?;
    let name = c_name(attribute)?;
    let ns = namespace.extattr_namespace();
    read_sized(file, Some(attribute), |buf, len| {
        // SAFETY: both strings are NUL-terminated and outlive the call; `buf` is
        // null with `len == 0` or valid for `len` bytes.
        unsafe { libc::extattr_get_file(path.as_ptr(), ns, name.as_ptr(), buf, len) }
    })
}

pub(super) fn set(
    namespace: Namespace,
    file: &Path,
    attribute: &str,
    value: &[u8],
) -> Result<(), StoreError> {
    let path = c_path(file)?;
    let name = c_name(attribute)?;
    // SAFETY: `value` is a live slice of `value.len()` bytes; the strings are NUL-terminated.
    let written = unsafe {
        libc::extattr_set_file(
            path.as_ptr(),
            namespace.extattr_namespace(),
            name.as_ptr(),
            value.as_ptr().cast(),
            value.len(),
        )
    };
    if written == -1 {
        return Err(last_error(file, Some(attribute)));
    }
    Ok(())
}

pub(super) fn delete(namespace: Namespace, file: &Path, attribute: &str) -> Result<(), StoreError> {
    let path = c_path(file)?;
    let name = c_name(attribute)?;
    // SAFETY: both strings are NUL-terminated and outlive the call.
    let rc = unsafe {
        libc::extattr_delete_file(path.as_ptr(), namespace.extattr_namespace(), name.as_ptr())
    };
    if rc == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(ATTRIBUTE_MISSING) {
            return Ok(());
        }
        return Err(map_os_error(err, file, Some(attribute)));
    }
    Ok(())
}

/// Adds `SF_IMMUTABLE` to the flags already present on the file.
pub(super) fn set_immutable(file: &Path) -> Result<(), StoreError> {
    let current = std::fs::metadata(file).map_err(|err| map_os_error(err, file, None))?.st_flags();
    let path = c_path(file)?;
    let flags = libc::c_ulong::from(current) | libc::SF_IMMUTABLE;
    // SAFETY: `path` is NUL-terminated and outlives the call.
    let rc = unsafe { libc::chflags(path.as_ptr(), flags) };
    if rc == -1 {
        return Err(last_error(file, None));
    }
    Ok(())
}
