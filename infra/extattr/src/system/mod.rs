//! Operating-system backed attribute store.
//!
//! * FreeBSD / HardenedBSD: `extattr_*_file(2)` in the requested namespace.
//! * Linux: `*xattr(2)` with the namespace mapped onto a name prefix; listings are
//!   re-encoded into the length-prefixed wire format.
//! * Anything else: every call fails with [`StoreError::Unsupported`].

#![allow(unsafe_code)]

#[cfg(target_os = "freebsd")]
mod freebsd;
#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(any(target_os = "freebsd", target_os = "linux")))]
mod unsupported;

#[cfg(target_os = "freebsd")]
use freebsd as backend;
#[cfg(target_os = "linux")]
use linux as backend;
#[cfg(not(any(target_os = "freebsd", target_os = "linux")))]
use unsupported as backend;

use crate::error::StoreError;
use crate::namespace::Namespace;
use crate::store::AttributeStore;
use std::path::Path;
use tracing::trace;

/// Attribute store backed by the running kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemStore {
    namespace: Namespace,
}

impl SystemStore {
    /// Store over the `system` namespace, where PaX toggles live.
    #[must_use]
    pub const fn new() -> Self {
        Self { namespace: Namespace::System }
    }

    #[must_use]
    pub const fn with_namespace(namespace: Namespace) -> Self {
        Self { namespace }
    }

    #[must_use]
    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }
}

impl AttributeStore for SystemStore {
    fn list(&self, file: &Path) -> Result<Vec<u8>, StoreError> {
        trace!(file = %file.display(), namespace = %self.namespace, "extattr list");
        backend::list(self.namespace, file)
    }

    fn get(&self, file: &Path, attribute: &str) -> Result<Vec<u8>, StoreError> {
        trace!(file = %file.display(), attribute, "extattr get");
        backend::get(self.namespace, file, attribute)
    }

    fn set(&self, file: &Path, attribute: &str, value: u8) -> Result<(), StoreError> {
        trace!(file = %file.display(), attribute, value, "extattr set");
        backend::set(self.namespace, file, attribute, value.to_string().as_bytes())
    }

    fn delete(&self, file: &Path, attribute: &str) -> Result<(), StoreError> {
        trace!(file = %file.display(), attribute, "extattr delete");
        backend::delete(self.namespace, file, attribute)
    }

    fn set_immutable(&self, file: &Path) -> Result<(), StoreError> {
        trace!(file = %file.display(), "set immutable flag");
        backend::set_immutable(file)
    }
}

#[cfg(any(target_os = "freebsd", target_os = "linux"))]
mod ffi {
    use crate::error::StoreError;
    use std::ffi::CString;
    use std::io;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    /// Attempts before giving up on a listing or value that keeps growing between
    /// the size probe and the read.
    const MAX_READ_ATTEMPTS: usize = 4;

    #[cfg(target_os = "freebsd")]
    pub(super) const ATTRIBUTE_MISSING: i32 = libc::ENOATTR;
    #[cfg(target_os = "linux")]
    pub(super) const ATTRIBUTE_MISSING: i32 = libc::ENODATA;

    pub(super) fn c_path(file: &Path) -> Result<CString, StoreError> {
        CString::new(file.as_os_str().as_bytes()).map_err(|_| StoreError::InvalidPath {
            message: file.display().to_string().into(),
            context: Some("Path contains an interior NUL byte".into()),
        })
    }

    pub(super) fn c_name(name: &str) -> Result<CString, StoreError> {
        CString::new(name).map_err(|_| StoreError::InvalidName {
            message: name.to_owned().into(),
            context: Some("Name contains an interior NUL byte".into()),
        })
    }

    /// Translates the current `errno` into a [`StoreError`].
    pub(super) fn last_error(file: &Path, attribute: Option<&str>) -> StoreError {
        map_os_error(io::Error::last_os_error(), file, attribute)
    }

    pub(super) fn map_os_error(err: io::Error, file: &Path, attribute: Option<&str>) -> StoreError {
        let subject = attribute.map_or_else(
            || file.display().to_string(),
            |attr| format!("{}: {attr}", file.display()),
        );

        match err.raw_os_error() {
            Some(libc::ENOENT | libc::ENOTDIR) => {
                StoreError::FileNotFound { message: file.display().to_string().into(), context: None }
            },
            Some(code) if code == ATTRIBUTE_MISSING => {
                StoreError::AttributeNotFound { message: subject.into(), context: None }
            },
            Some(libc::EPERM | libc::EACCES) => {
                StoreError::PermissionDenied { message: subject.into(), context: None }
            },
            Some(libc::EOPNOTSUPP) => StoreError::Unsupported {
                message: subject.into(),
                context: Some("Filesystem does not support extended attributes".into()),
            },
            _ => StoreError::Io { source: err, context: Some(subject.into()) },
        }
    }

    /// Runs a probe-then-read pair of calls.
    ///
    /// `call(ptr, len)` must behave like the `*xattr`/`extattr_*` family: a null
    /// pointer with zero length returns the required size, otherwise the number of
    /// bytes written, and `-1` with `errno` set on failure.
    pub(super) fn read_sized<F>(
        file: &Path,
        attribute: Option<&str>,
        mut call: F,
    ) -> Result<Vec<u8>, StoreError>
    where
        F: FnMut(*mut libc::c_void, usize) -> isize,
    {
        for _ in 0..MAX_READ_ATTEMPTS {
            let probed = call(std::ptr::null_mut(), 0);
            let Ok(size) = usize::try_from(probed) else {
                return Err(last_error(file, attribute));
            };
            if size == 0 {
                return Ok(Vec::new());
            }

            let mut buf = vec![0u8; size];
            let read = call(buf.as_mut_ptr().cast(), buf.len());
            match usize::try_from(read) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                },
                Err(_) => {
                    let err = io::Error::last_os_error();
                    // The data grew after the probe; size it again.
                    if err.raw_os_error() == Some(libc::ERANGE) {
                        continue;
                    }
                    return Err(map_os_error(err, file, attribute));
                },
            }
        }

        Err(StoreError::Io {
            source: io::Error::other("attribute data kept changing while being read"),
            context: Some(file.display().to_string().into()),
        })
    }
}
