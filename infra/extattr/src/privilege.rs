#![allow(unsafe_code)]

/// Returns `true` when the process runs with an effective uid of 0.
///
/// Writes to the `system` namespace are reserved for the superuser, so callers
/// check this up front instead of failing halfway through a batch.
#[cfg(unix)]
#[must_use]
pub fn effective_uid_is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
#[must_use]
pub const fn effective_uid_is_root() -> bool {
    false
}
