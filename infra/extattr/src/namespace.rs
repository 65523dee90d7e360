use std::fmt;

/// Extended attribute namespace a store operates in.
///
/// PaX feature toggles live in [`Namespace::System`], which only the superuser may
/// modify. [`Namespace::User`] exists for unprivileged experiments with the same
/// store implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Namespace {
    #[default]
    System,
    User,
}

impl Namespace {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }

    /// Linux has no `system` namespace for arbitrary names; the root-only `trusted`
    /// namespace carries the same access rules.
    #[cfg(target_os = "linux")]
    pub(crate) const fn linux_prefix(self) -> &'static str {
        match self {
            Self::System => "trusted.",
            Self::User => "user.",
        }
    }

    #[cfg(target_os = "freebsd")]
    pub(crate) const fn extattr_namespace(self) -> libc::c_int {
        match self {
            Self::System => libc::EXTATTR_NAMESPACE_SYSTEM,
            Self::User => libc::EXTATTR_NAMESPACE_USER,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
