use serde::Deserialize;

/// Highest meaningful verbosity; larger values are clamped.
pub const MAX_VERBOSITY: u8 = 3;

/// Behavior switches threaded through every [`FeatureControl`](crate::FeatureControl) call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControlOptions {
    pub verbosity: u8,
    /// Operate on targets that are not regular files.
    pub force: bool,
    /// Mark the file immutable after a successful mutation.
    pub immutable: bool,
    /// Continue batch operations past a failure.
    pub keep_going: bool,
}

impl ControlOptions {
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = if verbosity > MAX_VERBOSITY { MAX_VERBOSITY } else { verbosity };
        self
    }

    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub const fn with_immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    #[must_use]
    pub const fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Raw attribute values are shown from the first `-v` on.
    #[must_use]
    pub const fn shows_raw_values(&self) -> bool {
        self.verbosity >= 1
    }
}
