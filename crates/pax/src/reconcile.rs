//! Folding a feature's two raw attributes into a single state.

use crate::error::PaxError;
use std::fmt;

/// Outcome of reconciling a feature's disable/enable attribute pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum ResolvedState {
    Enabled,
    Disabled,
    /// The pair disagrees: both set, or both cleared. Reported, never resolved.
    Conflict,
}

/// State of one feature on one file, including the case where nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureStatus {
    Unset,
    Resolved(ResolvedState),
}

impl FeatureStatus {
    #[must_use]
    pub const fn resolved(self) -> Option<ResolvedState> {
        match self {
            Self::Unset => None,
            Self::Resolved(state) => Some(state),
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("unset"),
            Self::Resolved(state) => fmt::Display::fmt(state, f),
        }
    }
}

/// Truth table:
///
/// | disable | enable | resolved |
/// |---------|--------|----------|
/// | false   | false  | Conflict |
/// | false   | true   | Enabled  |
/// | true    | false  | Disabled |
/// | true    | true   | Conflict |
#[must_use]
pub const fn reconcile(disable: bool, enable: bool) -> ResolvedState {
    match (disable, enable) {
        (false, true) => ResolvedState::Enabled,
        (true, false) => ResolvedState::Disabled,
        (false, false) | (true, true) => ResolvedState::Conflict,
    }
}

/// Stored value of one physical attribute; `None` when the attribute is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawAttributeState {
    pub value: Option<u8>,
}

impl RawAttributeState {
    pub const ABSENT: Self = Self { value: None };

    #[must_use]
    pub const fn present(value: u8) -> Self {
        Self { value: Some(value) }
    }

    #[must_use]
    pub const fn is_present(self) -> bool {
        self.value.is_some()
    }

    /// The boolean the reconciler consumes. Absent reads as `false`.
    #[must_use]
    pub const fn is_set(self) -> bool {
        matches!(self.value, Some(1))
    }
}

impl fmt::Display for RawAttributeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("-"),
        }
    }
}

/// Parses a stored value: its first byte must be the digit `0` or `1`.
///
/// # Errors
/// Returns [`PaxError::MalformedAttributeValue`] for anything else, including an
/// empty value.
pub fn parse_value(attribute: &str, raw: &[u8]) -> Result<u8, PaxError> {
    match raw.first() {
        Some(&digit @ (b'0' | b'1')) => Ok(digit - b'0'),
        _ => Err(PaxError::MalformedAttributeValue {
            message: format!("{attribute} = {:?}", String::from_utf8_lossy(raw)).into(),
            context: Some("Expected the decimal digit 0 or 1".into()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_table() {
        assert_eq!(reconcile(false, true), ResolvedState::Enabled);
        assert_eq!(reconcile(true, false), ResolvedState::Disabled);
        assert_eq!(reconcile(true, true), ResolvedState::Conflict);
    }

    #[test]
    fn test_both_absent_is_conflict() {
        let absent = RawAttributeState::ABSENT;
        assert_eq!(reconcile(absent.is_set(), absent.is_set()), ResolvedState::Conflict);
        assert_eq!(reconcile(false, false), ResolvedState::Conflict);
    }

    #[test]
    fn test_raw_state() {
        assert!(RawAttributeState::present(1).is_set());
        assert!(!RawAttributeState::present(0).is_set());
        assert!(RawAttributeState::present(0).is_present());
        assert!(!RawAttributeState::ABSENT.is_present());
        assert_eq!(RawAttributeState::ABSENT.to_string(), "-");
        assert_eq!(RawAttributeState::present(1).to_string(), "1");
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("hbsd.pax.aslr", b"1").unwrap(), 1);
        assert_eq!(parse_value("hbsd.pax.aslr", b"0").unwrap(), 0);
        // Only the leading digit is significant.
        assert_eq!(parse_value("hbsd.pax.aslr", b"1\0").unwrap(), 1);

        for raw in [&b""[..], b"2", b"yes", b" 1"] {
            let err = parse_value("hbsd.pax.aslr", raw).unwrap_err();
            assert!(matches!(err, PaxError::MalformedAttributeValue { .. }));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(FeatureStatus::Unset.to_string(), "unset");
        assert_eq!(FeatureStatus::Resolved(ResolvedState::Conflict).to_string(), "conflict");
        assert_eq!(
            FeatureStatus::Resolved(ResolvedState::Enabled).resolved(),
            Some(ResolvedState::Enabled)
        );
    }
}
