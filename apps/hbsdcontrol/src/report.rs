//! Plain-text rendering of feature states on stdout.

use hbsd_pax::{FeatureDescriptor, FeatureState, FeatureStatus, RawAttributeState};
use std::io::{self, Write};
use std::path::Path;

/// `FILE: FEATURE: STATE`, followed by the raw attribute values when `raw` is set.
pub fn write_state(
    out: &mut impl Write,
    file: &Path,
    descriptor: &FeatureDescriptor,
    status: FeatureStatus,
    values: [RawAttributeState; 2],
    raw: bool,
) -> io::Result<()> {
    write!(out, "{}: {}: {status}", file.display(), descriptor.name())?;
    if raw {
        let [disable, enable] = values;
        write!(
            out,
            " ({}={disable}, {}={enable})",
            descriptor.disable_attr(),
            descriptor.enable_attr()
        )?;
    }
    writeln!(out)
}

pub fn write_feature_state(
    out: &mut impl Write,
    file: &Path,
    state: &FeatureState<'_>,
    raw: bool,
) -> io::Result<()> {
    write_state(out, file, state.descriptor, state.status(), [state.disable, state.enable], raw)
}

pub fn write_unset(
    out: &mut impl Write,
    file: &Path,
    descriptor: &FeatureDescriptor,
    raw: bool,
) -> io::Result<()> {
    write_state(out, file, descriptor, FeatureStatus::Unset, [RawAttributeState::ABSENT; 2], raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbsd_pax::{FeatureRegistry, ResolvedState};

    fn render(state: &FeatureState<'_>, raw: bool) -> String {
        let mut out = Vec::new();
        write_feature_state(&mut out, Path::new("/bin/ls"), state, raw).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_state_lines() {
        let registry = FeatureRegistry::hardened_bsd();
        let state = FeatureState {
            descriptor: registry.lookup_by_name("aslr").unwrap(),
            disable: RawAttributeState::present(0),
            enable: RawAttributeState::present(1),
            resolved: ResolvedState::Enabled,
        };

        assert_eq!(render(&state, false), "/bin/ls: aslr: enabled\n");
        assert_eq!(
            render(&state, true),
            "/bin/ls: aslr: enabled (hbsd.pax.noaslr=0, hbsd.pax.aslr=1)\n"
        );
    }

    #[test]
    fn test_unset_line() {
        let registry = FeatureRegistry::hardened_bsd();
        let mut out = Vec::new();
        let mprotect = registry.lookup_by_name("mprotect").unwrap();
        write_unset(&mut out, Path::new("/bin/sh"), mprotect, true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/bin/sh: mprotect: unset (hbsd.pax.nomprotect=-, hbsd.pax.mprotect=-)\n"
        );
    }
}
