use crate::args::PaxAction;
use crate::report::{write_feature_state, write_unset};
use hbsd_extattr::AttributeStore;
use hbsd_pax::{FeatureControl, PaxError, Polarity, check_target};
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[hbsd_derive::hbsd_error]
pub enum CommandError {
    #[error("{source}")]
    Pax { source: PaxError, context: Option<Cow<'static, str>> },

    #[error("Failed to write output{}: {source}", format_context(.context))]
    Output { source: std::io::Error, context: Option<Cow<'static, str>> },
}

/// Per-invocation result; a run with failures still reports what succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub processed: usize,
    pub failures: usize,
}

impl Outcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failures == 0
    }
}

/// # Errors
/// [`PaxError::PrivilegeRequired`] when `action` touches attributes and the
/// caller is not root.
pub fn ensure_privileged(action: &PaxAction, is_root: bool) -> Result<(), PaxError> {
    if !action.needs_privilege() || is_root {
        return Ok(());
    }
    Err(PaxError::PrivilegeRequired {
        message: "system namespace attributes are only accessible to root".into(),
        context: None,
    })
}

/// Runs `action` on every file in order.
///
/// A failing file is reported on `err` as `hbsdcontrol: <error>`. Processing stops
/// there unless keep-going is enabled.
///
/// # Errors
/// Only failures to write to `out` or `err`.
pub fn execute<S: AttributeStore>(
    control: &FeatureControl<S>,
    action: &PaxAction,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Outcome, CommandError> {
    if let PaxAction::Features {} = action {
        for descriptor in control.registry().iter() {
            writeln!(out, "{descriptor}")?;
        }
        return Ok(Outcome::default());
    }

    let mut outcome = Outcome::default();
    for file in action.files() {
        outcome.processed += 1;
        match run_file(control, action, file, out) {
            Ok(()) => {},
            Err(CommandError::Pax { source, .. }) => {
                debug!(file = %file.display(), kind = source.kind(), "command failed");
                writeln!(err, "hbsdcontrol: {source}")?;
                outcome.failures += 1;
                if !control.options().keep_going {
                    break;
                }
            },
            Err(other) => return Err(other),
        }
    }
    Ok(outcome)
}

fn run_file<S: AttributeStore>(
    control: &FeatureControl<S>,
    action: &PaxAction,
    file: &Path,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    if action.is_mutation() {
        check_target(file, control.options())?;
    }

    let raw = control.options().shows_raw_values();
    match action {
        PaxAction::Enable { feature, .. } => control.set_state(file, feature, Polarity::Enable)?,
        PaxAction::Disable { feature, .. } => control.set_state(file, feature, Polarity::Disable)?,
        PaxAction::Reset { feature, .. } => control.reset(file, feature)?,
        PaxAction::ResetAll { .. } => control.reset_all(file)?,
        PaxAction::Status { feature, .. } => match control.inspect(file, feature)? {
            Some(state) => write_feature_state(out, file, &state, raw)?,
            None => write_unset(out, file, control.registry().lookup_by_name(feature)?, raw)?,
        },
        PaxAction::List { .. } => {
            for state in control.list(file)? {
                write_feature_state(out, file, &state, raw)?;
            }
        },
        PaxAction::Features {} => {},
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbsd_extattr::MemoryStore;
    use hbsd_pax::ControlOptions;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    struct Harness {
        control: FeatureControl<MemoryStore>,
        files: Vec<NamedTempFile>,
    }

    impl Harness {
        fn new(count: usize, options: ControlOptions) -> Self {
            let store = MemoryStore::new();
            let files: Vec<_> = (0..count).map(|_| NamedTempFile::new().unwrap()).collect();
            for file in &files {
                store.add_file(file.path());
            }
            Self { control: FeatureControl::new(store, options), files }
        }

        fn paths(&self) -> Vec<PathBuf> {
            self.files.iter().map(|f| f.path().to_path_buf()).collect()
        }

        fn run(&self, action: &PaxAction) -> (Outcome, String, String) {
            let (mut out, mut err) = (Vec::new(), Vec::new());
            let outcome = execute(&self.control, action, &mut out, &mut err).unwrap();
            (outcome, String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
        }
    }

    #[test]
    fn test_privilege() {
        let list = PaxAction::List { files: vec![PathBuf::from("/bin/ls")] };
        assert!(matches!(
            ensure_privileged(&list, false),
            Err(PaxError::PrivilegeRequired { .. })
        ));
        ensure_privileged(&list, true).unwrap();
        ensure_privileged(&PaxAction::Features {}, false).unwrap();
    }

    #[test]
    fn test_features() {
        let harness = Harness::new(0, ControlOptions::default());
        let (outcome, out, _) = harness.run(&PaxAction::Features {});
        assert!(outcome.is_success());
        assert_eq!(out.lines().count(), 6);
        assert!(out.starts_with("aslr (hbsd.pax.noaslr / hbsd.pax.aslr)\n"));
    }

    #[test]
    fn test_enable_then_list() {
        let harness = Harness::new(2, ControlOptions::default().with_verbosity(1));
        let files = harness.paths();

        let enable = PaxAction::Enable { feature: "mprotect".into(), files: files.clone() };
        let (outcome, out, err) = harness.run(&enable);
        assert_eq!(outcome, Outcome { processed: 2, failures: 0 });
        assert!(out.is_empty() && err.is_empty());

        let (_, out, _) = harness.run(&PaxAction::List { files: files.clone() });
        let expected: String = files
            .iter()
            .map(|f| {
                format!(
                    "{}: mprotect: enabled (hbsd.pax.nomprotect=0, hbsd.pax.mprotect=1)\n",
                    f.display()
                )
            })
            .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_status_unset() {
        let harness = Harness::new(1, ControlOptions::default());
        let files = harness.paths();
        let (_, out, _) =
            harness.run(&PaxAction::Status { feature: "segvguard".into(), files: files.clone() });
        assert_eq!(out, format!("{}: segvguard: unset\n", files[0].display()));
    }

    #[test]
    fn test_first_failure_stops() {
        let harness = Harness::new(1, ControlOptions::default());
        let mut files = vec![PathBuf::from("/nonexistent/hbsdcontrol")];
        files.extend(harness.paths());

        let action = PaxAction::Disable { feature: "aslr".into(), files: files.clone() };
        let (outcome, _, err) = harness.run(&action);
        assert_eq!(outcome, Outcome { processed: 1, failures: 1 });
        assert!(err.starts_with("hbsdcontrol: File not found"));
        assert!(harness.control.store().journal().is_empty());
    }

    #[test]
    fn test_keep_going_visits_every_file() {
        let harness = Harness::new(1, ControlOptions::default().with_keep_going(true));
        let mut files = vec![PathBuf::from("/nonexistent/hbsdcontrol")];
        files.extend(harness.paths());

        let action = PaxAction::Disable { feature: "aslr".into(), files: files.clone() };
        let (outcome, _, _) = harness.run(&action);
        assert_eq!(outcome, Outcome { processed: 2, failures: 1 });
        assert!(!outcome.is_success());
        assert_eq!(harness.control.store().journal().len(), 2);
    }

    #[test]
    fn test_unknown_feature_is_reported() {
        let harness = Harness::new(1, ControlOptions::default());
        let action = PaxAction::Reset { feature: "noexec".into(), files: harness.paths() };
        let (outcome, _, err) = harness.run(&action);
        assert_eq!(outcome.failures, 1);
        assert!(err.contains("Unknown feature"));
        assert!(err.contains("noexec"));
    }

    #[test]
    fn test_directory_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store.add_file(dir.path());

        let action = PaxAction::Enable { feature: "aslr".into(), files: vec![dir.path().into()] };
        let control = FeatureControl::new(&store, ControlOptions::default());
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let outcome = execute(&control, &action, &mut out, &mut err).unwrap();
        assert_eq!(outcome.failures, 1);
        assert!(String::from_utf8(err).unwrap().contains("Unsupported target"));

        let control = FeatureControl::new(&store, ControlOptions::default().with_force(true));
        let outcome = execute(&control, &action, &mut out, &mut Vec::new()).unwrap();
        assert!(outcome.is_success());
        assert_eq!(store.attribute(dir.path(), "hbsd.pax.aslr").unwrap(), b"1");
    }
}
