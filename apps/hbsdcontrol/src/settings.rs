use crate::args::Cli;
use config::{Config, Environment, File, FileFormat};
use hbsd_pax::{ControlOptions, MAX_VERBOSITY};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/hbsdcontrol.toml";
pub const ENV_PREFIX: &str = "HBSDCONTROL";

#[hbsd_derive::hbsd_error]
pub enum SettingsError {
    #[error("Settings error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered settings: file, then `HBSDCONTROL__*` environment, then command-line flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub verbosity: u8,
    pub force: bool,
    pub immutable: bool,
    pub keep_going: bool,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Enables rolling file logs in this directory.
    pub directory: Option<PathBuf>,
    pub json: bool,
    /// Env-filter directives, e.g. `hbsd_pax=trace`.
    pub filter: Option<String>,
}

impl Settings {
    /// Merges command-line flags on top of the loaded settings.
    #[must_use]
    pub fn options(&self, cli: &Cli) -> ControlOptions {
        let verbosity = self.verbosity.saturating_add(cli.verbose).min(MAX_VERBOSITY);
        ControlOptions::default()
            .with_verbosity(verbosity)
            .with_force(self.force || cli.force)
            .with_immutable(self.immutable || cli.immutable)
            .with_keep_going(self.keep_going || cli.keep_going)
    }
}

/// Loads [`Settings`] from `path`, or from [`DEFAULT_CONFIG_PATH`] when it exists.
///
/// An explicitly named file must exist; the default one is optional.
///
/// # Errors
/// Returns [`SettingsError::Config`] if the file is missing (explicit path only),
/// is not valid TOML, or a value does not fit its field.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    load_with_environment(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(config::Case::Snake)
}

fn load_with_environment(
    path: Option<&Path>,
    environment: Environment,
) -> Result<Settings, SettingsError> {
    let (effective_path, required) =
        path.map_or_else(|| (Path::new(DEFAULT_CONFIG_PATH), false), |p| (p, true));

    tracing::debug!(path = %effective_path.display(), required, "Loading settings");

    let settings = Config::builder()
        .add_source(File::from(effective_path).format(FileFormat::Toml).required(required))
        .add_source(environment)
        .build()
        .context(format!("Failed to read {}", effective_path.display()))?
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_values() {
        let file = settings_file(
            r#"
            verbosity = 1
            keep_going = true

            [log]
            directory = "/var/log/hbsdcontrol"
            json = true
            "#,
        );

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.verbosity, 1);
        assert!(settings.keep_going);
        assert!(!settings.force);
        assert_eq!(settings.log.directory, Some(PathBuf::from("/var/log/hbsdcontrol")));
        assert!(settings.log.json);
        assert!(settings.log.filter.is_none());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = settings_file("force = false\nverbosity = 1\n");
        let vars = config::Map::from([
            ("HBSDCONTROL__FORCE".to_owned(), "true".to_owned()),
            ("HBSDCONTROL__LOG__FILTER".to_owned(), "hbsd_pax=trace".to_owned()),
            ("UNRELATED__FORCE".to_owned(), "false".to_owned()),
        ]);

        let settings =
            load_with_environment(Some(file.path()), environment().source(Some(vars))).unwrap();
        assert!(settings.force);
        assert_eq!(settings.verbosity, 1);
        assert_eq!(settings.log.filter.as_deref(), Some("hbsd_pax=trace"));
    }

    #[test]
    fn test_cli_flags_take_precedence() {
        let settings = Settings { verbosity: 2, keep_going: true, ..Settings::default() };
        let cli = Cli::try_parse_from(["hbsdcontrol", "-vv", "-i", "pax", "list", "/bin/ls"]).unwrap();

        let options = settings.options(&cli);
        assert_eq!(options.verbosity, MAX_VERBOSITY);
        assert!(options.immutable);
        assert!(options.keep_going);
        assert!(!options.force);
    }
}
