use crate::error::PaxError;
use crate::options::ControlOptions;
use std::path::Path;

/// Checks that `file` may be mutated.
///
/// Only regular files carry PaX attributes that the loader honors, so anything
/// else is refused unless `force` is set. Symlinks are followed.
///
/// # Errors
/// [`PaxError::FileNotFound`] if `file` does not exist, or
/// [`PaxError::UnsupportedTarget`] for a non-regular file without `force`.
pub fn check_target(file: &Path, options: &ControlOptions) -> Result<(), PaxError> {
    let metadata = std::fs::metadata(file).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => PaxError::FileNotFound {
            message: file.display().to_string().into(),
            context: None,
        },
        _ => PaxError::Internal {
            message: err.to_string().into(),
            context: Some(file.display().to_string().into()),
        },
    })?;

    if options.force || metadata.is_file() {
        return Ok(());
    }

    Err(PaxError::UnsupportedTarget {
        message: file.display().to_string().into(),
        context: Some("Not a regular file, use -f to force".into()),
    })
}
