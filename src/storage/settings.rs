use std::path::Path;

use crate::error::AppError;
use crate::models::options::OptionsOverride;

/// Read option overrides. Returns empty overrides if the file does not exist.
pub fn load_overrides(path: impl AsRef<Path>) -> crate::error::Result<OptionsOverride> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No options file at {}, using defaults", path.display());
            return Ok(OptionsOverride::default());
        }
        Err(e) => {
            return Err(AppError::Storage(format!(
                "read {} failed: {}",
                path.display(),
                e
            )))
        }
    };
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Storage(format!("parse {} failed: {}", path.display(), e)))
}

/// Save option overrides. Persists to disk immediately.
pub fn save_overrides(
    path: impl AsRef<Path>,
    overrides: &OptionsOverride,
) -> crate::error::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(overrides)?;
    std::fs::write(path, json)
        .map_err(|e| AppError::Storage(format!("write {} failed: {}", path.display(), e)))
}
