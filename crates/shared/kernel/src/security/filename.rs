#[derive(Debug, thiserror::Error)]
pub enum FilenameGuardError {
    #[error("Filename validation error: {message}")]
    Validation { message: String },
}

/// Utilities for turning client-supplied filenames into safe basenames.
#[derive(Debug)]
pub struct FilenameGuard;

impl FilenameGuard {
    /// Reduces an untrusted filename to a basename that is safe to join onto a
    /// storage directory.
    ///
    /// Path separators become separators between name chunks, anything outside
    /// `[A-Za-z0-9._-]` is dropped, and leading/trailing dots and underscores are
    /// stripped, so `../../etc/passwd.png` comes out as `etc_passwd.png`.
    ///
    /// # Errors
    /// Returns an error if nothing safe remains (e.g. `"..."` or an all-symbol name).
    pub fn secure(raw: &str) -> Result<String, FilenameGuardError> {
        let spaced = raw.replace(['/', '\\'], " ");

        let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

        let cleaned: String = joined
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();

        let trimmed = cleaned.trim_matches(['.', '_']).to_owned();

        if trimmed.is_empty() {
            return Err(FilenameGuardError::Validation {
                message: format!("Nothing safe remains of '{raw}'"),
            });
        }

        Ok(trimmed)
    }

    /// The lowercased extension of a (sanitized) filename, if any.
    #[must_use]
    pub fn extension(name: &str) -> Option<String> {
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
