//! Host-side failures.

/// Error returned by a [`PreferenceStore`](super::PreferenceStore).
///
/// The controller never propagates these; it treats a failed read as "no
/// saved preference" and drops failed writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled, sandboxed, or otherwise missing.
    #[error("preference storage is unavailable")]
    Unavailable,
    /// Reading the key failed.
    #[error("failed to read preference '{key}': {reason}")]
    Read { key: String, reason: String },
    /// Writing the key failed (quota, permissions, ...).
    #[error("failed to write preference '{key}': {reason}")]
    Write { key: String, reason: String },
}

/// Returned by a [`ColorSchemeQuery`](super::ColorSchemeQuery) that lacks a
/// subscription mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("change subscription is not supported")]
pub struct Unsupported;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_display() {
        let err = StorageError::Write {
            key: "theme".to_string(),
            reason: "quota exceeded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("theme"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_unavailable_display() {
        assert_eq!(
            StorageError::Unavailable.to_string(),
            "preference storage is unavailable"
        );
    }
}
