//! Error taxonomy for the run store and its collaborators.

use std::path::PathBuf;

/// Errors produced by the run store, migrator and their helpers.
///
/// Missing or malformed *ambient* inputs never surface here; they degrade to
/// `None`. A malformed `runs.json` does, because a corrupt primary store
/// cannot be merged with new data safely.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("run store at {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no run matches '{0}'")]
    NotFound(String),

    #[error("'{reference}' is ambiguous, matches: {}", candidates.join(", "))]
    Ambiguous {
        reference: String,
        candidates: Vec<String>,
    },

    #[error("invalid grade {0}: must be between 1 and 10")]
    InvalidGrade(u8),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for run store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_error_names_the_file() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = StoreError::Corrupt {
            path: PathBuf::from("/tmp/project/.evalstore/runs.json"),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("corrupt"));
        assert!(msg.contains("/tmp/project/.evalstore/runs.json"));
    }

    #[test]
    fn test_ambiguous_error_lists_candidates() {
        let err = StoreError::Ambiguous {
            reference: "v1".to_string(),
            candidates: vec!["run-1-aaaa".to_string(), "run-2-bbbb".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'v1' is ambiguous"));
        assert!(msg.contains("run-1-aaaa"));
        assert!(msg.contains("run-2-bbbb"));
    }

    #[test]
    fn test_not_found_is_distinct_from_ambiguous() {
        let err = StoreError::NotFound("missing".to_string());
        assert!(err.to_string().contains("no run matches 'missing'"));
        assert!(!matches!(err, StoreError::Ambiguous { .. }));
    }
}
