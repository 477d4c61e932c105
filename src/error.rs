//! Fatal analysis errors.
//!
//! Per-file problems never surface here; they are recorded as issues or
//! counters on the report.

use std::path::PathBuf;

use thiserror::Error;

/// Conditions that abort a whole analysis run.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("root not found: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("none of the {attempted} candidate files could be read")]
    NoReadableFiles { attempted: usize },
    #[error("analysis cancelled")]
    Cancelled,
    #[error("discovery failed: {0}")]
    Discovery(String),
}

impl From<walkdir::Error> for AnalyzeError {
    fn from(err: walkdir::Error) -> Self {
        AnalyzeError::Discovery(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AnalyzeError::RootNotFound(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "root not found: /nope");
        let err = AnalyzeError::NoReadableFiles { attempted: 3 };
        assert_eq!(err.to_string(), "none of the 3 candidate files could be read");
    }
}
