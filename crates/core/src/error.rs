use crate::knowledge::{ConditionId, MedicationId};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid knowledge table: {0}")]
    InvalidCatalog(String),

    #[error("unknown condition id {0}")]
    UnknownCondition(ConditionId),
    #[error("unknown medication id {0}")]
    UnknownMedication(MedicationId),
    #[error("no distinct condition found for slot {slot} after {attempts} draws")]
    RetryBudgetExhausted { slot: usize, attempts: usize },
    #[error("date out of range: {0}")]
    DateOutOfRange(String),
    #[error("generated record violates an invariant: {0}")]
    InvariantViolation(String),

    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("identifier error: {0}")]
    Uuid(#[from] synth_uuid::UuidError),
    #[error("invalid period: {0}")]
    Period(#[from] synth_types::PeriodError),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("patient bundle already exported at {}", .0.display())]
    AlreadyExported(PathBuf),
    #[error("failed to write bundle file: {0}")]
    FileWrite(std::io::Error),
    #[error("export exceeded its time budget after {written} files")]
    BudgetExceeded { written: usize },
    #[error(
        "export failed and cleanup also failed (path: {path}): export={export_error}; cleanup={cleanup_error}",
        path = path.display()
    )]
    CleanupAfterExportFailed {
        path: PathBuf,
        #[source]
        export_error: Box<SynthError>,
        cleanup_error: std::io::Error,
    },
}

/// Broad classification of a [`SynthError`], used by runners to decide what to abort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad configuration or knowledge tables. The run cannot start.
    Configuration,
    /// One patient could not be generated. The patient is skipped.
    Generation,
    /// One patient's bundle could not be written. Its files were rolled back.
    Export,
}

impl SynthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthError::InvalidInput(_)
            | SynthError::InvalidCatalog(_)
            | SynthError::StorageDirCreation(_) => ErrorKind::Configuration,
            SynthError::UnknownCondition(_)
            | SynthError::UnknownMedication(_)
            | SynthError::RetryBudgetExhausted { .. }
            | SynthError::DateOutOfRange(_)
            | SynthError::InvariantViolation(_)
            | SynthError::Uuid(_)
            | SynthError::Period(_) => ErrorKind::Generation,
            SynthError::Fhir(_)
            | SynthError::AlreadyExported(_)
            | SynthError::FileWrite(_)
            | SynthError::BudgetExceeded { .. }
            | SynthError::CleanupAfterExportFailed { .. } => ErrorKind::Export,
        }
    }
}

pub type SynthResult<T> = std::result::Result<T, SynthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            SynthError::InvalidInput("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            SynthError::RetryBudgetExhausted {
                slot: 2,
                attempts: 64
            }
            .kind(),
            ErrorKind::Generation
        );
        assert_eq!(
            SynthError::BudgetExceeded { written: 3 }.kind(),
            ErrorKind::Export
        );
    }

    #[test]
    fn test_cleanup_error_keeps_both_causes() {
        let err = SynthError::CleanupAfterExportFailed {
            path: PathBuf::from("/tmp/x"),
            export_error: Box::new(SynthError::BudgetExceeded { written: 1 }),
            cleanup_error: std::io::Error::new(std::io::ErrorKind::Other, "busy"),
        };
        let message = err.to_string();
        assert!(message.contains("time budget"), "message: {message}");
        assert!(message.contains("busy"), "message: {message}");
        assert!(std::error::Error::source(&err).is_some());
    }
}
