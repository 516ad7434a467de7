//! JSON encoding of the progress document, shared by every backend.

use learn_core::model::ProgressDocument;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Encode a document into its stored JSON form.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode(progress: &ProgressDocument) -> Result<String, StorageError> {
    serde_json::to_string(progress).map_err(ser)
}

/// Decode a stored record, filling any missing fields with defaults.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON or values of the
/// wrong shape.
pub fn decode(document: &str) -> Result<ProgressDocument, StorageError> {
    serde_json::from_str(document).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_default_document_with_all_fields() {
        let json = encode(&ProgressDocument::new()).unwrap();
        assert_eq!(
            json,
            r#"{"completedLessons":[],"quizScores":{},"earnedBadges":[],"currentStreak":0,"totalPoints":0,"languageProgress":{},"schemaVersion":1}"#
        );
    }

    #[test]
    fn decodes_record_written_before_schema_version() {
        let stored = r#"{"completedLessons":[],"quizScores":{},"earnedBadges":[],"currentStreak":0,"totalPoints":0,"languageProgress":{}}"#;
        assert_eq!(decode(stored).unwrap(), ProgressDocument::new());
    }

    #[test]
    fn rejects_non_object_records() {
        let err = decode("null").unwrap_err();
        assert!(err.is_corrupt_record());
    }
}
