use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage::ObjectStore;

/// One failed item in the error journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Identifier of the failed item ("N/A" for run-level failures)
    #[serde(rename = "File_ID")]
    pub file_id: String,
    /// Stringified error that failed the item
    #[serde(rename = "Error_Message")]
    pub error_message: String,
}

/// Journal blob path for a run: `{error_folder}/{run_name}_errors.csv`
pub fn journal_path(error_folder: &str, run_name: &str) -> String {
    format!("{error_folder}/{run_name}_errors.csv")
}

/// Append one error record to the run's CSV journal.
///
/// Read-modify-write of the full table: loads the existing journal if
/// present (starts empty otherwise), appends the record, and overwrites the
/// blob. No locking; concurrent writers to the same path are last-writer-wins.
///
/// # Errors
/// Returns error if the store is unreachable or the existing journal does
/// not parse. Callers on the bookkeeping path should prefer
/// [`record_error_best_effort`].
pub fn record_error(
    store: &dyn ObjectStore,
    item_id: &str,
    run_name: &str,
    error_folder: &str,
    message: &str,
) -> Result<()> {
    let path = journal_path(error_folder, run_name);

    let mut records = if store
        .exists(&path)
        .with_context(|| format!("failed to check journal at '{path}'"))?
    {
        let contents = store
            .read_string(&path)
            .with_context(|| format!("failed to read journal at '{path}'"))?;
        parse_journal(&contents).with_context(|| format!("malformed journal at '{path}'"))?
    } else {
        Vec::new()
    };

    records.push(ErrorRecord {
        file_id: item_id.to_owned(),
        error_message: message.to_owned(),
    });

    let contents = render_journal(&records)?;
    store
        .write_string(&path, &contents)
        .with_context(|| format!("failed to write journal at '{path}'"))?;

    info!(item = item_id, path = %path, "recorded error in journal");
    Ok(())
}

/// [`record_error`] that logs and swallows its own failure.
///
/// Error reporting must never crash the pipeline run it reports on, so the
/// journal is strictly best-effort: on failure a warning is logged and the
/// record is lost.
pub fn record_error_best_effort(
    store: &dyn ObjectStore,
    item_id: &str,
    run_name: &str,
    error_folder: &str,
    message: &str,
) {
    if let Err(err) = record_error(store, item_id, run_name, error_folder, message) {
        warn!(
            item = item_id,
            folder = error_folder,
            "failed to journal error (record lost): {err:#}"
        );
    }
}

/// Parse a journal CSV (header row expected) into records
pub fn parse_journal(contents: &str) -> Result<Vec<ErrorRecord>> {
    let mut reader = csv::Reader::from_reader(contents.as_bytes());
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row.context("failed to parse journal row")?);
    }
    Ok(records)
}

fn render_journal(records: &[ErrorRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .context("failed to serialize journal row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush journal writer: {err}"))?;
    String::from_utf8(bytes).context("journal contents were not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStore, MockObjectStore, StorageError};

    #[test]
    fn test_journal_path_format() {
        assert_eq!(
            journal_path("run-7/Errored", "run-7"),
            "run-7/Errored/run-7_errors.csv"
        );
    }

    #[test]
    fn test_render_includes_header_row() {
        let records = vec![ErrorRecord {
            file_id: "f1".to_owned(),
            error_message: "boom".to_owned(),
        }];
        let contents = render_journal(&records).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("File_ID,Error_Message"));
        assert_eq!(lines.next(), Some("f1,boom"));
    }

    #[test]
    fn test_record_error_creates_journal_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        record_error(&store, "f1", "run-1", "run-1/Errored", "boom").unwrap();

        let contents = store
            .read_string("run-1/Errored/run-1_errors.csv")
            .unwrap();
        let records = parse_journal(&contents).unwrap();
        assert_eq!(
            records,
            vec![ErrorRecord {
                file_id: "f1".to_owned(),
                error_message: "boom".to_owned(),
            }]
        );
    }

    #[test]
    fn test_record_error_appends_preserving_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        record_error(&store, "f1", "run-1", "run-1/Errored", "first").unwrap();
        record_error(&store, "f2", "run-1", "run-1/Errored", "second").unwrap();

        let contents = store
            .read_string("run-1/Errored/run-1_errors.csv")
            .unwrap();
        let records = parse_journal(&contents).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_id, "f1");
        assert_eq!(records[1].file_id, "f2");
        assert_eq!(records[1].error_message, "second");
    }

    #[test]
    fn test_record_error_handles_messages_with_commas() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        record_error(&store, "f1", "run-1", "run-1/Errored", "bad, very bad").unwrap();

        let contents = store
            .read_string("run-1/Errored/run-1_errors.csv")
            .unwrap();
        let records = parse_journal(&contents).unwrap();
        assert_eq!(records[0].error_message, "bad, very bad");
    }

    #[test]
    fn test_best_effort_swallows_unreachable_store() {
        let mut store = MockObjectStore::new();
        store.expect_exists().returning(|path| {
            Err(StorageError::NotFound(path.to_owned()))
        });

        // Must not panic or propagate
        record_error_best_effort(&store, "f1", "run-1", "run-1/Errored", "boom");
    }

    #[test]
    fn test_record_error_propagates_malformed_journal() {
        let mut store = MockObjectStore::new();
        store.expect_exists().returning(|_| Ok(true));
        store
            .expect_read_string()
            .returning(|_| Ok("not,a\nvalid\"csv".to_owned()));

        let result = record_error(&store, "f1", "run-1", "run-1/Errored", "boom");
        assert!(result.is_err());
    }
}
