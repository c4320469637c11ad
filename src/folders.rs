use tracing::{info, warn};

use crate::journal;
use crate::storage::ObjectStore;

/// The five bucket-relative folder paths for one pipeline run.
///
/// All paths are prefixed with the run name; the two DataFrame folders are
/// nested under staging. "Stagging" is the spelling downstream stages
/// address, so it stays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSet {
    /// Scratch space for in-flight per-call work
    pub staging: String,
    /// Per-call (intra-call) DataFrames
    pub intra_call_dfs: String,
    /// Cross-call (inter-call) DataFrames
    pub inter_call_dfs: String,
    /// Raw transcripts for the run
    pub transcripts: String,
    /// Error journal destination
    pub errored: String,
}

impl FolderSet {
    /// Derive the folder paths for a run. Pure string templating, no I/O.
    pub fn for_run(run_name: &str) -> Self {
        Self {
            staging: format!("{run_name}/Stagging"),
            intra_call_dfs: format!("{run_name}/Stagging/IntraCallDFs"),
            inter_call_dfs: format!("{run_name}/Stagging/InterCallDFs"),
            transcripts: format!("{run_name}/Transcripts"),
            errored: format!("{run_name}/Errored"),
        }
    }

    /// All paths in the set, paired with their logical names
    pub fn paths(&self) -> [(&'static str, &str); 5] {
        [
            ("staging", self.staging.as_str()),
            ("intra_call_dfs", self.intra_call_dfs.as_str()),
            ("inter_call_dfs", self.inter_call_dfs.as_str()),
            ("transcripts", self.transcripts.as_str()),
            ("errored", self.errored.as_str()),
        ]
    }
}

/// Materialize the run's folder set as marker objects in the bucket.
///
/// Idempotent: re-running overwrites the zero-byte markers without error.
/// Creation order is insignificant; each creation is logged individually.
///
/// Any storage failure is journaled best-effort (item id `"N/A"`) against
/// the run's errored folder, falling back to `fallback_error_folder` if that
/// journal write itself fails, and the call returns `None`. The failure is
/// never propagated: callers get best-effort error reporting, not a
/// guaranteed raised failure.
pub fn generate_folders(
    store: &dyn ObjectStore,
    run_name: &str,
    fallback_error_folder: Option<&str>,
) -> Option<FolderSet> {
    info!(run = run_name, "started: generating pipeline folders");
    let folders = FolderSet::for_run(run_name);

    for (name, path) in folders.paths() {
        if let Err(err) = store.write_string(&format!("{path}/"), "") {
            warn!(folder = name, path = %path, "folder creation failed: {err}");
            journal_scaffold_failure(
                store,
                run_name,
                &folders.errored,
                fallback_error_folder,
                &err.to_string(),
            );
            return None;
        }
        info!("created folder: {path}");
    }

    info!(run = run_name, "completed: generating pipeline folders");
    Some(folders)
}

/// Journal a scaffolding failure without ever raising.
///
/// The errored folder may itself be uncreated (or unreachable) when
/// scaffolding fails, so a configured fallback folder gets a second attempt
/// before the record is given up on.
fn journal_scaffold_failure(
    store: &dyn ObjectStore,
    run_name: &str,
    error_folder: &str,
    fallback_error_folder: Option<&str>,
    message: &str,
) {
    if let Err(err) = journal::record_error(store, "N/A", run_name, error_folder, message) {
        warn!(folder = error_folder, "journal write failed: {err:#}");
        match fallback_error_folder {
            Some(fallback) => {
                journal::record_error_best_effort(store, "N/A", run_name, fallback, message);
            }
            None => warn!("no fallback error folder configured, record lost"),
        }
    }
}
