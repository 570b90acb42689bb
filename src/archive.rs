//! An index of reorganized datasets backed by sqlite.

use std::path::PathBuf;

/// The archive.
pub struct Archive {
    // The root directory of the archive, where the index database lives.
    root: PathBuf,
    // The sqlite connection to the index.
    db_conn: rusqlite::Connection,
}

/// A row summarizing one dataset in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    /// The dataset identifier, `{project}_{date}_{start time}`.
    pub dataset_id: String,
    /// The project the dataset belongs to.
    pub project: String,
    /// The acquisition date.
    pub date: String,
    /// The earliest valid start time in the dataset.
    pub start_time: String,
    /// The latest stop time in the dataset.
    pub stop_time: String,
    /// The location label, if the dataset was tied to a known plot.
    pub location: Option<String>,
}

mod modify;
mod query;
mod root;
