#![deny(missing_docs)]
//! Package to reorganize and index an archive of CDAP field-spectrometer files.
//!
//! Legacy acquisition directories are column-oriented tab delimited text with
//! drifting header vocabularies. The [`reorganize`] module rewrites one such
//! directory into per-dataset directories of normalized csv files, and
//! [`Archive`] indexes the reorganized tree in sqlite for querying.

//
// Public API
//
pub use crate::archive::{Archive, DatasetSummary};
pub use crate::cmd_line::CommonCmdLineArgs;
pub use crate::errors::CdapDataErr;
pub use crate::location::Location;
pub use crate::reorganize::{process_directory, run_batch, BatchSummary};

//
// Implementation only
//
mod archive;
mod cmd_line;
mod errors;

pub mod datalogger;
pub mod keys;
pub mod location;
pub mod logfile;
pub mod metadata;
pub mod reorganize;
pub mod scans;
pub mod table;
