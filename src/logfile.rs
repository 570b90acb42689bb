//! Reading acquisition logs and reconciling their rows with parsed scans.
//!
//! The acquisition software wrote a free-form event log next to the data
//! files, one row per scan, but with its own spellings and clock. Rows are
//! matched back to scans by project and replication first, then by time
//! proximity, so the matched subset can be carried into each dataset
//! directory as provenance.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use chrono::NaiveTime;
use log::warn;

use crate::{errors::CdapDataErr, metadata::is_valid_time};

/// Log timestamps may trail scan completion, so the window is asymmetric.
const EARLY_TOLERANCE_SECS: i64 = 1;
const LATE_TOLERANCE_SECS: i64 = 2;

/// A parsed acquisition log: verbatim header rows, then data rows.
#[derive(Debug, Clone)]
pub struct AcquisitionLog {
    /// Leading rows carrying no timestamp, kept verbatim for output.
    pub header_rows: Vec<Vec<String>>,
    /// The event rows.
    pub rows: Vec<Vec<String>>,
}

/// Per-scan identity used to claim log rows, parallel lists one entry per
/// scan column.
#[derive(Debug, Clone, Default)]
pub struct ScansInfo {
    /// Standardized project name per scan.
    pub projects: Vec<String>,
    /// Replication label per scan.
    pub reps: Vec<String>,
    /// Scan stop time per scan.
    pub end_times: Vec<String>,
}

impl ScansInfo {
    /// Number of scans.
    pub fn len(&self) -> usize {
        self.end_times.len()
    }

    /// True when there are no scans to reconcile against.
    pub fn is_empty(&self) -> bool {
        self.end_times.is_empty()
    }

    /// Add one scan's identity.
    pub fn push(&mut self, project: &str, rep: &str, end_time: &str) {
        self.projects.push(project.to_owned());
        self.reps.push(rep.to_owned());
        self.end_times.push(end_time.to_owned());
    }
}

/// Read an acquisition log.
///
/// Rows are tab delimited, falling back to whitespace splitting for logs
/// written before the format settled. A row with no `HH:MM:SS` shaped field
/// before the first timestamped row is header material.
pub fn read_log(path: &Path) -> Result<AcquisitionLog, CdapDataErr> {
    let file = File::open(path)?;

    let mut header_rows = vec![];
    let mut rows = vec![];
    let mut in_header = true;

    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if line.is_empty() {
            continue;
        }

        let fields: Vec<String> = if line.contains('\t') {
            line.split('\t').map(str::to_owned).collect()
        } else {
            line.split_whitespace().map(str::to_owned).collect()
        };

        if in_header && !fields.iter().any(|f| is_valid_time(f)) {
            header_rows.push(fields);
        } else {
            in_header = false;
            rows.push(fields);
        }
    }

    Ok(AcquisitionLog { header_rows, rows })
}

/// Match log rows to scans.
///
/// Only rows with at least 6 fields are considered; shorter rows are comments
/// or partial writes. For each row, candidates are walked in scan order and
/// the first match is claimed, once per call, so repeated reconciliation of
/// the same inputs yields the same result. A row matches a scan when project
/// and replication agree after equivalence normalization, or failing that,
/// when any timestamp-shaped field of the row falls inside the tolerance
/// window around the scan's end time. Rows carry both start and end stamps,
/// and only the end stamp is expected to land in the window.
pub fn reconcile(log: &AcquisitionLog, info: &ScansInfo) -> Vec<Vec<String>> {
    let mut claimed = vec![false; info.len()];
    let mut matched = vec![];

    for row in &log.rows {
        if row.len() < 6 {
            continue;
        }

        let row_project = row[0].as_str();
        let row_rep = row[1].as_str();
        let row_times: Vec<&String> = row.iter().filter(|f| is_valid_time(f)).collect();

        for idx in 0..info.len() {
            if claimed[idx] {
                continue;
            }

            let name_match = project_eq(row_project, &info.projects[idx])
                && rep_eq(row_rep, &info.reps[idx]);
            let time_match = row_times
                .iter()
                .any(|time| time_in_window(time, &info.end_times[idx]));

            if name_match || time_match {
                claimed[idx] = true;
                matched.push(row.clone());
                break;
            }
        }
    }

    matched
}

/// Reconcile and check the match count against the expected scan count.
/// A shortfall is a data-quality warning, real archives have gaps.
pub fn reconcile_checked(
    log: &AcquisitionLog,
    info: &ScansInfo,
    dir_label: &str,
) -> Vec<Vec<String>> {
    let matched = reconcile(log, info);

    if matched.len() != info.len() {
        warn!(
            "matched {} log rows for {} scans in {}",
            matched.len(),
            info.len(),
            dir_label
        );
    }

    matched
}

/// Project equality tolerating the known transposition of BLMV/BLVM.
fn project_eq(a: &str, b: &str) -> bool {
    normalize_project(a) == normalize_project(b)
}

fn normalize_project(project: &str) -> String {
    let upper = project.to_uppercase();
    if upper == "BLVM" {
        "BLMV".to_owned()
    } else {
        upper
    }
}

/// Replication equality tolerating the soy/soybean synonym.
fn rep_eq(a: &str, b: &str) -> bool {
    normalize_rep(a) == normalize_rep(b)
}

fn normalize_rep(rep: &str) -> String {
    rep.to_lowercase().replace("soybean", "soy")
}

fn time_in_window(log_time: &str, end_time: &str) -> bool {
    let log_time = match NaiveTime::parse_from_str(log_time, "%H:%M:%S") {
        Ok(t) => t,
        Err(_) => return false,
    };
    let end_time = match NaiveTime::parse_from_str(end_time, "%H:%M:%S") {
        Ok(t) => t,
        Err(_) => return false,
    };

    let skew = log_time.signed_duration_since(end_time).num_milliseconds();

    -EARLY_TOLERANCE_SECS * 1000 <= skew && skew <= LATE_TOLERANCE_SECS * 1000
}
