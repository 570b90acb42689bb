//! Writers for the normalized per-dataset output files and the directory
//! layout they live in.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::warn;
use strum::IntoEnumIterator;

use crate::{
    datalogger::Channel,
    errors::CdapDataErr,
    keys::{Field, KeyDict},
    metadata::Metadata,
    table::RawTable,
};

/// Non-scan fields written to the auxiliary file, in output order.
const AUX_FIELDS: &[Field] = &[
    Field::Project,
    Field::Replication,
    Field::X,
    Field::Y,
    Field::ScanNumber,
    Field::SolarAzimuth,
    Field::SolarElevation,
    Field::SolarZenith,
    Field::Gps,
    Field::Altitude,
    Field::Latitude,
    Field::Longitude,
];

/// Provenance fields written ahead of the spectral rows in scan files.
const SCAN_FIELDS: &[Field] = &[
    Field::FileName,
    Field::Project,
    Field::Replication,
    Field::X,
    Field::Y,
    Field::ScanNumber,
    Field::StartTime,
    Field::StopTime,
    Field::IntegrationTime,
    Field::AveragedScans,
    Field::AverageAdj,
];

/// Create the directory a dataset's files go into, handling collisions.
///
/// Normally the target is `base` itself. When `base` already holds a dataset
/// (a previous acquisition with the same location and date), its contents are
/// moved into a subdirectory named by the existing dataset's id, and the new
/// dataset gets its own id-named subdirectory alongside. A colliding
/// directory whose metadata file is unreadable stops processing of the new
/// directory; guessing an id here would scramble two datasets together.
pub fn create_dataset_dir(base: &Path, dataset_id: &str) -> Result<PathBuf, CdapDataErr> {
    if !base.exists() {
        fs::create_dir_all(base)?;
        return Ok(base.to_path_buf());
    }

    let meta_path = base.join("Metadata.csv");
    if meta_path.exists() {
        let existing = Metadata::read_csv(&meta_path)
            .map_err(|_| CdapDataErr::InvalidMetadata(meta_path.clone()))?;
        let existing_id = existing
            .get("Dataset ID")
            .ok_or_else(|| CdapDataErr::InvalidMetadata(meta_path.clone()))?
            .clone();

        warn!(
            "another dataset found at {}, splitting into id-named subdirectories",
            base.display()
        );

        // Snapshot the listing before moving anything, renaming during
        // iteration can skip entries on some filesystems.
        let entries: Vec<fs::DirEntry> = fs::read_dir(base)?.collect::<Result<_, _>>()?;

        let existing_dir = base.join(&existing_id);
        fs::create_dir_all(&existing_dir)?;
        for entry in entries {
            if entry.file_name().to_string_lossy() != existing_id {
                fs::rename(entry.path(), existing_dir.join(entry.file_name()))?;
            }
        }
    } else {
        // Already split into id-named subdirectories by an earlier collision,
        // anything else here is a partial write from a crashed run.
        let all_dirs = fs::read_dir(base)?
            .filter_map(|entry| entry.ok())
            .all(|entry| entry.path().is_dir());
        if !all_dirs {
            return Err(CdapDataErr::InvalidMetadata(meta_path));
        }
    }

    let new_dir = base.join(dataset_id);
    fs::create_dir_all(&new_dir)?;
    Ok(new_dir)
}

/// Write the auxiliary file for one group: the dataset id, the fixed
/// non-scan fields, decoded datalogger channels, then any unanticipated
/// header fields verbatim.
pub fn write_aux_file(
    table: &RawTable,
    keys: &KeyDict,
    dataset_id: &str,
    path: &Path,
) -> Result<(), CdapDataErr> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;

    writer.write_record(&["Dataset ID", dataset_id])?;

    for &field in AUX_FIELDS {
        if let Some(key) = keys.get(field) {
            if let Some(values) = table.row_values(key) {
                write_labeled_row(&mut writer, field.as_static_str(), values)?;
            }
        }
    }

    for channel in Channel::iter() {
        if !keys.channels().contains(&channel) {
            continue;
        }
        if let Some(values) = table.row_values(channel.as_static_str()) {
            write_labeled_row(&mut writer, channel.as_static_str(), values)?;
        }
    }

    for other_key in keys.other_keys() {
        if let Some(values) = table.row_values(other_key) {
            if !values.is_empty() {
                write_labeled_row(&mut writer, other_key, values)?;
            }
        }
    }

    writer.flush().map_err(CdapDataErr::from)
}

/// Write a scan data file for one group: the dataset id, fixed provenance
/// fields, then the wavelength and dark current rows byte-for-byte.
pub fn write_scan_file(
    table: &RawTable,
    keys: &KeyDict,
    dataset_id: &str,
    path: &Path,
) -> Result<(), CdapDataErr> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;

    writer.write_record(&["Dataset ID", dataset_id])?;

    for &field in SCAN_FIELDS {
        if let Some(key) = keys.get(field) {
            if let Some(values) = table.row_values(key) {
                write_labeled_row(&mut writer, field.as_static_str(), values)?;
            }
        }
    }

    for row in table.scan_rows() {
        write_labeled_row(&mut writer, &row.key, &row.values)?;
    }

    writer.flush().map_err(CdapDataErr::from)
}

/// Write the reconciled acquisition log rows for one group, original header
/// rows first.
pub fn write_scan_log(
    header_rows: &[Vec<String>],
    matched_rows: &[Vec<String>],
    path: &Path,
) -> Result<(), CdapDataErr> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;

    for row in header_rows.iter().chain(matched_rows) {
        writer.write_record(row)?;
    }

    writer.flush().map_err(CdapDataErr::from)
}

fn write_labeled_row(
    writer: &mut csv::Writer<fs::File>,
    label: &str,
    values: &[String],
) -> Result<(), CdapDataErr> {
    let mut record: Vec<&str> = Vec::with_capacity(values.len() + 1);
    record.push(label);
    record.extend(values.iter().map(String::as_str));
    writer.write_record(&record).map_err(CdapDataErr::from)
}

#[cfg(test)]
mod unit {
    use super::*;

    use tempdir::TempDir;

    #[test]
    fn test_create_dataset_dir_fresh() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let base = tmp.path().join("06-21-2005").join("CSP01");

        let dir = create_dataset_dir(&base, "CSP01_06-21-2005_10:15:00").unwrap();
        assert_eq!(dir, base);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_create_dataset_dir_collision() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let base = tmp.path().join("06-21-2005").join("CSP01");
        fs::create_dir_all(&base).unwrap();
        fs::write(
            base.join("Metadata.csv"),
            "Dataset ID,CSP01_06-21-2005_09:00:00\n",
        )
        .unwrap();
        fs::write(base.join("Auxiliary.csv"), "Dataset ID,x\n").unwrap();

        let dir = create_dataset_dir(&base, "CSP01_06-21-2005_10:15:00").unwrap();

        assert_eq!(dir, base.join("CSP01_06-21-2005_10:15:00"));
        // Existing content moved under the existing dataset's id.
        let old = base.join("CSP01_06-21-2005_09:00:00");
        assert!(old.join("Metadata.csv").is_file());
        assert!(old.join("Auxiliary.csv").is_file());
        assert!(!base.join("Metadata.csv").exists());
    }

    #[test]
    fn test_create_dataset_dir_unreadable_collision() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let base = tmp.path().join("06-21-2005").join("CSP01");
        fs::create_dir_all(&base).unwrap();
        // A metadata file with no Dataset ID row.
        fs::write(base.join("Metadata.csv"), "Project,CSP01\n").unwrap();

        match create_dataset_dir(&base, "CSP01_06-21-2005_10:15:00") {
            Err(CdapDataErr::InvalidMetadata(_)) => {}
            other => panic!("Expected InvalidMetadata, got {:?}", other),
        }
    }

    #[test]
    fn test_create_dataset_dir_second_collision() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let base = tmp.path().join("06-21-2005").join("cal_data");
        // Already split into id-named subdirectories.
        fs::create_dir_all(base.join("CSP-CAL_06-21-2005_09:00:00")).unwrap();

        let dir = create_dataset_dir(&base, "CSP-CAL_06-21-2005_10:15:00").unwrap();
        assert_eq!(dir, base.join("CSP-CAL_06-21-2005_10:15:00"));
    }
}
