//! The reorganization pipeline.
//!
//! One acquisition directory is processed as a unit: the Upwelling file is
//! parsed and partitioned into a calibration group and per-location groups,
//! and the Downwelling, Reflectance, and raw files are then split along the
//! same column partition. Each group becomes one dataset directory under
//! `{out}/{date}/{location|cal_data}/` holding auxiliary, scan, metadata,
//! and reconciled log files.
//!
//! Directories are independent of each other. The batch driver isolates
//! failures per directory, removes that directory's partial output, and keeps
//! running lists of completed and failed directories so a rerun can target
//! only the failures.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use crate::{
    datalogger,
    errors::CdapDataErr,
    keys::{Field, KeyDict},
    location::Location,
    logfile::{self, ScansInfo},
    metadata::Metadata,
    scans,
    table::RawTable,
};

pub mod downwelling;
pub mod output;
pub mod raw;
pub mod reflectance;
pub mod upwelling;

pub(crate) const ACQUISITION_SOFTWARE: &str = "CALMIT Data Acquisition Program (CDAP)";

/// One output group of an acquisition directory: either the calibration
/// scans or all field scans of one location.
#[derive(Debug)]
pub struct Group {
    /// The resolved plot, `None` for the calibration group.
    pub location: Option<Location>,
    /// Scan column indexes into the acquisition's tables.
    pub idxs: Vec<usize>,
    /// The group's metadata record, enriched as later passes run.
    pub meta: Metadata,
    /// Per-scan identity for log reconciliation.
    pub scans: ScansInfo,
    /// The dataset directory the group's files are written to.
    pub out_dir: PathBuf,
}

/// The column partition and per-group state computed from the Upwelling
/// pass, threaded through every later pass of the same directory.
#[derive(Debug)]
pub struct DirectoryPlan {
    /// Header key resolution, shared by all files of the directory.
    pub keys: KeyDict,
    /// Standardized project name per scan column.
    pub standard_projects: Vec<String>,
    /// The calibration group, absent when the directory has no cal scans.
    pub cal: Option<Group>,
    /// One group per resolved location, in order of first appearance.
    pub locations: Vec<Group>,
}

impl DirectoryPlan {
    /// All groups, calibration first.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.cal.iter().chain(self.locations.iter())
    }
}

/// Outcome counts of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    /// Directories fully processed.
    pub completed: usize,
    /// Directories skipped for want of an upwelling file.
    pub skipped: usize,
    /// Directories that failed and were rolled back.
    pub failed: usize,
}

/// Process one acquisition directory end to end.
///
/// Returns `Ok(false)` when the directory holds no upwelling data and was
/// skipped. On error, every dataset directory this call created is removed
/// so a failed directory leaves no partial output behind.
pub fn process_directory(data_dir: &Path, out_root: &Path) -> Result<bool, CdapDataErr> {
    let mut created = vec![];

    match process_directory_inner(data_dir, out_root, &mut created) {
        Ok(processed) => Ok(processed),
        Err(err) => {
            cleanup_outputs(&created, out_root);
            Err(err)
        }
    }
}

fn process_directory_inner(
    data_dir: &Path,
    out_root: &Path,
    created: &mut Vec<PathBuf>,
) -> Result<bool, CdapDataErr> {
    let mut plan = match upwelling::process_upwelling(data_dir, out_root, created)? {
        Some(plan) => plan,
        None => {
            warn!("no upwelling files in {}, skipping", data_dir.display());
            return Ok(false);
        }
    };

    process_log(data_dir, &plan)?;
    process_vegfraction(data_dir, &plan)?;
    raw::process_raw(data_dir, &plan, raw::RawFamily::Upwelling)?;
    raw::process_raw(data_dir, &plan, raw::RawFamily::Downwelling)?;
    downwelling::process_downwelling(data_dir, &mut plan)?;
    reflectance::process_reflectance(data_dir, &plan)?;

    Ok(true)
}

/// Process every directory listed in a master list file, one path per line.
///
/// Completed directories are appended to `completed.txt` and failures are
/// written to `error_list.txt`, both next to the master list, so a follow-up
/// run can use the error list as its master list.
pub fn run_batch(master_list: &Path, out_root: &Path) -> Result<BatchSummary, CdapDataErr> {
    let list_dir = master_list
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let contents = fs::read_to_string(master_list)?;
    let data_dirs: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut summary = BatchSummary::default();
    let mut failures = vec![];

    for data_dir in data_dirs {
        match process_directory(Path::new(data_dir), out_root) {
            Ok(true) => {
                summary.completed += 1;
                let mut completed = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(list_dir.join("completed.txt"))?;
                writeln!(completed, "{}", data_dir)?;
            }
            Ok(false) => summary.skipped += 1,
            Err(err) => {
                error!("problem processing {}: {}", data_dir, err);
                summary.failed += 1;
                failures.push(data_dir);
            }
        }
    }

    if !failures.is_empty() {
        // Rewritten whole each run so it only names the latest failures.
        fs::write(
            list_dir.join("error_list.txt"),
            failures.join("\n") + "\n",
        )?;
    }

    Ok(summary)
}

fn cleanup_outputs(created: &[PathBuf], out_root: &Path) {
    for dir in created {
        info!("cleaning up {}", dir.display());
        if let Err(err) = fs::remove_dir_all(dir) {
            warn!("could not remove {}: {}", dir.display(), err);
            continue;
        }

        // Prune the date directory when nothing else was written under it.
        // The climb stops at the output root, which this run did not create.
        let mut parent = dir.parent();
        while let Some(p) = parent {
            if p == out_root || !p.starts_with(out_root) {
                break;
            }
            let empty = fs::read_dir(p)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if !empty || fs::remove_dir(p).is_err() {
                break;
            }
            parent = p.parent();
        }
    }
}

/// Find the files of one instrument family, e.g. `Upwelling*.txt` with the
/// `Outgoing*.txt` fallback naming of early seasons. Sorted so `*Data01.txt`
/// leads.
pub(crate) fn family_files(
    dir: &Path,
    prefixes: &[&str],
) -> Result<Vec<PathBuf>, CdapDataErr> {
    for prefix in prefixes {
        let mut found = vec![];
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(prefix) && name.ends_with(".txt") {
                found.push(entry.path());
            }
        }
        if !found.is_empty() {
            found.sort();
            return Ok(found);
        }
    }

    Ok(vec![])
}

/// Load and column-concatenate one family's files. CDAP 2 output is detected
/// and rejected here, it uses a row-per-scan layout this pipeline does not
/// speak.
pub(crate) fn load_family(
    dir: &Path,
    prefixes: &[&str],
) -> Result<Option<RawTable>, CdapDataErr> {
    let files = family_files(dir, prefixes)?;
    if files.is_empty() {
        return Ok(None);
    }

    let refs: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
    let table = RawTable::load_concat(&refs)?;

    if table.is_cdap2() {
        return Err(CdapDataErr::Cdap2NotSupported);
    }

    Ok(Some(table))
}

/// Replace a group's packed datalogger row with one row per decoded channel.
///
/// Data collected in 2001 predates the datalogger and carries junk in that
/// field, so it is left untouched.
pub(crate) fn decode_group(
    table: &mut RawTable,
    keys: &mut KeyDict,
    dir_label: &str,
) -> Result<(), CdapDataErr> {
    let date = table.cell(keys.key(Field::Date)?, 0).unwrap_or("");
    if date.starts_with("2001") {
        return Ok(());
    }

    let dl_key = keys.key(Field::DataLogger)?.to_owned();
    let entries = match table.row_values(&dl_key) {
        Some(values) if !values.is_empty() => values.to_vec(),
        _ => return Ok(()),
    };

    let decoded = datalogger::decode(&entries, dir_label)?;
    if decoded.is_empty() {
        return Ok(());
    }

    table.remove_row(&dl_key);
    for (channel, values) in decoded {
        table.insert_header_row(channel.as_static_str(), values);
        keys.add_channel(channel);
    }

    Ok(())
}

/// Select a location group's columns and drop any that the current file
/// marks as calibration scans.
pub(crate) fn non_cal_subtable(
    table: &RawTable,
    idxs: &[usize],
    keys: &KeyDict,
) -> Result<RawTable, CdapDataErr> {
    let sub = table.select_columns(idxs);

    let rep_key = keys.key(Field::Replication)?;
    let file_key = keys.key(Field::FileName)?;

    let keep: Vec<usize> = (0..sub.num_scans())
        .filter(|&col| {
            let rep = sub.cell(rep_key, col).unwrap_or("");
            let file_name = sub.cell(file_key, col).unwrap_or("");
            !scans::is_cal_scan(rep, file_name)
        })
        .collect();

    Ok(sub.select_columns(&keep))
}

/// Per-scan identity lists for log reconciliation, one entry per column.
pub(crate) fn scans_info_for(
    table: &RawTable,
    keys: &KeyDict,
) -> Result<ScansInfo, CdapDataErr> {
    let project_key = keys.key(Field::Project)?;
    let rep_key = keys.key(Field::Replication)?;
    let stop_key = keys.key(Field::StopTime)?;
    let file_key = keys.key(Field::FileName)?;

    let num = table.row_values(file_key).map(|v| v.len()).unwrap_or(0);

    let mut info = ScansInfo::default();
    for col in 0..num {
        info.push(
            table.cell(project_key, col).unwrap_or(""),
            table.cell(rep_key, col).unwrap_or(""),
            table.cell(stop_key, col).unwrap_or(""),
        );
    }

    Ok(info)
}

/// Inject one family's wavelength statistics into a metadata record.
pub(crate) fn inject_instrument_stats(meta: &mut Metadata, family: &str, wavelengths: &[f64]) {
    let min = wavelengths.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = wavelengths.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if !wavelengths.is_empty() {
        meta.set_scalar(
            format!("{} Instrument Max Wavelength", family).as_str(),
            format!("{}", max),
        );
        meta.set_scalar(
            format!("{} Instrument Min Wavelength", family).as_str(),
            format!("{}", min),
        );
    }
    meta.set_scalar(
        format!("{} Instrument Channels", family).as_str(),
        format!("{}", wavelengths.len()),
    );
}

/// Write each group's metadata file, the terminal step for a directory.
pub(crate) fn write_metadata_files(plan: &DirectoryPlan) -> Result<(), CdapDataErr> {
    for group in plan.groups() {
        group.meta.write_csv(&group.out_dir.join("Metadata.csv"))?;
    }
    Ok(())
}

/// Find the acquisition log of a directory. At most one may exist; several
/// means the directory was assembled wrong and splitting scans between them
/// would be a guess.
pub(crate) fn find_log_file(dir: &Path) -> Result<Option<PathBuf>, CdapDataErr> {
    let mut logs = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.contains("log") && name.ends_with(".txt") {
            logs.push(entry.path());
        }
    }

    match logs.len() {
        0 => Ok(None),
        1 => Ok(logs.pop()),
        num => Err(CdapDataErr::MultipleLogFiles(num)),
    }
}

/// Find the vegetation fraction file of a directory, under the same
/// at-most-one rule as the acquisition log.
pub(crate) fn find_vegfraction_file(dir: &Path) -> Result<Option<PathBuf>, CdapDataErr> {
    let mut found = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.contains("vegfraction") && name.ends_with(".txt") {
            found.push(entry.path());
        }
    }

    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        num => Err(CdapDataErr::MultipleVegFractionFiles(num)),
    }
}

/// Carry the day's vegetation fraction file into each dataset directory
/// verbatim. It describes the whole collection day, so every group gets a
/// copy.
pub(crate) fn process_vegfraction(
    data_dir: &Path,
    plan: &DirectoryPlan,
) -> Result<(), CdapDataErr> {
    let veg_path = match find_vegfraction_file(data_dir)? {
        Some(path) => path,
        None => return Ok(()),
    };

    let file_name = veg_path
        .file_name()
        .ok_or(CdapDataErr::LogicError("vegetation fraction file has no name"))?;

    for group in plan.groups() {
        fs::copy(&veg_path, group.out_dir.join(file_name))?;
    }

    Ok(())
}

/// Reconcile the acquisition log against each group and write the matched
/// rows into the group's dataset directory.
pub(crate) fn process_log(data_dir: &Path, plan: &DirectoryPlan) -> Result<(), CdapDataErr> {
    let log_path = match find_log_file(data_dir)? {
        Some(path) => path,
        None => {
            info!("no acquisition log in {}", data_dir.display());
            return Ok(());
        }
    };

    let log = logfile::read_log(&log_path)?;

    for group in plan.groups() {
        let label = group.out_dir.display().to_string();
        let matched = logfile::reconcile_checked(&log, &group.scans, &label);
        output::write_scan_log(&log.header_rows, &matched, &group.out_dir.join("Scan_Log.csv"))?;
    }

    Ok(())
}

#[cfg(test)]
mod unit {
    use super::*;

    use tempdir::TempDir;

    // An acquisition day with five scan columns: two calibration scans (one
    // marked by filename, one by replication), two corn scans at plot 1, and
    // one soybean scan whose coordinates land in plot 2.
    fn write_upwelling_fixture(dir: &Path) {
        let contents = "\
Project\tcsp01\tcsp01\tcsp01\tcsp02\tcsp01\n\
Rep\tcorn east\tcorn east\tcorn west\tsoybean 1\tCAL\n\
X\t0\t1\t2\t1\t0\n\
Y\t0\t1\t1\t1\t0\n\
Count\t1\t2\t3\t4\t5\n\
Solar Azimuth\t120.0\t121.0\t122.0\t123.0\t124.0\n\
Solar Elev\t45.0\t45.2\t45.4\t45.6\t45.8\n\
Solar Zenith\t45.0\t44.8\t44.6\t44.4\t44.2\n\
Altitude\t350\t350\t350\t351\t350\n\
Longitude\t-96.478\t-96.478\t-96.478\t-96.470\t-96.478\n\
Latitude\t41.165\t41.165\t41.165\t41.165\t41.165\n\
Comments\t\t\t\t\t\n\
GPS\tA\tA\tA\tA\tA\n\
Data Logger\tbv12.4,t125.1,t224.0\tbv12.4,t125.2,t224.1\tbv12.3,t125.3,t224.2\tbv12.3,t125.4,t224.3\tbv12.2,t125.5,t224.4\n\
Software\t1.3\t1.3\t1.3\t1.3\t1.3\n\
Integration Time\t100\t100\t100\t100\t100\n\
Instrument\tOcean Optics USB2E1234 with 25 Degree FOV\tOcean Optics USB2E1234 with 25 Degree FOV\tOcean Optics USB2E1234 with 25 Degree FOV\tOcean Optics USB2E1234 with 25 Degree FOV\tOcean Optics USB2E1234 with 25 Degree FOV\n\
Date\t06-21-2005\t06-21-2005\t06-21-2005\t06-21-2005\t06-21-2005\n\
Start Time\t10:00:00\t10:10:00\t10:20:00\t10:30:00\t10:40:00\n\
End Time\t10:01:00\t10:11:00\t10:21:00\t10:31:00\t10:41:00\n\
Panel\tSpectralon\tSpectralon\tSpectralon\tSpectralon\tSpectralon\n\
File Name\tscan000.Cal.Upwelling\tscan001.Upwelling\tscan002.Upwelling\tscan003.Upwelling\tscan004.Upwelling\n\
Averaged Scans\t10\t10\t10\t10\t10\n\
726.049\t0.10\t0.11\t0.12\t0.13\t0.14\n\
850.5\t0.20\t0.21\t0.22\t0.23\t0.24\n\
DC\t12\t12\t12\t12\t12\n";

        fs::write(dir.join("Upwelling Data01.txt"), contents)
            .expect("Error writing fixture.");
    }

    fn write_log_fixture(dir: &Path) {
        let contents = "\
Acquisition Log 2005\n\
Project\tRep\tScan\tDate\tStart\tEnd\n\
CSP01\tcorn east\t1\t06-21-2005\t10:10:00\t10:11:00\n";

        fs::write(dir.join("datalog.txt"), contents).expect("Error writing log fixture.");
    }

    fn first_record(path: &Path) -> Vec<String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .expect("Error opening csv.");

        reader
            .records()
            .next()
            .expect("Empty csv file.")
            .expect("Error reading csv record.")
            .iter()
            .map(str::to_owned)
            .collect()
    }

    fn sorted_dir_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("Error listing dir.")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_process_directory_end_to_end() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let data_dir = tmp.path().join("data");
        let out_root = tmp.path().join("out");
        fs::create_dir_all(&data_dir).unwrap();
        write_upwelling_fixture(&data_dir);
        write_log_fixture(&data_dir);

        let processed =
            process_directory(&data_dir, &out_root).expect("Error processing directory.");
        assert!(processed);

        let date_dir = out_root.join("06-21-2005");
        assert_eq!(sorted_dir_names(&date_dir), ["CSP01", "CSP02", "cal_data"]);

        // Each dataset directory is internally consistent: the auxiliary
        // file leads with the same dataset id the metadata records.
        for (dir_name, aux_name) in &[
            ("cal_data", "Auxiliary_Cal.csv"),
            ("CSP01", "Auxiliary.csv"),
            ("CSP02", "Auxiliary.csv"),
        ] {
            let dataset_dir = date_dir.join(dir_name);
            let meta = Metadata::read_csv(&dataset_dir.join("Metadata.csv"))
                .expect("Error reading metadata.");
            let aux_head = first_record(&dataset_dir.join(aux_name));

            assert_eq!(aux_head[0], "Dataset ID");
            assert_eq!(&aux_head[1], meta.get("Dataset ID").unwrap());
        }

        let cal_meta = Metadata::read_csv(&date_dir.join("cal_data").join("Metadata.csv")).unwrap();
        assert_eq!(cal_meta.get("Project").unwrap(), "CSP-CAL");
        assert_eq!(
            cal_meta.get("Dataset ID").unwrap(),
            "CSP-CAL_06-21-2005_10:00:00"
        );
        // Both cal columns counted, the filename-marked one included.
        assert_eq!(cal_meta.get("Scans Count").unwrap(), "2");

        let csp01_meta = Metadata::read_csv(&date_dir.join("CSP01").join("Metadata.csv")).unwrap();
        assert_eq!(csp01_meta.get("Location").unwrap(), "CSP01");
        assert_eq!(csp01_meta.get("Illumination Source").unwrap(), "Sun");
        assert_eq!(csp01_meta.get("Scans Count").unwrap(), "2");
        assert_eq!(
            csp01_meta.get("Dataset ID").unwrap(),
            "CSP01_06-21-2005_10:10:00"
        );
        // The datalogger field was decoded into channel statistics.
        assert_eq!(csp01_meta.get("Min Battery Voltage").unwrap(), "12.3");

        let csp02_meta = Metadata::read_csv(&date_dir.join("CSP02").join("Metadata.csv")).unwrap();
        assert_eq!(csp02_meta.get("Project").unwrap(), "CSP02");
        assert_eq!(csp02_meta.get("Target").unwrap(), "Soybean");

        assert!(date_dir.join("CSP01").join("Upwelling_data.csv").is_file());
        assert!(date_dir
            .join("cal_data")
            .join("Upwelling_Cal_data.csv")
            .is_file());
        assert!(date_dir.join("CSP01").join("Scan_Log.csv").is_file());
    }

    #[test]
    fn test_directory_without_upwelling_is_skipped() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let data_dir = tmp.path().join("data");
        let out_root = tmp.path().join("out");
        fs::create_dir_all(&data_dir).unwrap();

        let processed = process_directory(&data_dir, &out_root).expect("Error processing.");
        assert!(!processed);
        assert!(!out_root.exists());
    }

    #[test]
    fn test_failed_directory_is_rolled_back() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let data_dir = tmp.path().join("data");
        let out_root = tmp.path().join("out");
        fs::create_dir_all(&data_dir).unwrap();
        fs::create_dir_all(&out_root).unwrap();
        write_upwelling_fixture(&data_dir);

        // Two candidate acquisition logs make the directory ambiguous, which
        // fails after the upwelling pass already wrote output.
        fs::write(data_dir.join("datalog.txt"), "x\n").unwrap();
        fs::write(data_dir.join("oldlog.txt"), "x\n").unwrap();

        match process_directory(&data_dir, &out_root) {
            Err(CdapDataErr::MultipleLogFiles(2)) => {}
            other => panic!("Expected MultipleLogFiles, got {:?}", other),
        }

        // Everything the failed run created was removed again, but the
        // pruning never climbs past the output root itself.
        assert!(!out_root.join("06-21-2005").exists());
        assert!(out_root.is_dir());
    }

    #[test]
    fn test_vegfraction_file_copied_to_every_group() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let data_dir = tmp.path().join("data");
        let out_root = tmp.path().join("out");
        fs::create_dir_all(&data_dir).unwrap();
        write_upwelling_fixture(&data_dir);
        fs::write(data_dir.join("VegFraction.txt"), "fraction data\n").unwrap();

        process_directory(&data_dir, &out_root).expect("Error processing directory.");

        let date_dir = out_root.join("06-21-2005");
        for dir_name in &["cal_data", "CSP01", "CSP02"] {
            assert!(date_dir.join(dir_name).join("VegFraction.txt").is_file());
        }
    }

    #[test]
    fn test_multiple_vegfraction_files_are_fatal() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let data_dir = tmp.path().join("data");
        let out_root = tmp.path().join("out");
        fs::create_dir_all(&data_dir).unwrap();
        write_upwelling_fixture(&data_dir);
        fs::write(data_dir.join("VegFraction.txt"), "x\n").unwrap();
        fs::write(data_dir.join("VegFraction old.txt"), "x\n").unwrap();

        match process_directory(&data_dir, &out_root) {
            Err(CdapDataErr::MultipleVegFractionFiles(2)) => {}
            other => panic!("Expected MultipleVegFractionFiles, got {:?}", other),
        }
        assert!(!out_root.join("06-21-2005").exists());
    }

    #[test]
    fn test_run_batch_records_outcomes() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let good_dir = tmp.path().join("good");
        let out_root = tmp.path().join("out");
        fs::create_dir_all(&good_dir).unwrap();
        write_upwelling_fixture(&good_dir);

        let missing_dir = tmp.path().join("missing");
        let master_list = tmp.path().join("master_list.txt");
        fs::write(
            &master_list,
            format!("{}\n{}\n", good_dir.display(), missing_dir.display()),
        )
        .unwrap();

        let summary = run_batch(&master_list, &out_root).expect("Error running batch.");
        assert_eq!(
            summary,
            BatchSummary {
                completed: 1,
                skipped: 0,
                failed: 1
            }
        );

        let completed = fs::read_to_string(tmp.path().join("completed.txt")).unwrap();
        assert!(completed.contains("good"));

        let errors = fs::read_to_string(tmp.path().join("error_list.txt")).unwrap();
        assert!(errors.contains("missing"));
        assert!(!errors.contains("good"));
    }
}
