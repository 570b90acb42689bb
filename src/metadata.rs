//! Per-dataset metadata synthesis.
//!
//! One [`Metadata`] record is built for each calibration or location group of
//! an acquisition directory, summarizing the group's scans (angle and
//! coordinate ranges, instrument identity, targets) under a stable dataset
//! identifier. Entries keep their insertion order so the serialized file is
//! stable run to run.

use std::{collections::HashMap, fs::File, path::Path};

use crate::{
    datalogger::NODATA,
    errors::CdapDataErr,
    keys::{Field, KeyDict},
    scans::reps_to_targets,
    table::RawTable,
};

/// A metadata value, scalar or multi-valued.
///
/// Multi-valued entries (Target, Calibration Panel) are flattened into a
/// single semicolon-joined cell on write.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    /// A single value.
    Scalar(String),
    /// Several values for one name.
    List(Vec<String>),
}

impl MetaValue {
    /// The serialized form of this value.
    pub fn to_cell(&self) -> String {
        match self {
            MetaValue::Scalar(val) => val.clone(),
            MetaValue::List(vals) => vals.join(";"),
        }
    }
}

/// Ordered name to value metadata for one dataset.
#[derive(Debug, Clone)]
pub struct Metadata {
    entries: Vec<(String, MetaValue)>,
    index: HashMap<String, usize>,
}

impl Metadata {
    /// An empty record.
    pub fn new() -> Self {
        Metadata {
            entries: vec![],
            index: HashMap::new(),
        }
    }

    /// Insert or replace an entry, preserving first-insertion order.
    pub fn set(&mut self, name: &str, value: MetaValue) {
        match self.index.get(name) {
            Some(&idx) => self.entries[idx].1 = value,
            None => {
                self.index.insert(name.to_owned(), self.entries.len());
                self.entries.push((name.to_owned(), value));
            }
        }
    }

    /// Insert or replace a scalar entry.
    pub fn set_scalar(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, MetaValue::Scalar(value.into()));
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&MetaValue> {
        self.index.get(name).map(|&idx| &self.entries[idx].1)
    }

    /// Look up a scalar entry, serialized form for lists.
    pub fn value(&self, name: &str) -> Option<String> {
        self.get(name).map(MetaValue::to_cell)
    }

    /// The dataset identifier.
    pub fn dataset_id(&self) -> Result<String, CdapDataErr> {
        self.value("Dataset ID")
            .ok_or(CdapDataErr::MissingField("Dataset ID"))
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[(String, MetaValue)] {
        &self.entries
    }

    /// Build the metadata record for one scan group.
    ///
    /// Calibration groups get the fixed project name `CSP-CAL` and take their
    /// target from the calibration panel instead of the replication labels.
    /// Wavelength statistics and location constants are injected later by the
    /// driver, which owns that context.
    pub fn synthesize(
        table: &RawTable,
        keys: &KeyDict,
        legacy_path: &str,
        cal: bool,
    ) -> Result<Self, CdapDataErr> {
        let mut meta = Metadata::new();

        let project = if cal {
            "CSP-CAL".to_owned()
        } else {
            first_value(table, keys, Field::Project)?
        };
        meta.set_scalar("Project", project.clone());

        let date = first_value(table, keys, Field::Date)?;
        meta.set_scalar("Date", date.clone());

        // Malformed timestamps are removed before taking the extremes, so a
        // corrupt cell cannot become the dataset identifier.
        let start_times = valid_times(row_values(table, keys, Field::StartTime)?);
        let min_start = start_times
            .iter()
            .min()
            .ok_or(CdapDataErr::NotEnoughData)?;
        meta.set_scalar(
            "Dataset ID",
            format!("{}_{}_{}", project, date, min_start),
        );
        meta.set_scalar("Start Time", min_start.as_str());

        let stop_times = valid_times(row_values(table, keys, Field::StopTime)?);
        let max_stop = stop_times.iter().max().ok_or(CdapDataErr::NotEnoughData)?;
        meta.set_scalar("Stop Time", max_stop.as_str());

        let instrument_str = first_value(table, keys, Field::Instrument)?;
        let instrument = instrument_info(&instrument_str)?;
        meta.set_scalar("Upwelling Instrument Name", instrument.name);
        meta.set_scalar("Upwelling Instrument Serial Number", instrument.serial);
        meta.set_scalar("Upwelling Instrument FOV", instrument.fov);

        let panels = unique(row_values(table, keys, Field::CalibrationPanel)?);
        meta.set("Calibration Panel", MetaValue::List(panels.clone()));

        meta.set_scalar(
            "Software Version",
            first_value(table, keys, Field::AcquisitionSoftware)?,
        );

        let target = if cal {
            panels
        } else {
            let reps = row_values(table, keys, Field::Replication)?;
            reps_to_targets(reps.iter().map(String::as_str))
        };
        meta.set("Target", MetaValue::List(target));

        meta.set_scalar("Legacy Path", strip_mount_prefix(legacy_path));

        if let Some(key) = keys.get(Field::CalibrationMode) {
            if let Some(values) = table.row_values(key) {
                if let Some(mode) = values.first() {
                    meta.set_scalar("Calibration Mode", mode.as_str());
                }
            }
        }

        for (field, label) in &[
            (Field::SolarZenith, "Solar Zenith"),
            (Field::SolarElevation, "Solar Elevation"),
            (Field::SolarAzimuth, "Solar Azimuth"),
        ] {
            let values = row_values(table, keys, *field)?;
            if let Some((min, max)) = min_max(&values) {
                meta.set_scalar(format!("Min {}", label).as_str(), min);
                meta.set_scalar(format!("Max {}", label).as_str(), max);
            }
        }

        // Coordinate summaries only when the GPS was actually reporting.
        let lats = row_values(table, keys, Field::Latitude)?;
        if !lats.is_empty() && !lats.iter().all(|val| val == NODATA || val.is_empty()) {
            let lons = row_values(table, keys, Field::Longitude)?;

            if let Some((min, max)) = min_max(&lats) {
                meta.set_scalar("Min Latitude", min);
                meta.set_scalar("Max Latitude", max);
            }
            if let Some(avg) = average(&lats) {
                meta.set_scalar("Average Latitude", format!("{}", avg));
            }
            if let Some((min, max)) = min_max(&lons) {
                meta.set_scalar("Min Longitude", min);
                meta.set_scalar("Max Longitude", max);
            }
            if let Some(avg) = average(&lons) {
                meta.set_scalar("Average Longitude", format!("{}", avg));
            }
        }

        for channel in keys.channels() {
            let name = channel.as_static_str();
            if let Some(values) = table.row_values(name) {
                if values.iter().all(|val| val == NODATA) {
                    continue;
                }
                if let Some((min, max)) = min_max(values) {
                    meta.set_scalar(format!("Min {}", name).as_str(), min);
                    meta.set_scalar(format!("Max {}", name).as_str(), max);
                }
            }
        }

        let file_names = row_values(table, keys, Field::FileName)?;
        meta.set_scalar("Scans Count", format!("{}", file_names.len()));

        Ok(meta)
    }

    /// Write the record as ordered name,value rows.
    pub fn write_csv(&self, path: &Path) -> Result<(), CdapDataErr> {
        let mut writer = csv::Writer::from_path(path)?;

        for (name, value) in &self.entries {
            writer.write_record(&[name.as_str(), value.to_cell().as_str()])?;
        }
        writer.flush().map_err(CdapDataErr::from)?;

        Ok(())
    }

    /// Read a serialized record back as a name to value map.
    pub fn read_csv(path: &Path) -> Result<HashMap<String, String>, CdapDataErr> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut map = HashMap::new();
        for record in reader.records() {
            let record = record?;
            if let (Some(name), Some(value)) = (record.get(0), record.get(1)) {
                map.insert(name.to_owned(), value.to_owned());
            }
        }

        Ok(map)
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata::new()
    }
}

/// Instrument identity parsed from a CDAP instrument description string.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentInfo {
    /// Standardized vendor and model name.
    pub name: String,
    /// Serial number, empty when the vendor never recorded one.
    pub serial: String,
    /// Field of view in degrees, as recorded.
    pub fov: String,
}

/// Parse an instrument description string.
///
/// Two vendor families appear in the archive: Ocean Optics USB 2000 series
/// spectrometers and Spectron units. Anything else is fatal for the
/// directory, so an unanticipated instrument is noticed rather than archived
/// under a wrong name.
pub fn instrument_info(instrument_str: &str) -> Result<InstrumentInfo, CdapDataErr> {
    if instrument_str.starts_with("OO") || instrument_str.starts_with("Ocean Optics") {
        if !instrument_str.contains("USB2") {
            return Err(CdapDataErr::UnknownInstrument(instrument_str.to_owned()));
        }

        let usb_token = instrument_str
            .split(' ')
            .find(|token| token.starts_with("USB"));

        let (mut name, serial) = if instrument_str.contains('+') {
            let serial = match usb_token {
                Some(token) => token.get(5..).unwrap_or("").to_owned(),
                None => second_token(instrument_str),
            };
            ("Ocean Optics USB 2000+".to_owned(), serial)
        } else {
            let serial = match usb_token {
                Some(token) => token.get(4..).unwrap_or("").to_owned(),
                None => second_token(instrument_str),
            };
            ("Ocean Optics USB 2000".to_owned(), serial)
        };

        if instrument_str.contains("High Sensitivity") {
            name.push_str(" High Sensitivity");
        }

        Ok(InstrumentInfo {
            name,
            serial,
            fov: fov_degrees(instrument_str),
        })
    } else if let Some(loc) = instrument_str.find("Spectron") {
        let name = instrument_str
            .get(..loc + "Spectron".len())
            .unwrap_or(instrument_str)
            .to_owned();

        // Spectron descriptions never carried serial numbers.
        Ok(InstrumentInfo {
            name,
            serial: String::new(),
            fov: fov_degrees(instrument_str),
        })
    } else {
        Err(CdapDataErr::UnknownInstrument(instrument_str.to_owned()))
    }
}

/// Extract the field of view preceding a "Degree" marker, e.g.
/// `"... 25 Degree FOV"` yields `"25"`. Empty when no marker exists.
fn fov_degrees(instrument_str: &str) -> String {
    match instrument_str.find("Degree") {
        Some(loc) if loc >= 4 => instrument_str
            .get(loc - 4..loc - 1)
            .unwrap_or("")
            .trim()
            .to_owned(),
        _ => String::new(),
    }
}

fn second_token(s: &str) -> String {
    s.split(' ').nth(1).unwrap_or("").to_owned()
}

/// Strict `HH:MM:SS` shape check.
pub fn is_valid_time(time: &str) -> bool {
    let bytes = time.as_bytes();

    bytes.len() == 8
        && bytes[2] == b':'
        && bytes[5] == b':'
        && [0usize, 1, 3, 4, 6, 7]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

fn valid_times(times: Vec<String>) -> Vec<String> {
    times.into_iter().filter(|t| is_valid_time(t)).collect()
}

fn first_value(table: &RawTable, keys: &KeyDict, field: Field) -> Result<String, CdapDataErr> {
    let values = row_values(table, keys, field)?;
    values
        .into_iter()
        .next()
        .ok_or(CdapDataErr::NotEnoughData)
}

fn row_values(table: &RawTable, keys: &KeyDict, field: Field) -> Result<Vec<String>, CdapDataErr> {
    let key = keys.key(field)?;
    Ok(table.row_values(key).unwrap_or(&[]).to_vec())
}

fn unique(values: Vec<String>) -> Vec<String> {
    let mut uniques: Vec<String> = vec![];
    for value in values {
        if !uniques.contains(&value) {
            uniques.push(value);
        }
    }
    uniques
}

fn parse_filtered(values: &[String]) -> Vec<(f64, &str)> {
    values
        .iter()
        .filter_map(|val| {
            val.parse::<f64>()
                .ok()
                .filter(|&f| f != crate::datalogger::NODATA_F64)
                .map(|f| (f, val.as_str()))
        })
        .collect()
}

/// Min and max of the parseable, non-sentinel values, returned as their
/// original strings so precision is never reformatted.
fn min_max(values: &[String]) -> Option<(&str, &str)> {
    let parsed = parse_filtered(values);

    let min = parsed
        .iter()
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))?;
    let max = parsed
        .iter()
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))?;

    Some((min.1, max.1))
}

fn average(values: &[String]) -> Option<f64> {
    let parsed = parse_filtered(values);
    if parsed.is_empty() {
        return None;
    }

    Some(parsed.iter().map(|(f, _)| f).sum::<f64>() / parsed.len() as f64)
}

/// Drop everything through a shared-folder mount prefix (`.../sf_`), leaving
/// the archive-relative legacy path.
fn strip_mount_prefix(path: &str) -> &str {
    match path.find("sf_") {
        Some(loc) => &path[loc + 3..],
        None => path,
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    use tempdir::TempDir;

    fn test_table() -> (RawTable, KeyDict) {
        let contents = "Project\tCSP01\tCSP01\n\
                        Rep\tcorn east\tcorn west\n\
                        X\t1\t2\n\
                        Y\t1\t1\n\
                        Count\t1\t2\n\
                        Solar Azimuth\t120.5\t121.0\n\
                        Solar Elev\t45.1\t45.0\n\
                        Solar Zenith\t44.9\t45.0\n\
                        Altitude\t350\t351\n\
                        Longitude\t-96.478\t-96.477\n\
                        Latitude\t41.165\t41.166\n\
                        Comments\t\t\n\
                        GPS\tA\tA\n\
                        Data Logger\tbv12.4,t125.1,t224.0\tbv12.3,t125.5,t224.2\n\
                        Software\t1.3\t1.3\n\
                        Integration Time\t100\t100\n\
                        Instrument\tOcean Optics USB2E1234 with 25 Degree FOV\tsame\n\
                        Date\t06-21-2005\t06-21-2005\n\
                        Start Time\t10:15:00\t10:20:00\n\
                        End Time\t10:16:00\t10:21:00\n\
                        Panel\tSpectralon\tSpectralon\n\
                        File Name\tscan001.Upwelling\tscan002.Upwelling\n\
                        Averaged Scans\t10\t10\n\
                        726.049\t0.1\t0.2\n";

        let tmp = TempDir::new("cdap-data-test").unwrap();
        let path = tmp.path().join("Upwelling Data01.txt");
        std::fs::write(&path, contents).unwrap();
        let table = RawTable::load(&path).unwrap();
        let keys = KeyDict::resolve(&table.header_keys()).unwrap();

        (table, keys)
    }

    #[test]
    fn test_synthesize_dataset_id() {
        let (table, keys) = test_table();
        let meta = Metadata::synthesize(&table, &keys, "/media/sf_Field-Data/2005", false)
            .expect("Error synthesizing metadata.");

        assert_eq!(
            meta.dataset_id().unwrap(),
            "CSP01_06-21-2005_10:15:00"
        );
        assert_eq!(meta.value("Start Time").unwrap(), "10:15:00");
        assert_eq!(meta.value("Stop Time").unwrap(), "10:21:00");
        assert_eq!(meta.value("Legacy Path").unwrap(), "Field-Data/2005");
        assert_eq!(meta.value("Target").unwrap(), "Corn");
        assert_eq!(meta.value("Scans Count").unwrap(), "2");
    }

    #[test]
    fn test_synthesize_ranges() {
        let (table, keys) = test_table();
        let meta = Metadata::synthesize(&table, &keys, "dir", false).unwrap();

        assert_eq!(meta.value("Min Solar Zenith").unwrap(), "44.9");
        assert_eq!(meta.value("Max Solar Zenith").unwrap(), "45.0");
        assert_eq!(meta.value("Min Latitude").unwrap(), "41.165");
        assert_eq!(meta.value("Max Longitude").unwrap(), "-96.477");
    }

    #[test]
    fn test_synthesize_cal_group() {
        let (table, keys) = test_table();
        let meta = Metadata::synthesize(&table, &keys, "dir", true).unwrap();

        assert_eq!(meta.value("Project").unwrap(), "CSP-CAL");
        // Cal targets come from the panel, not the replication labels.
        assert_eq!(meta.value("Target").unwrap(), "Spectralon");
    }

    #[test]
    fn test_malformed_start_time_filtered() {
        let (table, keys) = test_table();
        let mut table = table;
        table
            .set_row_values(
                "Start Time",
                vec!["9:15".to_owned(), "10:20:00".to_owned()],
            )
            .unwrap();

        let meta = Metadata::synthesize(&table, &keys, "dir", false).unwrap();
        // The malformed stamp cannot win the minimum.
        assert_eq!(meta.value("Start Time").unwrap(), "10:20:00");
    }

    #[test]
    fn test_instrument_info_ocean_optics() {
        let info =
            instrument_info("Ocean Optics USB2E1234 with 25 Degree FOV").unwrap();
        assert_eq!(info.name, "Ocean Optics USB 2000");
        assert_eq!(info.serial, "E1234");
        assert_eq!(info.fov, "25");

        let info =
            instrument_info("OO USB2+F5678 High Sensitivity 10 Degree FOV").unwrap();
        assert_eq!(info.name, "Ocean Optics USB 2000+ High Sensitivity");
        assert_eq!(info.serial, "F5678");
    }

    #[test]
    fn test_instrument_info_spectron() {
        let info = instrument_info("SE590 Spectron 15 Degree FOV").unwrap();
        assert_eq!(info.name, "SE590 Spectron");
        assert_eq!(info.serial, "");
        assert_eq!(info.fov, "15");
    }

    #[test]
    fn test_instrument_info_unknown_is_fatal() {
        match instrument_info("ASD FieldSpec") {
            Err(CdapDataErr::UnknownInstrument(_)) => {}
            other => panic!("Expected UnknownInstrument, got {:?}", other),
        }
    }

    #[test]
    fn test_is_valid_time() {
        assert!(is_valid_time("10:15:00"));
        assert!(!is_valid_time("9:15:00"));
        assert!(!is_valid_time("10:15"));
        assert!(!is_valid_time("10:15:0x"));
        assert!(!is_valid_time(""));
    }

    #[test]
    fn test_csv_round_trip() {
        let (table, keys) = test_table();
        let meta = Metadata::synthesize(&table, &keys, "dir", false).unwrap();

        let tmp = TempDir::new("cdap-data-test").unwrap();
        let path = tmp.path().join("Metadata.csv");
        meta.write_csv(&path).expect("Error writing metadata.");

        let read_back = Metadata::read_csv(&path).expect("Error reading metadata.");
        assert_eq!(
            read_back.get("Dataset ID").unwrap(),
            "CSP01_06-21-2005_10:15:00"
        );
        assert_eq!(read_back.get("Project").unwrap(), "CSP01");
    }
}
