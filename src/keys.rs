//! Canonical field vocabulary and header key resolution.
//!
//! Header spellings drifted across CDAP releases ("Rep", "Replication",
//! "Cumulative Scan", "Count", ...). Each canonical [`Field`] carries the
//! synonym set observed in the archive, and [`KeyDict`] records which literal
//! header key a given acquisition directory uses for each field.

use std::collections::HashMap;

use strum_macros::EnumIter;

use crate::{datalogger::Channel, errors::CdapDataErr};

/// The canonical data fields of a CDAP file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum Field {
    Replication,
    X,
    Y,
    ScanNumber,
    SolarAzimuth,
    SolarElevation,
    SolarZenith,
    Altitude,
    Longitude,
    Latitude,
    Comments,
    Gps,
    DataLogger,
    AcquisitionSoftware,
    IntegrationTime,
    Instrument,
    Date,
    StartTime,
    StopTime,
    CalibrationPanel,
    Project,
    FileName,
    AveragedScans,
    CalibrationMode,
    AverageAdj,
}

impl Field {
    /// The canonical display name used in output files and the index.
    pub fn as_static_str(self) -> &'static str {
        use Field::*;

        match self {
            Replication => "Replication",
            X => "X",
            Y => "Y",
            ScanNumber => "Scan Number",
            SolarAzimuth => "Solar Azimuth",
            SolarElevation => "Solar Elevation",
            SolarZenith => "Solar Zenith",
            Altitude => "Altitude",
            Longitude => "Longitude",
            Latitude => "Latitude",
            Comments => "Comments",
            Gps => "GPS",
            DataLogger => "Data Logger",
            AcquisitionSoftware => "Acquisition Software",
            IntegrationTime => "Integration Time",
            Instrument => "Instrument",
            Date => "Date",
            StartTime => "Start Time",
            StopTime => "Stop Time",
            CalibrationPanel => "Calibration Panel",
            Project => "Project",
            FileName => "File Name",
            AveragedScans => "Averaged Scans",
            CalibrationMode => "Calibration Mode",
            AverageAdj => "Average Adj",
        }
    }

    /// Lowercase header spellings this field is known by.
    pub fn synonyms(self) -> &'static [&'static str] {
        use Field::*;

        match self {
            Replication => &["rep", "replication"],
            X => &["x", "plot"],
            Y => &["y", "plot scan"],
            ScanNumber => &["cumulative scan", "count"],
            SolarAzimuth => &["solar azimuth", "solar aiz", "solar azimuthal"],
            SolarElevation => &["solar elevation", "solar elev"],
            SolarZenith => &["solar zenith"],
            Altitude => &["altitude"],
            Longitude => &["longitude"],
            Latitude => &["latitude"],
            Comments => &["comments", "comment"],
            Gps => &["gps"],
            DataLogger => &["data logger", "dl"],
            AcquisitionSoftware => &["software", "software version", "version"],
            IntegrationTime => &["integration time", "int time", "integration time (ms)"],
            Instrument => &["instrument", "instruments"],
            Date => &["date", "acquire date"],
            StartTime => &["start time", "stime"],
            StopTime => &["end time", "etime"],
            CalibrationPanel => &["processing panel", "panel"],
            Project => &["project"],
            FileName => &["file name"],
            AveragedScans => &["averaged scans", "used scans", "instrument scans"],
            CalibrationMode => &["calibration mode"],
            AverageAdj => &["average adj"],
        }
    }

    /// Fields whose absence is a normal branch rather than an error.
    ///
    /// Calibration Mode only appears in the latest CDAP revision, Average Adj
    /// is rare, and some early files never numbered their scans.
    pub fn is_optional(self) -> bool {
        match self {
            Field::CalibrationMode | Field::AverageAdj | Field::ScanNumber => true,
            _ => false,
        }
    }
}

/// Header keys that carry no data we archive and are never "other" fields.
const RESERVED_KEYS: &[&str] = &[
    "reserved",
    "additional data",
    "lamp",
    "shutter status",
    "battery voltage",
    "scan begin & end",
    "solar angles",
    "unispec dc",
];

/// Mapping from canonical fields to the literal header keys of one directory.
///
/// Built once from the Upwelling file and threaded through the Downwelling
/// and Reflectance passes, which share the header shape.
#[derive(Debug, Clone)]
pub struct KeyDict {
    keys: HashMap<Field, String>,
    other_keys: Vec<String>,
    channels: Vec<Channel>,
}

impl KeyDict {
    /// Resolve a file's header keys against the canonical vocabulary.
    ///
    /// Every required field must match exactly one header key. Unmatched
    /// header keys that are not reserved are retained verbatim as "other"
    /// keys and forwarded opaquely to the auxiliary output.
    pub fn resolve(header_keys: &[String]) -> Result<Self, CdapDataErr> {
        use strum::IntoEnumIterator;

        let mut keys = HashMap::new();

        for field in Field::iter() {
            let matches: Vec<&String> = header_keys
                .iter()
                .filter(|key| {
                    let lower = key.to_lowercase();
                    field.synonyms().contains(&lower.as_str())
                })
                .collect();

            match matches.len() {
                0 => {
                    if !field.is_optional() {
                        return Err(CdapDataErr::MissingField(field.as_static_str()));
                    }
                }
                1 => {
                    keys.insert(field, matches[0].clone());
                }
                _ => return Err(CdapDataErr::AmbiguousField(field.as_static_str())),
            }
        }

        let other_keys = header_keys
            .iter()
            .filter(|key| {
                let lower = key.to_lowercase();
                !keys.values().any(|k| k == *key) && !RESERVED_KEYS.contains(&lower.as_str())
            })
            .cloned()
            .collect();

        Ok(KeyDict {
            keys,
            other_keys,
            channels: vec![],
        })
    }

    /// The literal header key for a field, if the directory has it.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.keys.get(&field).map(String::as_str)
    }

    /// The literal header key for a required field.
    pub fn key(&self, field: Field) -> Result<&str, CdapDataErr> {
        self.get(field)
            .ok_or_else(|| CdapDataErr::MissingField(field.as_static_str()))
    }

    /// Header keys not covered by the canonical vocabulary.
    pub fn other_keys(&self) -> &[String] {
        &self.other_keys
    }

    /// Datalogger channels decoded for this directory.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Register a decoded datalogger channel so writers can address it.
    pub fn add_channel(&mut self, channel: Channel) {
        if !self.channels.contains(&channel) {
            self.channels.push(channel);
        }
    }
}
