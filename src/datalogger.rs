//! Unpacking packed datalogger entries.
//!
//! Each scan column carries a single "Data Logger" cell bundling several
//! auxiliary sensor readings as a comma-joined string, each sub-value behind
//! a fixed 2-character tag. The number of sub-values identifies the logger
//! hardware revision, which in turn names the channels.

use log::warn;
use strum_macros::EnumIter;

use crate::errors::CdapDataErr;

/// The nodata sentinel written for invalid or out-of-range sensor values.
pub const NODATA: &str = "-9999";

/// The nodata sentinel as a float, for filtering.
pub const NODATA_F64: f64 = -9999.0;

/// Maximum plausible reading for the temperature channels, degrees C.
const MAX_TEMPERATURE: f64 = 250.0;

/// Auxiliary sensor channels a datalogger entry may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Channel {
    /// Logger battery voltage.
    BatteryVoltage,
    /// First thermistor, usually the canopy temperature.
    Temperature1,
    /// Second thermistor, usually the filter wheel temperature.
    Temperature2,
    /// Pyranometer, total incoming shortwave.
    Pyranometer,
    /// Quantum sensor, photosynthetically active radiation.
    QuantumSensor,
}

impl Channel {
    /// The field name used for this channel in output files and metadata.
    pub fn as_static_str(self) -> &'static str {
        use Channel::*;

        match self {
            BatteryVoltage => "Battery Voltage",
            Temperature1 => "Temperature 1",
            Temperature2 => "Temperature 2",
            Pyranometer => "Pyranometer",
            QuantumSensor => "Quantum Sensor",
        }
    }

    fn is_temperature(self) -> bool {
        match self {
            Channel::Temperature1 | Channel::Temperature2 => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_static_str())
    }
}

/// Split one packed entry into its sub-values, stripping the 2-character tags.
pub fn split_entry(entry: &str) -> Vec<String> {
    entry
        .split(',')
        .map(|sub| sub.get(2..).unwrap_or("").to_owned())
        .collect()
}

fn parse(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// True when every value in the column is empty or converts to a negative
/// float. Such columns are unwired channels reporting their error value.
fn all_negative(column: &[String]) -> bool {
    column
        .iter()
        .all(|val| val.is_empty() || parse(val).map(|f| f < 0.0).unwrap_or(false))
}

fn mean(column: &[String]) -> f64 {
    let floats: Vec<f64> = column.iter().filter_map(|val| parse(val)).collect();
    if floats.is_empty() {
        0.0
    } else {
        floats.iter().sum::<f64>() / floats.len() as f64
    }
}

/// Identify the channel layout from the sub-field count.
///
/// `None` slots are present in the packed string but carry no usable channel.
/// The 5-field case is ambiguous: when both trailing channels carry real
/// data they are always taken as pyranometer then quantum sensor. On the
/// known hardware quantum-sensor readings exceed pyranometer readings, so
/// the reversed ordering of means is logged as a possible unknown logger
/// type, but the fixed assignment is kept either way.
fn channel_layout(
    columns: &[Vec<String>],
    dir_label: &str,
) -> Result<Vec<Option<Channel>>, CdapDataErr> {
    use Channel::*;

    match columns.len() {
        3 => Ok(vec![
            Some(BatteryVoltage),
            Some(Temperature1),
            Some(Temperature2),
        ]),
        4 => Ok(vec![
            Some(BatteryVoltage),
            Some(Temperature1),
            Some(Temperature2),
            Some(Pyranometer),
        ]),
        5 => {
            if all_negative(&columns[3]) && all_negative(&columns[4]) {
                Ok(vec![
                    Some(BatteryVoltage),
                    Some(Temperature1),
                    None,
                    None,
                    Some(Pyranometer),
                ])
            } else {
                if mean(&columns[3]) > mean(&columns[4]) {
                    warn!(
                        "pyranometer values higher than quantum sensor in {}, \
                         possibly an unknown datalogger type, proceeding anyway",
                        dir_label
                    );
                }
                Ok(vec![
                    Some(BatteryVoltage),
                    Some(Temperature1),
                    Some(Temperature2),
                    Some(Pyranometer),
                    Some(QuantumSensor),
                ])
            }
        }
        6 if all_negative(&columns[5]) => Ok(vec![
            Some(BatteryVoltage),
            Some(Temperature1),
            Some(Temperature2),
            Some(Pyranometer),
            Some(QuantumSensor),
            None,
        ]),
        num => Err(CdapDataErr::UnknownDataloggerLayout(num)),
    }
}

/// Decode a column of packed datalogger entries into per-channel columns.
///
/// The sub-field count is detected from the first non-empty entry; empty
/// entries expand to that many sentinels so row alignment across the table
/// is preserved. Channels that carry no usable value anywhere are dropped
/// rather than kept as all-nodata. An unrecognized sub-field count is fatal,
/// the format space is closed.
pub fn decode(
    entries: &[String],
    dir_label: &str,
) -> Result<Vec<(Channel, Vec<String>)>, CdapDataErr> {
    let num_fields = match entries.iter().find(|entry| !entry.is_empty()) {
        Some(entry) => split_entry(entry).len(),
        None => return Ok(vec![]),
    };

    // Transpose entries into per-channel columns, padding missing entries.
    let mut columns: Vec<Vec<String>> = vec![Vec::with_capacity(entries.len()); num_fields];
    for entry in entries {
        let mut values = if entry.is_empty() {
            vec![NODATA.to_owned(); num_fields]
        } else {
            split_entry(entry)
        };
        values.resize(num_fields, NODATA.to_owned());

        for (column, value) in columns.iter_mut().zip(values) {
            column.push(value);
        }
    }

    let layout = channel_layout(&columns, dir_label)?;

    let mut decoded = vec![];
    for (channel, column) in layout.into_iter().zip(columns) {
        let channel = match channel {
            Some(channel) => channel,
            None => continue,
        };

        if all_negative(&column) {
            // An unwired channel, drop it entirely.
            continue;
        }

        let values = column
            .into_iter()
            .map(|val| match parse(&val) {
                Some(f) if f < 0.0 => NODATA.to_owned(),
                Some(f) if channel.is_temperature() && f > MAX_TEMPERATURE => NODATA.to_owned(),
                Some(_) => val,
                None => {
                    if !val.is_empty() {
                        warn!(
                            "could not convert datalogger value '{}' to float in {}",
                            val, dir_label
                        );
                    }
                    NODATA.to_owned()
                }
            })
            .collect();

        decoded.push((channel, values));
    }

    Ok(decoded)
}
