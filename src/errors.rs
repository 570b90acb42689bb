//! Module for errors.
use std::{error::Error, fmt::Display, path::PathBuf};

/// Error from the archive and reorganization interfaces.
#[derive(Debug)]
pub enum CdapDataErr {
    // Inherited errors from std
    /// Error forwarded from std
    IO(::std::io::Error),

    // Other forwarded errors
    /// Database error
    Database(::rusqlite::Error),
    /// Error forwarded from the csv crate
    Csv(::csv::Error),
    /// Error forwarded from the strum crate
    StrumError(strum::ParseError),
    /// General error with any cause information erased and replaced by a string
    GeneralError(String),

    // My own errors from this crate
    /// A required header field had no match in the file.
    MissingField(&'static str),
    /// A header field matched more than one key in the file.
    AmbiguousField(&'static str),
    /// Concatenated data files did not share the same field layout.
    TableMismatch(String),
    /// The file is in the CDAP 2 format, which is not supported.
    Cdap2NotSupported,
    /// The datalogger entries had an unrecognized number of sub-fields.
    UnknownDataloggerLayout(usize),
    /// The instrument description string was not recognized.
    UnknownInstrument(String),
    /// More than one acquisition log file was found in a data directory.
    MultipleLogFiles(usize),
    /// More than one vegetation fraction file was found in a data directory.
    MultipleVegFractionFiles(usize),
    /// An existing output directory had an unreadable metadata file.
    InvalidMetadata(PathBuf),
    /// Dataset not found in the index.
    NotInIndex,
    /// The database structure is wrong.
    InvalidSchema,
    /// Not enough data to complete the task.
    NotEnoughData,
    /// There was an internal logic error.
    LogicError(&'static str),
}

impl Display for CdapDataErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::CdapDataErr::*;

        match self {
            IO(err) => write!(f, "std lib io error: {}", err),

            Database(err) => write!(f, "database error: {}", err),
            Csv(err) => write!(f, "error forwarded from csv crate: {}", err),
            StrumError(err) => write!(f, "error forwarded from strum crate: {}", err),
            GeneralError(msg) => write!(f, "general error forwarded: {}", msg),

            MissingField(name) => write!(f, "no header key found for field: {}", name),
            AmbiguousField(name) => {
                write!(f, "more than one header key matches field: {}", name)
            }
            TableMismatch(msg) => write!(f, "data files cannot be joined: {}", msg),
            Cdap2NotSupported => write!(f, "CDAP 2 formatted files are not supported"),
            UnknownDataloggerLayout(num) => {
                write!(f, "unrecognized datalogger layout with {} sub-fields", num)
            }
            UnknownInstrument(desc) => write!(f, "unrecognized instrument: {}", desc),
            MultipleLogFiles(num) => {
                write!(f, "found {} acquisition log files, expected one", num)
            }
            MultipleVegFractionFiles(num) => {
                write!(f, "found {} vegetation fraction files, expected one", num)
            }
            InvalidMetadata(path) => {
                write!(f, "unreadable metadata file: {}", path.display())
            }
            NotInIndex => write!(f, "no match in the index"),
            InvalidSchema => write!(f, "invalid index format"),
            NotEnoughData => write!(f, "not enough data to complete task"),
            LogicError(msg) => write!(f, "internal logic error: {}", msg),
        }
    }
}

impl Error for CdapDataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use crate::errors::CdapDataErr::*;

        match self {
            IO(err) => Some(err),
            Database(err) => Some(err),
            Csv(err) => Some(err),
            StrumError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<::std::io::Error> for CdapDataErr {
    fn from(err: ::std::io::Error) -> CdapDataErr {
        CdapDataErr::IO(err)
    }
}

impl From<::rusqlite::Error> for CdapDataErr {
    fn from(err: ::rusqlite::Error) -> CdapDataErr {
        CdapDataErr::Database(err)
    }
}

impl From<::csv::Error> for CdapDataErr {
    fn from(err: ::csv::Error) -> CdapDataErr {
        CdapDataErr::Csv(err)
    }
}

impl From<strum::ParseError> for CdapDataErr {
    fn from(err: strum::ParseError) -> CdapDataErr {
        CdapDataErr::StrumError(err)
    }
}

impl From<Box<dyn Error>> for CdapDataErr {
    fn from(err: Box<dyn Error>) -> CdapDataErr {
        CdapDataErr::GeneralError(err.to_string())
    }
}
