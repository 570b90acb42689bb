//! Raw (uncalibrated) scan files. Split along the Upwelling partition and
//! written verbatim, no classification of their own.

use std::path::Path;

use crate::errors::CdapDataErr;

use super::{output, DirectoryPlan};

/// Which instrument family a raw file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFamily {
    /// `Raw Upwelling*` with the `Raw Outgoing*` fallback naming.
    Upwelling,
    /// `Raw Downwelling*` with the `Raw Incoming*` fallback naming.
    Downwelling,
}

impl RawFamily {
    fn prefixes(self) -> &'static [&'static str] {
        match self {
            RawFamily::Upwelling => &["Raw Upwelling", "Raw Outgoing"],
            RawFamily::Downwelling => &["Raw Downwelling", "Raw Incoming"],
        }
    }

    fn label(self) -> &'static str {
        match self {
            RawFamily::Upwelling => "Upwelling",
            RawFamily::Downwelling => "Downwelling",
        }
    }
}

/// Split one family's raw files into the calibration and location dataset
/// directories. Absent raw files are the common case and not worth a log
/// line.
pub fn process_raw(
    data_dir: &Path,
    plan: &DirectoryPlan,
    family: RawFamily,
) -> Result<(), CdapDataErr> {
    let table = match super::load_family(data_dir, family.prefixes())? {
        Some(table) => table,
        None => return Ok(()),
    };

    if let Some(cal) = &plan.cal {
        let cal_table = table.select_columns(&cal.idxs);
        if cal_table.num_scans() > 0 {
            output::write_scan_file(
                &cal_table,
                &plan.keys,
                &cal.meta.dataset_id()?,
                &cal.out_dir.join(format!("Raw_{}_Cal_data.csv", family.label())),
            )?;
        }
    }

    for group in &plan.locations {
        let loc_table = super::non_cal_subtable(&table, &group.idxs, &plan.keys)?;
        if loc_table.num_scans() > 0 {
            output::write_scan_file(
                &loc_table,
                &plan.keys,
                &group.meta.dataset_id()?,
                &group.out_dir.join(format!("Raw_{}_data.csv", family.label())),
            )?;
        }
    }

    Ok(())
}
