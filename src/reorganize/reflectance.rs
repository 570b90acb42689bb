//! The Reflectance pass. Scan files only, the metadata was finalized by the
//! Downwelling pass.

use std::path::Path;

use log::info;

use crate::{errors::CdapDataErr, keys::Field};

use super::{output, DirectoryPlan};

/// Process the reflectance files of one acquisition directory.
pub fn process_reflectance(data_dir: &Path, plan: &DirectoryPlan) -> Result<(), CdapDataErr> {
    let table = match super::load_family(data_dir, &["Reflectance"])? {
        Some(table) => table,
        None => {
            info!("no reflectance files in {}", data_dir.display());
            return Ok(());
        }
    };

    let mut table = table;
    let project_key = plan.keys.key(Field::Project)?.to_owned();
    table.set_row_values(&project_key, plan.standard_projects.clone())?;

    if let Some(cal) = &plan.cal {
        let cal_table = table.select_columns(&cal.idxs);
        if cal_table.num_scans() > 0 {
            output::write_scan_file(
                &cal_table,
                &plan.keys,
                &cal.meta.dataset_id()?,
                &cal.out_dir.join("Reflectance_Cal_data.csv"),
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
                &group.out_dir.join("Reflectance_data.csv"),
            )?;
        }
    }

    Ok(())
}
