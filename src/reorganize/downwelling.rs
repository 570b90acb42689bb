//! The Downwelling pass. Reuses the Upwelling partition, adds the
//! downwelling instrument identity to each group's metadata, and writes the
//! metadata files as the terminal step.

use std::path::Path;

use log::info;

use crate::{
    errors::CdapDataErr,
    keys::{Field, KeyDict},
    metadata::{self, Metadata},
    table::RawTable,
};

use super::{output, DirectoryPlan};

/// Process the downwelling files of one acquisition directory.
///
/// When no downwelling file exists that is informational, not an error, but
/// the metadata files still have to be written since no later pass touches
/// them.
pub fn process_downwelling(
    data_dir: &Path,
    plan: &mut DirectoryPlan,
) -> Result<(), CdapDataErr> {
    let table = match super::load_family(data_dir, &["Downwelling", "Incoming"])? {
        Some(table) => table,
        None => {
            info!("no downwelling files in {}", data_dir.display());
            return super::write_metadata_files(plan);
        }
    };

    let mut table = table;
    let project_key = plan.keys.key(Field::Project)?.to_owned();
    table.set_row_values(&project_key, plan.standard_projects.clone())?;

    let wavelengths = table.wavelengths();

    if let Some(cal) = plan.cal.as_mut() {
        let cal_table = table.select_columns(&cal.idxs);

        if cal_table.num_scans() > 0 {
            output::write_scan_file(
                &cal_table,
                &plan.keys,
                &cal.meta.dataset_id()?,
                &cal.out_dir.join("Downwelling_Cal_data.csv"),
            )?;
        }
        update_meta(&mut cal.meta, &cal_table, &plan.keys, &wavelengths)?;
    }

    for group in plan.locations.iter_mut() {
        let loc_table = super::non_cal_subtable(&table, &group.idxs, &plan.keys)?;

        if loc_table.num_scans() > 0 {
            output::write_scan_file(
                &loc_table,
                &plan.keys,
                &group.meta.dataset_id()?,
                &group.out_dir.join("Downwelling_data.csv"),
            )?;
        }
        update_meta(&mut group.meta, &loc_table, &plan.keys, &wavelengths)?;
    }

    super::write_metadata_files(plan)
}

fn update_meta(
    meta: &mut Metadata,
    table: &RawTable,
    keys: &KeyDict,
    wavelengths: &[f64],
) -> Result<(), CdapDataErr> {
    let instrument_key = keys.key(Field::Instrument)?;
    if let Some(instrument_str) = table.row_values(instrument_key).and_then(|v| v.first()) {
        let info = metadata::instrument_info(instrument_str)?;
        meta.set_scalar("Downwelling Instrument Name", info.name);
        meta.set_scalar("Downwelling Instrument Serial Number", info.serial);
        meta.set_scalar("Downwelling Instrument FOV", info.fov);
    }

    super::inject_instrument_stats(meta, "Downwelling", wavelengths);

    Ok(())
}
