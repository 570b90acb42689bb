//! The Upwelling pass: parse, classify, partition, and lay out the output
//! tree. Every later pass reuses the partition computed here.

use std::path::{Path, PathBuf};

use log::info;

use crate::{
    errors::CdapDataErr,
    keys::{Field, KeyDict},
    location::{self, Location},
    metadata::Metadata,
    scans,
};

use super::{output, DirectoryPlan, Group, ACQUISITION_SOFTWARE};

/// Process the upwelling files of one acquisition directory.
///
/// Each scan column is classified by location and by calibration status,
/// the table is partitioned into one calibration group plus one group per
/// location, the datalogger field is decoded per group, metadata is
/// synthesized, and the dataset directories with their Auxiliary and
/// Upwelling files are written. Returns `None` when the directory has no
/// upwelling data at all.
///
/// Every dataset directory created is recorded in `created` so the caller
/// can roll the output back if a later pass fails.
pub fn process_upwelling(
    data_dir: &Path,
    out_root: &Path,
    created: &mut Vec<PathBuf>,
) -> Result<Option<DirectoryPlan>, CdapDataErr> {
    let table = match super::load_family(data_dir, &["Upwelling", "Outgoing"])? {
        Some(table) => table,
        None => return Ok(None),
    };

    info!("processing {}", data_dir.display());

    let mut keys = KeyDict::resolve(&table.header_keys())?;
    let wavelengths = table.wavelengths();
    let legacy_path = data_dir.to_string_lossy().to_string();

    let project_key = keys.key(Field::Project)?.to_owned();
    let rep_key = keys.key(Field::Replication)?.to_owned();
    let lat_key = keys.key(Field::Latitude)?.to_owned();
    let lon_key = keys.key(Field::Longitude)?.to_owned();
    let file_key = keys.key(Field::FileName)?.to_owned();

    let num_scans = table.row_values(&file_key).map(|v| v.len()).unwrap_or(0);

    let mut reps = table.row_values(&rep_key).unwrap_or(&[]).to_vec();
    reps.resize(num_scans, String::new());

    // Classify each scan column: location, standardized project, cal status.
    let mut standard_projects = Vec::with_capacity(num_scans);
    let mut cal_idxs: Vec<usize> = vec![];
    let mut loc_cols: Vec<(Location, Vec<usize>)> = vec![];

    for col in 0..num_scans {
        let lat = table.cell(&lat_key, col).unwrap_or("");
        let lon = table.cell(&lon_key, col).unwrap_or("");
        let project = table.cell(&project_key, col).unwrap_or("");

        let loc = location::classify(lat, lon, project);
        standard_projects.push(scans::standardize_project_name(project, loc));

        let file_name = table.cell(&file_key, col).unwrap_or("");
        if scans::is_cal_scan(&reps[col], file_name) {
            cal_idxs.push(col);
            reps[col] = "CAL".to_owned();
        } else {
            match loc_cols.iter_mut().find(|(l, _)| *l == loc) {
                Some((_, idxs)) => idxs.push(col),
                None => loc_cols.push((loc, vec![col])),
            }
        }
    }

    // Bake the standardized labels into the working table so every split
    // inherits them.
    let mut table = table;
    table.set_row_values(&project_key, standard_projects.clone())?;
    table.set_row_values(&rep_key, reps)?;

    let cal = if cal_idxs.is_empty() {
        None
    } else {
        let mut cal_table = table.select_columns(&cal_idxs);
        super::decode_group(&mut cal_table, &mut keys, &legacy_path)?;

        let mut meta = Metadata::synthesize(&cal_table, &keys, &legacy_path, true)?;
        super::inject_instrument_stats(&mut meta, "Upwelling", &wavelengths);
        meta.set_scalar("Acquisition Software", ACQUISITION_SOFTWARE);

        let date = meta
            .value("Date")
            .ok_or(CdapDataErr::MissingField("Date"))?;
        let dataset_id = meta.dataset_id()?;
        let out_dir = output::create_dataset_dir(&out_root.join(&date).join("cal_data"), &dataset_id)?;
        created.push(out_dir.clone());

        output::write_aux_file(&cal_table, &keys, &dataset_id, &out_dir.join("Auxiliary_Cal.csv"))?;
        output::write_scan_file(
            &cal_table,
            &keys,
            &dataset_id,
            &out_dir.join("Upwelling_Cal_data.csv"),
        )?;

        let scans = super::scans_info_for(&cal_table, &keys)?;

        Some(Group {
            location: None,
            idxs: cal_idxs,
            meta,
            scans,
            out_dir,
        })
    };

    let mut locations = vec![];
    for (loc, idxs) in loc_cols {
        let mut loc_table = table.select_columns(&idxs);
        super::decode_group(&mut loc_table, &mut keys, &legacy_path)?;

        let mut meta = Metadata::synthesize(&loc_table, &keys, &legacy_path, false)?;
        meta.set_scalar("Location", loc.as_static_str());
        meta.set_scalar("County", loc.county());
        meta.set_scalar("State", loc.state());
        meta.set_scalar("Country", loc.country());
        if loc.is_known_plot() {
            meta.set_scalar("Illumination Source", "Sun");
        }
        super::inject_instrument_stats(&mut meta, "Upwelling", &wavelengths);
        meta.set_scalar("Acquisition Software", ACQUISITION_SOFTWARE);

        let date = meta
            .value("Date")
            .ok_or(CdapDataErr::MissingField("Date"))?;
        let dataset_id = meta.dataset_id()?;
        let out_dir = output::create_dataset_dir(
            &out_root.join(&date).join(loc.as_static_str()),
            &dataset_id,
        )?;
        created.push(out_dir.clone());

        output::write_aux_file(&loc_table, &keys, &dataset_id, &out_dir.join("Auxiliary.csv"))?;
        output::write_scan_file(
            &loc_table,
            &keys,
            &dataset_id,
            &out_dir.join("Upwelling_data.csv"),
        )?;

        let scans = super::scans_info_for(&loc_table, &keys)?;

        locations.push(Group {
            location: Some(loc),
            idxs,
            meta,
            scans,
            out_dir,
        });
    }

    Ok(Some(DirectoryPlan {
        keys,
        standard_projects,
        cal,
        locations,
    }))
}
