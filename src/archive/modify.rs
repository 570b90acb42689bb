//! Add datasets to the archive index.

use std::{collections::HashMap, fs, path::Path};

use log::info;

use crate::{errors::CdapDataErr, metadata::Metadata};

use super::Archive;

impl Archive {
    /// Index one dataset directory given the metadata read back from its
    /// `Metadata.csv` file. Returns the database id of the new dataset row.
    pub fn add_dataset(
        &self,
        meta: &HashMap<String, String>,
        dataset_dir: &Path,
    ) -> Result<i64, CdapDataErr> {
        let dataset_id = meta
            .get("Dataset ID")
            .ok_or_else(|| CdapDataErr::InvalidMetadata(dataset_dir.join("Metadata.csv")))?;
        let project = meta
            .get("Project")
            .ok_or_else(|| CdapDataErr::InvalidMetadata(dataset_dir.join("Metadata.csv")))?;

        self.db_conn.execute(
            "INSERT OR IGNORE INTO projects (name) VALUES (?1)",
            &[project as &dyn rusqlite::types::ToSql],
        )?;
        let project_row: i64 = self.db_conn.query_row(
            "SELECT id FROM projects WHERE name = ?1",
            &[project as &dyn rusqlite::types::ToSql],
            |row| row.get(0),
        )?;

        self.db_conn.execute(
            include_str!("modify/insert_dataset.sql"),
            &[
                &project_row as &dyn rusqlite::types::ToSql,
                dataset_id,
                &meta.get("Date"),
                &meta.get("Start Time"),
                &meta.get("Stop Time"),
                &meta.get("Location"),
                &meta.get("Country"),
                &meta.get("State"),
                &meta.get("County"),
            ],
        )?;
        let dataset_row = self.db_conn.last_insert_rowid();

        for entry in fs::read_dir(dataset_dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path().to_string_lossy().to_string();

            self.db_conn.execute(
                "INSERT INTO records (dataset_id, file_name, path) VALUES (?1, ?2, ?3)",
                &[
                    &dataset_row as &dyn rusqlite::types::ToSql,
                    &file_name,
                    &path,
                ],
            )?;
        }

        for (name, value) in meta {
            self.db_conn.execute(
                "INSERT INTO meta_values (dataset_id, name, value) VALUES (?1, ?2, ?3)",
                &[&dataset_row as &dyn rusqlite::types::ToSql, name, value],
            )?;
        }

        Ok(dataset_row)
    }

    /// Walk a reorganized tree and index every dataset directory found.
    ///
    /// A dataset directory is any directory holding a `Metadata.csv` file.
    /// Directories without one are descended into. Datasets already in the
    /// index are left alone, so reloading a tree is harmless. Returns the
    /// number of datasets added.
    pub fn load_tree(&self, tree_root: &Path) -> Result<usize, CdapDataErr> {
        let mut count = 0;
        self.load_tree_inner(tree_root, &mut count)?;
        Ok(count)
    }

    fn load_tree_inner(&self, dir: &Path, count: &mut usize) -> Result<(), CdapDataErr> {
        let meta_path = dir.join("Metadata.csv");

        if meta_path.is_file() {
            let meta = Metadata::read_csv(&meta_path)?;

            let dataset_id = meta
                .get("Dataset ID")
                .ok_or(CdapDataErr::InvalidMetadata(meta_path))?;

            if self.dataset_exists(dataset_id)? {
                info!("already indexed: {}", dataset_id);
            } else {
                self.add_dataset(&meta, dir)?;
                *count += 1;
            }

            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                self.load_tree_inner(&entry.path(), count)?;
            }
        }

        Ok(())
    }
}
