//! Query the archive index.

use crate::errors::CdapDataErr;

use super::{Archive, DatasetSummary};

impl Archive {
    /// Retrieve a list of all the projects in the index.
    pub fn projects(&self) -> Result<Vec<String>, CdapDataErr> {
        let mut stmt = self
            .db_conn
            .prepare("SELECT name FROM projects ORDER BY name")?;

        let projects: Result<Vec<String>, _> = stmt
            .query_map(rusqlite::NO_PARAMS, |row| row.get(0))?
            .collect();

        projects.map_err(CdapDataErr::Database)
    }

    /// Count the datasets in the index.
    pub fn dataset_count(&self) -> Result<i64, CdapDataErr> {
        let count: i64 = self.db_conn.query_row(
            "SELECT COUNT(id) FROM datasets",
            rusqlite::NO_PARAMS,
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// Retrieve summaries of every dataset belonging to a project, ordered by
    /// date and start time.
    pub fn datasets_for_project(
        &self,
        project: &str,
    ) -> Result<Vec<DatasetSummary>, CdapDataErr> {
        let mut stmt = self.db_conn.prepare(
            "
                SELECT datasets.dataset_id,
                       projects.name,
                       datasets.date,
                       datasets.start_time,
                       datasets.stop_time,
                       datasets.location
                FROM datasets JOIN projects ON datasets.project_id = projects.id
                WHERE projects.name = ?1
                ORDER BY datasets.date, datasets.start_time
            ",
        )?;

        let summaries: Result<Vec<DatasetSummary>, _> = stmt
            .query_map(&[&project as &dyn rusqlite::types::ToSql], |row| {
                Ok(DatasetSummary {
                    dataset_id: row.get(0)?,
                    project: row.get(1)?,
                    date: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    start_time: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    stop_time: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    location: row.get(5)?,
                })
            })?
            .collect();

        summaries.map_err(CdapDataErr::Database)
    }

    /// Retrieve the full metadata recorded for a dataset as name and value
    /// pairs.
    pub fn metadata_for_dataset(
        &self,
        dataset_id: &str,
    ) -> Result<Vec<(String, String)>, CdapDataErr> {
        let dataset_row = self.dataset_row_id(dataset_id)?;

        let mut stmt = self.db_conn.prepare(
            "SELECT name, value FROM meta_values WHERE dataset_id = ?1 ORDER BY name",
        )?;

        let values: Result<Vec<(String, String)>, _> = stmt
            .query_map(&[&dataset_row], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect();

        values.map_err(CdapDataErr::Database)
    }

    /// Retrieve the file names recorded for a dataset.
    pub fn files_for_dataset(&self, dataset_id: &str) -> Result<Vec<String>, CdapDataErr> {
        let dataset_row = self.dataset_row_id(dataset_id)?;

        let mut stmt = self.db_conn.prepare(
            "SELECT file_name FROM records WHERE dataset_id = ?1 ORDER BY file_name",
        )?;

        let files: Result<Vec<String>, _> = stmt
            .query_map(&[&dataset_row], |row| row.get(0))?
            .collect();

        files.map_err(CdapDataErr::Database)
    }

    /// Check whether a dataset id is already in the index.
    pub fn dataset_exists(&self, dataset_id: &str) -> Result<bool, CdapDataErr> {
        match self.dataset_row_id(dataset_id) {
            Ok(_) => Ok(true),
            Err(CdapDataErr::NotInIndex) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn dataset_row_id(&self, dataset_id: &str) -> Result<i64, CdapDataErr> {
        self.db_conn
            .query_row(
                "SELECT id FROM datasets WHERE dataset_id = ?1",
                &[&dataset_id],
                |row| row.get(0),
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => CdapDataErr::NotInIndex,
                err => CdapDataErr::Database(err),
            })
    }
}
