//! Create and connect to archives.

use std::{fs::create_dir_all, path::Path};

use crate::errors::CdapDataErr;

use super::Archive;

const INDEX: &str = "index.db";

impl Archive {
    /// Initialize a new archive.
    pub fn create(root: &dyn AsRef<Path>) -> Result<Self, CdapDataErr> {
        let root = root.as_ref().to_path_buf();
        create_dir_all(&root)?;

        let db_file = root.join(INDEX);

        // Create and set up the index database.
        let db_conn = rusqlite::Connection::open_with_flags(
            db_file,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        db_conn.execute_batch(include_str!("root/create_index.sql"))?;

        Ok(Archive { root, db_conn })
    }

    /// Open an existing archive.
    pub fn connect(root: &dyn AsRef<Path>) -> Result<Self, CdapDataErr> {
        let root = root.as_ref().to_path_buf();
        let db_file = root.join(INDEX);

        // Open the index database.
        let db_conn = rusqlite::Connection::open_with_flags(
            db_file,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE,
        )?;

        let arch = Archive { root, db_conn };
        arch.validate_index_structure()?;

        Ok(arch)
    }

    /// Retrieve a path to the root. Allows caller to store files in the archive.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate_index_structure(&self) -> Result<(), CdapDataErr> {
        let num_tables: i64 = self.db_conn.query_row(
            "SELECT COUNT(name) FROM sqlite_master WHERE type = 'table'",
            rusqlite::NO_PARAMS,
            |row| row.get(0),
        )?;

        if num_tables != 4 {
            return Err(CdapDataErr::InvalidSchema);
        }

        let mut stmt = self
            .db_conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;

        let table_iter = stmt.query_map(rusqlite::NO_PARAMS, |row| row.get::<_, String>(0))?;

        for table in table_iter {
            match table?.as_str() {
                "projects" | "datasets" | "records" | "meta_values" => {}
                _ => return Err(CdapDataErr::InvalidSchema),
            }
        }

        Ok(())
    }
}
