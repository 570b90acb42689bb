//! Columnar table type for legacy CDAP text files.
//!
//! A CDAP file is tab delimited with one field per line: the first cell of a
//! line is the field name and every following cell belongs to one scan. Header
//! fields come first, then the spectral rows, whose keys are wavelength
//! numbers or dark current (`DC`) markers. Rows are ragged in real archives,
//! so column access pads short rows with the empty string.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::errors::CdapDataErr;

/// One field of a CDAP file: the field name and one cell per scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The field name, the first cell of the file line, verbatim.
    pub key: String,
    /// The remaining cells, one per scan column, verbatim.
    pub values: Vec<String>,
}

/// A parsed CDAP data file, fields in file order.
///
/// Scan columns are addressed with 0-based indexes into the value cells of
/// each row.
#[derive(Debug, Clone)]
pub struct RawTable {
    rows: Vec<Row>,
    index: HashMap<String, usize>,
}

impl RawTable {
    /// Read a single CDAP data file.
    pub fn load(path: &Path) -> Result<Self, CdapDataErr> {
        let file = File::open(path)?;
        let mut rows = Vec::new();

        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim_end_matches(|c| c == '\t' || c == '\r' || c == '\n');
            let mut cells = line.split('\t').map(str::to_owned);

            let key = match cells.next() {
                Some(key) => key,
                None => continue,
            };
            rows.push(Row {
                key,
                values: cells.collect(),
            });
        }

        Ok(Self::from_rows(rows))
    }

    /// Read several files of the same instrument family and join them
    /// column-wise.
    ///
    /// Paths are sorted first so `*Data01.txt` leads. Every file after the
    /// first must carry the same fields in the same order; a mismatch would
    /// silently scramble scan data, so it is an error instead.
    pub fn load_concat(paths: &[&Path]) -> Result<Self, CdapDataErr> {
        let mut paths: Vec<&Path> = paths.to_vec();
        paths.sort();

        let mut iter = paths.iter();
        let first = iter.next().ok_or(CdapDataErr::NotEnoughData)?;
        let mut table = Self::load(first)?;

        for path in iter {
            let other = Self::load(path)?;

            if other.rows.len() != table.rows.len() {
                return Err(CdapDataErr::TableMismatch(format!(
                    "{} has {} fields, expected {}",
                    path.display(),
                    other.rows.len(),
                    table.rows.len()
                )));
            }

            for (row, other_row) in table.rows.iter_mut().zip(other.rows) {
                if row.key != other_row.key {
                    return Err(CdapDataErr::TableMismatch(format!(
                        "{} has field '{}' where '{}' was expected",
                        path.display(),
                        other_row.key,
                        row.key
                    )));
                }
                row.values.extend(other_row.values);
            }
        }

        Ok(table)
    }

    fn from_rows(rows: Vec<Row>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            // First occurrence wins, later duplicates stay addressable by
            // position only.
            index.entry(row.key.clone()).or_insert(idx);
        }

        RawTable { rows, index }
    }

    /// True for files written by CDAP 2, which uses a row-per-scan layout.
    pub fn is_cdap2(&self) -> bool {
        self.rows
            .first()
            .map(|row| row.key.starts_with("PROCESSED"))
            .unwrap_or(false)
    }

    /// Index of the first spectral row: a key that parses as a wavelength
    /// number or starts with the dark current marker.
    pub fn scan_start(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.key.parse::<f64>().is_ok() || is_dark_current(&row.key))
    }

    /// The field names preceding the spectral rows.
    pub fn header_keys(&self) -> Vec<String> {
        let end = self.scan_start().unwrap_or_else(|| self.rows.len());
        self.rows[..end].iter().map(|row| row.key.clone()).collect()
    }

    /// The spectral rows (wavelength and dark current), in file order.
    pub fn scan_rows(&self) -> &[Row] {
        let start = self.scan_start().unwrap_or_else(|| self.rows.len());
        &self.rows[start..]
    }

    /// The wavelengths of the spectral rows, excluding dark current markers.
    pub fn wavelengths(&self) -> Vec<f64> {
        self.scan_rows()
            .iter()
            .filter_map(|row| row.key.parse::<f64>().ok())
            .collect()
    }

    /// Number of scan columns, taken as the widest row.
    pub fn num_scans(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.values.len())
            .max()
            .unwrap_or(0)
    }

    /// All rows in file order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Look up a row by its literal field name.
    pub fn row(&self, key: &str) -> Option<&Row> {
        self.index.get(key).map(|&idx| &self.rows[idx])
    }

    /// The value cells of a row, or `None` if the field is absent.
    pub fn row_values(&self, key: &str) -> Option<&[String]> {
        self.row(key).map(|row| row.values.as_slice())
    }

    /// One cell, padded with `""` when the row is too short.
    pub fn cell(&self, key: &str, col: usize) -> Option<&str> {
        self.row(key)
            .map(|row| row.values.get(col).map(String::as_str).unwrap_or(""))
    }

    /// Extract one scan column across all rows, padding short rows.
    pub fn column(&self, col: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.values.get(col).cloned().unwrap_or_default())
            .collect()
    }

    /// A new table holding only the given scan columns, in the given order.
    pub fn select_columns(&self, cols: &[usize]) -> RawTable {
        let rows = self
            .rows
            .iter()
            .map(|row| Row {
                key: row.key.clone(),
                values: cols
                    .iter()
                    .map(|&col| row.values.get(col).cloned().unwrap_or_default())
                    .collect(),
            })
            .collect();

        Self::from_rows(rows)
    }

    /// Partition scan columns into (selected, remaining) tables.
    pub fn split_columns(&self, selected: &[usize]) -> (RawTable, RawTable) {
        let num = self.num_scans();
        let rest: Vec<usize> = (0..num).filter(|col| !selected.contains(col)).collect();

        (self.select_columns(selected), self.select_columns(&rest))
    }

    /// Replace the value cells of a row. The field must exist.
    pub fn set_row_values(&mut self, key: &str, values: Vec<String>) -> Result<(), CdapDataErr> {
        match self.index.get(key) {
            Some(&idx) => {
                self.rows[idx].values = values;
                Ok(())
            }
            None => Err(CdapDataErr::LogicError("no such field to replace")),
        }
    }

    /// Append a new header row just before the spectral rows.
    pub fn insert_header_row(&mut self, key: &str, values: Vec<String>) {
        let at = self.scan_start().unwrap_or_else(|| self.rows.len());
        self.rows.insert(
            at,
            Row {
                key: key.to_owned(),
                values,
            },
        );
        self.reindex();
    }

    /// Remove a row by field name. No-op when the field is absent.
    pub fn remove_row(&mut self, key: &str) {
        if let Some(idx) = self.index.get(key).copied() {
            self.rows.remove(idx);
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (idx, row) in self.rows.iter().enumerate() {
            self.index.entry(row.key.clone()).or_insert(idx);
        }
    }
}

/// Dark current rows are scan data even though their keys are not numeric.
pub fn is_dark_current(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.starts_with("dc")
}

#[cfg(test)]
mod unit {
    use super::*;

    use std::io::Write;

    use tempdir::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).expect("Error creating test file.");
        f.write_all(contents.as_bytes())
            .expect("Error writing test file.");
        path
    }

    const SMALL_FILE: &str = "Project\tcsp01\tcsp01\n\
                              Replication\tcorn1\tCAL\n\
                              Latitude\t41.165\t\n\
                              726.049\t0.1234\t0.5678\t\n\
                              DC\t12\t13\r\n";

    #[test]
    fn test_load_strips_trailing_whitespace() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let path = write_file(&tmp, "Upwelling Data01.txt", SMALL_FILE);

        let table = RawTable::load(&path).expect("Error loading table.");

        assert_eq!(table.rows().len(), 5);
        // Trailing tab and CR removed, values untouched.
        assert_eq!(table.row_values("726.049").unwrap(), ["0.1234", "0.5678"]);
        assert_eq!(table.row_values("DC").unwrap(), ["12", "13"]);
    }

    #[test]
    fn test_scan_start_and_wavelengths() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let path = write_file(&tmp, "Upwelling Data01.txt", SMALL_FILE);
        let table = RawTable::load(&path).unwrap();

        assert_eq!(table.scan_start(), Some(3));
        assert_eq!(table.header_keys(), ["Project", "Replication", "Latitude"]);
        assert_eq!(table.wavelengths(), [726.049]);
        assert_eq!(table.scan_rows().len(), 2);
    }

    #[test]
    fn test_ragged_column_padding() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let path = write_file(&tmp, "Upwelling Data01.txt", SMALL_FILE);
        let table = RawTable::load(&path).unwrap();

        let col = table.column(1);
        assert_eq!(col, ["csp01", "CAL", "", "0.5678", "13"]);
    }

    #[test]
    fn test_concat_appends_columns() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let p2 = write_file(
            &tmp,
            "Upwelling Data02.txt",
            "Project\tcsp02\n\
             Replication\tsoy1\n\
             Latitude\t41.166\n\
             726.049\t0.9\n\
             DC\t14\n",
        );
        let p1 = write_file(&tmp, "Upwelling Data01.txt", SMALL_FILE);

        // Deliberately passed out of order, load_concat must sort.
        let table = RawTable::load_concat(&[&p2, &p1]).expect("Error joining tables.");

        assert_eq!(table.num_scans(), 3);
        assert_eq!(
            table.row_values("Project").unwrap(),
            ["csp01", "csp01", "csp02"]
        );
        assert_eq!(table.row_values("DC").unwrap(), ["12", "13", "14"]);
    }

    #[test]
    fn test_concat_rejects_mismatched_fields() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let p1 = write_file(&tmp, "Upwelling Data01.txt", SMALL_FILE);
        let p2 = write_file(
            &tmp,
            "Upwelling Data02.txt",
            "Project\tcsp02\n\
             Rep\tsoy1\n\
             Latitude\t41.166\n\
             726.049\t0.9\n\
             DC\t14\n",
        );

        match RawTable::load_concat(&[&p1, &p2]) {
            Err(CdapDataErr::TableMismatch(_)) => {}
            other => panic!("Expected TableMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_split_columns() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let path = write_file(&tmp, "Upwelling Data01.txt", SMALL_FILE);
        let table = RawTable::load(&path).unwrap();

        let (cal, field) = table.split_columns(&[1]);
        assert_eq!(cal.row_values("Replication").unwrap(), ["CAL"]);
        assert_eq!(field.row_values("Replication").unwrap(), ["corn1"]);
    }

    #[test]
    fn test_cdap2_detection() {
        let tmp = TempDir::new("cdap-data-test").unwrap();
        let path = write_file(&tmp, "Upwelling.txt", "PROCESSED 2014\t1\t2\n");
        let table = RawTable::load(&path).unwrap();

        assert!(table.is_cdap2());
    }
}
