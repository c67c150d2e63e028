//! Tabular profile data: one schema, many rows, CSV in and out.
//!
//! Cells are `Option<String>`; an empty CSV field loads as `None` and is
//! written back as an empty field. Missing trailing fields are padded with
//! `None` so every row always has exactly the dataset's columns.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use crate::error::{FilterError, Result};

/// Column holding the free-text location of a profile.
pub const LOCATION_COLUMN: &str = "Location";

/// Column holding the profile link exported by the URL-only artifact.
pub const PROFILE_URL_COLUMN: &str = "Profile url";

/// Ordered rows sharing one ordered column schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Option<String>],
}

impl<'a> Row<'a> {
    /// Value of `column`, `None` when the cell is absent or the column unknown.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values[idx].as_deref()
    }

    pub fn values(&self) -> &'a [Option<String>] {
        self.values
    }
}

impl Dataset {
    /// Empty dataset with the given schema.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        check_unique(&columns)?;
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Append a row, padding short rows with absent cells.
    pub fn push_row<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut row: Vec<Option<String>> = values.into_iter().map(|v| v.map(Into::into)).collect();
        if row.len() > self.columns.len() {
            return Err(FilterError::MalformedInput {
                line: self.rows.len() as u64 + 2,
                reason: format!(
                    "expected {} fields, found {}",
                    self.columns.len(),
                    row.len()
                ),
            });
        }
        row.resize(self.columns.len(), None);
        self.rows.push(row);
        Ok(())
    }

    /// Parse comma-separated text with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers().map_err(malformed)?.clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(FilterError::MalformedInput {
                line: 1,
                reason: "no columns to parse".to_string(),
            });
        }

        let mut dataset = Self::new(headers.iter())?;
        for result in rdr.records() {
            let record = result.map_err(malformed)?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            if record.len() > dataset.columns.len() {
                return Err(FilterError::MalformedInput {
                    line,
                    reason: format!(
                        "expected {} fields, found {}",
                        dataset.columns.len(),
                        record.len()
                    ),
                });
            }
            dataset.push_row(record_cells(&record))?;
        }

        debug!(
            columns = dataset.columns.len(),
            rows = dataset.rows.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Write header and rows as CSV. Absent cells become empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Position of `column`, or a schema error naming the available columns.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| FilterError::MissingColumn {
                column: column.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Values of one column in row order.
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = Option<&str>> + '_> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| row[idx].as_deref()))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    /// Keep the rows whose flag in `mask` is set. Rows are copied verbatim.
    pub fn select(&self, mask: &[bool]) -> Self {
        debug_assert_eq!(mask.len(), self.rows.len());
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(row, _)| row.clone())
                .collect(),
        }
    }

    /// Set a derived column, one value per row. Missing values are absent.
    ///
    /// An existing column of that name is overwritten in place, so a labeled
    /// export can be fed back in; otherwise the column is appended.
    pub fn set_column(mut self, name: impl Into<String>, mut values: Vec<Option<String>>) -> Self {
        let name = name.into();
        values.resize(self.rows.len(), None);
        match self.columns.iter().position(|c| *c == name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        self
    }

    /// Drop a column if present.
    pub fn without_column(mut self, name: &str) -> Self {
        if let Some(idx) = self.columns.iter().position(|c| c == name) {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
        self
    }
}

fn record_cells(record: &StringRecord) -> impl Iterator<Item = Option<&str>> + '_ {
    record
        .iter()
        .map(|field| if field.is_empty() { None } else { Some(field) })
}

fn check_unique(columns: &[String]) -> Result<()> {
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            return Err(FilterError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}

fn malformed(err: csv::Error) -> FilterError {
    let line = err.position().map(|p| p.line()).unwrap_or_default();
    FilterError::MalformedInput {
        line,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Name,Location,Profile url\n\
        Ada,Greater London Area,http://a\n\
        Blaise,Paris Region,\n\
        Carl,,http://c\n";

    #[test]
    fn test_load_csv_with_absent_values() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(ds.columns(), ["Name", "Location", "Profile url"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.row(1).unwrap().get("Profile url"), None);
        assert_eq!(ds.row(2).unwrap().get(LOCATION_COLUMN), None);
        assert_eq!(ds.row(0).unwrap().get("Location"), Some("Greater London Area"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let ds = Dataset::from_reader("a,b,c\n1,2\n".as_bytes()).unwrap();
        assert_eq!(
            ds.row(0).unwrap().values(),
            [Some("1".to_string()), Some("2".to_string()), None]
        );
    }

    #[test]
    fn test_long_rows_are_malformed() {
        let err = Dataset::from_reader("a,b\n1,2\n1,2,3\n".as_bytes()).unwrap_err();
        match err {
            FilterError::MalformedInput { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let err = Dataset::from_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, FilterError::MalformedInput { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let bytes: &[u8] = b"a,b\n\xff\xfe,2\n";
        let err = Dataset::from_reader(bytes).unwrap_err();
        assert!(matches!(err, FilterError::MalformedInput { .. }));
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = Dataset::from_reader("a,a\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FilterError::DuplicateColumn(c) if c == "a"));
    }

    #[test]
    fn test_missing_column_lists_available() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let err = ds.column_index("Title").unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing column \"Title\" (available: Name, Location, Profile url)"
        );
    }

    #[test]
    fn test_write_csv_preserves_rows_and_quotes() {
        let mut ds = Dataset::new(["Name", "Location"]).unwrap();
        ds.push_row([Some("Ada"), Some("London, UK")]).unwrap();
        ds.push_row([Some("Blaise"), None]).unwrap();

        let text = String::from_utf8(ds.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(text, "Name,Location\nAda,\"London, UK\"\nBlaise,\n");

        let reloaded = Dataset::from_reader(text.as_bytes()).unwrap();
        assert_eq!(reloaded, ds);
    }

    #[test]
    fn test_select_and_columns() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();

        let picked = ds.select(&[false, true, false]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked.row(0).unwrap().get("Name"), Some("Blaise"));

        let labeled = ds
            .clone()
            .set_column("Country", vec![Some("United Kingdom".into()), None, None]);
        assert_eq!(labeled.columns().last().map(String::as_str), Some("Country"));
        assert_eq!(labeled.without_column("Country"), ds);
    }

    #[test]
    fn test_set_column_overwrites_existing_values() {
        let ds = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let relabeled = ds.set_column("Location", vec![Some("uk".into()), None]);

        assert_eq!(relabeled.columns(), ["Name", "Location", "Profile url"]);
        assert_eq!(relabeled.row(0).unwrap().get("Location"), Some("uk"));
        assert_eq!(relabeled.row(1).unwrap().get("Location"), None);
        assert_eq!(relabeled.row(2).unwrap().get("Location"), None);
        assert_eq!(relabeled.row(0).unwrap().get("Profile url"), Some("http://a"));
    }
}
