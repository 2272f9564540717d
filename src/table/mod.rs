use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

pub mod delimited;

pub use delimited::DEFAULT_SEPARATOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Str,
    Int,
    Float,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Str => write!(f, "string"),
            ColumnType::Int => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
        }
    }
}

/// One homogeneous column. Float columns use NaN as the missing-value sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Str(Vec<String>),
    Int(Vec<i64>),
    Float(Vec<f64>),
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("reused header {0}")]
    DuplicateHeader(String),
    #[error("{origin} line {line}: expected {expected} columns found {found}")]
    FieldCount {
        origin: String,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("column name {0} does not exist")]
    MissingColumn(String),
    #[error("column name {0} already exists")]
    ColumnExists(String),
    #[error("column {column} expected {expected} rows found {found}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("row {row} out of range (table has {n_row} rows, rows are 1-based)")]
    RowOutOfRange { row: usize, n_row: usize },
    #[error("expected mask with {expected} rows but found {found}")]
    MaskLength { expected: usize, found: usize },
    #[error("column {column} is {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Str(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Str(_) => ColumnType::Str,
            Column::Int(_) => ColumnType::Int,
            Column::Float(_) => ColumnType::Float,
        }
    }

    /// Text form of one cell as written to delimited files.
    pub fn cell_string(&self, row: usize) -> String {
        match self {
            Column::Str(v) => v[row].clone(),
            Column::Int(v) => v[row].to_string(),
            Column::Float(v) => format_float(v[row]),
        }
    }

    pub fn to_strings(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.cell_string(i)).collect()
    }

    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            // a header-only file has no cells to type
            Column::Str(_) if self.is_empty() => Some(Vec::new()),
            Column::Str(_) => None,
            Column::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::Float(v) => Some(v.clone()),
        }
    }

    pub fn keep_rows(&self, keep: &[usize]) -> Column {
        match self {
            Column::Str(v) => Column::Str(keep.iter().map(|&i| v[i].clone()).collect()),
            Column::Int(v) => Column::Int(keep.iter().map(|&i| v[i]).collect()),
            Column::Float(v) => Column::Float(keep.iter().map(|&i| v[i]).collect()),
        }
    }

    /// Value equality where NaN equals NaN.
    #[cfg(test)]
    pub fn same_values(&self, other: &Column) -> bool {
        match (self, other) {
            (Column::Str(a), Column::Str(b)) => a == b,
            (Column::Int(a), Column::Int(b)) => a == b,
            (Column::Float(a), Column::Float(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
            }
            _ => false,
        }
    }
}

/// Shortest text that parses back to the same `f64` and never reads as an integer.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:?}")
    }
}

/// Header-ordered columnar table; every column has `n_row` values.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    n_row: usize,
}

impl Table {
    pub fn from_columns<S, I>(data: I) -> Result<Table, TableError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Column)>,
    {
        let mut table = Table::default();
        for (i, (name, column)) in data.into_iter().enumerate() {
            let name = name.into();
            if table.index.contains_key(&name) {
                return Err(TableError::DuplicateHeader(name));
            }
            if i == 0 {
                table.n_row = column.len();
            } else if column.len() != table.n_row {
                return Err(TableError::LengthMismatch {
                    column: name,
                    expected: table.n_row,
                    found: column.len(),
                });
            }
            table.push_column(name, column);
        }
        Ok(table)
    }

    fn push_column(&mut self, name: String, column: Column) {
        self.index.insert(name.clone(), self.columns.len());
        self.headers.push(name);
        self.columns.push(column);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn n_row(&self) -> usize {
        self.n_row
    }

    pub fn n_column(&self) -> usize {
        self.headers.len()
    }

    pub(crate) fn index_of(&self, name: &str) -> Result<usize, TableError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub(crate) fn column_at(&self, idx: usize) -> &Column {
        &self.columns[idx]
    }

    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        let idx = self.index_of(name)?;
        Ok(&self.columns[idx])
    }

    /// Columns in the order requested.
    pub fn get_columns(&self, names: &[&str]) -> Result<Vec<&Column>, TableError> {
        names.iter().map(|name| self.column(name)).collect()
    }

    pub fn str_column(&self, name: &str) -> Result<&[String], TableError> {
        match self.column(name)? {
            Column::Str(v) => Ok(v),
            other => Err(type_error(name, ColumnType::Str, other)),
        }
    }

    pub fn int_column(&self, name: &str) -> Result<&[i64], TableError> {
        match self.column(name)? {
            Column::Int(v) => Ok(v),
            other => Err(type_error(name, ColumnType::Int, other)),
        }
    }

    #[cfg(test)]
    pub fn float_column(&self, name: &str) -> Result<&[f64], TableError> {
        match self.column(name)? {
            Column::Float(v) => Ok(v),
            other => Err(type_error(name, ColumnType::Float, other)),
        }
    }

    /// Float view that also accepts integer columns.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, TableError> {
        let column = self.column(name)?;
        column
            .to_f64()
            .ok_or_else(|| type_error(name, ColumnType::Float, column))
    }

    /// Any column rendered as text, as it would be written to disk.
    pub fn string_column(&self, name: &str) -> Result<Vec<String>, TableError> {
        Ok(self.column(name)?.to_strings())
    }

    pub fn add_columns<S, I>(mut self, data: I) -> Result<Table, TableError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Column)>,
    {
        let mut added = Vec::new();
        for (name, column) in data {
            let name = name.into();
            if self.index.contains_key(&name) {
                return Err(TableError::ColumnExists(name));
            }
            if column.len() != self.n_row {
                return Err(TableError::LengthMismatch {
                    column: name,
                    expected: self.n_row,
                    found: column.len(),
                });
            }
            added.push(name.clone());
            self.push_column(name, column);
        }
        tracing::debug!(count = added.len(), columns = %added.join(" "), "added columns");
        Ok(self)
    }

    /// Drops every row where `mask` is true.
    pub fn delete_rows(self, mask: &[bool]) -> Result<Table, TableError> {
        if mask.len() != self.n_row {
            return Err(TableError::MaskLength {
                expected: self.n_row,
                found: mask.len(),
            });
        }
        let keep: Vec<usize> = (0..self.n_row).filter(|&i| !mask[i]).collect();
        let n_deleted = self.n_row - keep.len();
        let columns = self.columns.iter().map(|c| c.keep_rows(&keep)).collect();
        tracing::info!(
            deleted = n_deleted,
            remaining = keep.len(),
            "rows deleted"
        );
        Ok(Table {
            headers: self.headers,
            columns,
            index: self.index,
            n_row: keep.len(),
        })
    }

    /// Same headers in order and same values, NaN matching NaN.
    #[cfg(test)]
    pub fn same_contents(&self, other: &Table) -> bool {
        self.headers == other.headers
            && self.n_row == other.n_row
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.same_values(b))
    }
}

fn type_error(name: &str, expected: ColumnType, found: &Column) -> TableError {
    TableError::ColumnType {
        column: name.to_string(),
        expected,
        found: found.column_type(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/table/tests.rs"]
mod tests;
