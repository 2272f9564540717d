//! GenePix Results (GPR) reader and writer.
//!
//! A GPR file is an ATF 1.0 text file: a magic line, a line with the
//! header-record and column counts, `"key=value"` header records, a
//! tab-separated column line, then tab-separated data rows.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::input::open_maybe_gz;
use crate::table::delimited::trim_line_end;
use crate::table::{Column, ColumnType, DEFAULT_SEPARATOR, Table, TableError, format_float};

pub const FILE_TYPE: &str = "ATF";
pub const VERSION_NUMBER: &str = "1.0";
pub const ERROR_TOKEN: &str = "Error";

const STR_COLUMNS: &[&str] = &["Name", "ID"];
const INT_COLUMNS: &[&str] = &[
    "Block",
    "Column",
    "Row",
    "X",
    "Y",
    "Dia.",
    "F Pixels",
    "B Pixels",
    "Circularity",
    "Flags",
    "Normalize",
    "Autoflag",
];

#[derive(Debug, Error)]
pub enum GprError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{path}: gpr line 1 should be ATF 1.0, got {line:?}")]
    MagicLine { path: String, line: String },
    #[error("{path}: expecting file_type ATF got {found}")]
    FileType { path: String, found: String },
    #[error("{path}: expecting version_number 1.0 got {found}")]
    Version { path: String, found: String },
    #[error("{path}: gpr line 2 should be <n_header> <n_column>, got {line:?}")]
    CountLine { path: String, line: String },
    #[error("{path} line {line_no}: header expected \"<key>=<value>\" got {line:?}")]
    HeaderRecord {
        path: String,
        line_no: usize,
        line: String,
    },
    #[error("{path}: expected {expected} columns got {found}")]
    ColumnCount {
        path: String,
        expected: usize,
        found: usize,
    },
    #[error("{path} line {line_no}: expected {expected} columns got {found}")]
    FieldCount {
        path: String,
        line_no: usize,
        expected: usize,
        found: usize,
    },
    #[error("{path} line {line_no}: column {column} cannot parse {value:?} as {expected}")]
    Cell {
        path: String,
        line_no: usize,
        column: String,
        value: String,
        expected: ColumnType,
    },
    #[error("{path}: file ended before {what}")]
    Truncated { path: String, what: String },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Column type from the fixed GPR name lookup; unknown names are floats.
pub fn declared_type(name: &str) -> ColumnType {
    if STR_COLUMNS.contains(&name) {
        ColumnType::Str
    } else if INT_COLUMNS.contains(&name) {
        ColumnType::Int
    } else {
        ColumnType::Float
    }
}

#[derive(Debug, Clone)]
pub struct GprDocument {
    pub file_type: String,
    pub version_number: String,
    /// Header records in file order.
    pub headers: Vec<(String, String)>,
    table: Table,
}

impl GprDocument {
    pub fn from_file(path: &Path) -> Result<GprDocument, GprError> {
        tracing::info!(path = %path.display(), "reading gpr");
        let reader = open_maybe_gz(path)?;
        GprDocument::from_reader(reader, &path.display().to_string())
    }

    pub fn from_reader<R: BufRead>(mut reader: R, origin: &str) -> Result<GprDocument, GprError> {
        let mut lines = LineReader {
            reader: &mut reader,
            buf: String::new(),
            line_no: 0,
            origin,
        };

        let line1 = lines.required("line 1")?;
        let toks: Vec<&str> = line1.split_whitespace().collect();
        if toks.len() != 2 {
            return Err(GprError::MagicLine {
                path: origin.to_string(),
                line: line1,
            });
        }
        let (file_type, version_number) = (toks[0].to_string(), toks[1].to_string());
        if file_type != FILE_TYPE {
            return Err(GprError::FileType {
                path: origin.to_string(),
                found: file_type,
            });
        }
        if version_number != VERSION_NUMBER {
            return Err(GprError::Version {
                path: origin.to_string(),
                found: version_number,
            });
        }

        let line2 = lines.required("line 2")?;
        let counts: Vec<Option<usize>> = line2.split_whitespace().map(|t| t.parse().ok()).collect();
        let (n_header, n_column) = match counts.as_slice() {
            [Some(h), Some(c)] => (*h, *c),
            _ => {
                return Err(GprError::CountLine {
                    path: origin.to_string(),
                    line: line2,
                });
            }
        };

        let mut headers = Vec::with_capacity(n_header);
        for _ in 0..n_header {
            let line = lines.required("all header records")?;
            let record = line.trim().trim_matches('"');
            let parts: Vec<&str> = record.split('=').collect();
            if parts.len() != 2 {
                return Err(GprError::HeaderRecord {
                    path: origin.to_string(),
                    line_no: lines.line_no,
                    line,
                });
            }
            tracing::debug!(
                record = headers.len() + 1,
                key = parts[0],
                value = parts[1],
                "header record"
            );
            headers.push((parts[0].to_string(), parts[1].to_string()));
        }

        let column_line = lines.required("the column line")?;
        let names: Vec<String> = column_line
            .split('\t')
            .map(|t| t.trim_matches('"').to_string())
            .collect();
        if names.len() != n_column {
            return Err(GprError::ColumnCount {
                path: origin.to_string(),
                expected: n_column,
                found: names.len(),
            });
        }

        let mut columns: Vec<Column> = names
            .iter()
            .map(|name| match declared_type(name) {
                ColumnType::Str => Column::Str(Vec::new()),
                ColumnType::Int => Column::Int(Vec::new()),
                ColumnType::Float => Column::Float(Vec::new()),
            })
            .collect();
        for (i, (name, column)) in names.iter().zip(&columns).enumerate() {
            tracing::debug!(index = i + 1, column = %name, kind = %column.column_type(), "column type");
        }

        while let Some(line) = lines.next_line()? {
            if line.is_empty() {
                continue;
            }
            let toks: Vec<&str> = line.split('\t').collect();
            if toks.len() != n_column {
                return Err(GprError::FieldCount {
                    path: origin.to_string(),
                    line_no: lines.line_no,
                    expected: n_column,
                    found: toks.len(),
                });
            }
            for (j, tok) in toks.into_iter().enumerate() {
                push_cell(&mut columns[j], tok).map_err(|expected| GprError::Cell {
                    path: origin.to_string(),
                    line_no: lines.line_no,
                    column: names[j].clone(),
                    value: tok.to_string(),
                    expected,
                })?;
            }
        }

        let table = Table::from_columns(names.into_iter().zip(columns))?;
        tracing::info!(rows = table.n_row(), columns = table.n_column(), "gpr data rows");

        Ok(GprDocument {
            file_type,
            version_number,
            headers,
            table,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn n_row(&self) -> usize {
        self.table.n_row()
    }

    pub fn n_column(&self) -> usize {
        self.table.n_column()
    }

    pub fn n_header(&self) -> usize {
        self.headers.len()
    }

    pub fn column_list(&self) -> &[String] {
        self.table.headers()
    }

    /// Value of a header record; the last one wins when a key repeats.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn delete_rows(mut self, mask: &[bool]) -> Result<GprDocument, GprError> {
        self.table = self.table.delete_rows(mask)?;
        Ok(self)
    }

    /// Appends columns; each new column's type is its variant.
    pub fn add_columns<S, I>(mut self, data: I) -> Result<GprDocument, GprError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Column)>,
    {
        self.table = self.table.add_columns(data)?;
        Ok(self)
    }

    /// Column line plus rows, tab-separated, no ATF header.
    pub fn write(
        &self,
        path: &Path,
        rows: Option<&[usize]>,
        columns: Option<&[&str]>,
    ) -> Result<(), GprError> {
        Ok(self.table.write(path, rows, columns, DEFAULT_SEPARATOR)?)
    }

    /// Full ATF document that `from_file` reads back.
    pub fn write_document(&self, path: &Path) -> Result<(), GprError> {
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);
        self.write_document_to(&mut w)?;
        w.flush()?;
        tracing::info!(path = %path.display(), rows = self.n_row(), "gpr document written");
        Ok(())
    }

    pub fn write_document_to<W: Write>(&self, w: &mut W) -> Result<(), GprError> {
        writeln!(w, "{}\t{}", self.file_type, self.version_number)?;
        writeln!(w, "{}\t{}", self.n_header(), self.n_column())?;
        for (k, v) in &self.headers {
            writeln!(w, "\"{}={}\"", k, v)?;
        }
        let names: Vec<String> = self
            .column_list()
            .iter()
            .map(|n| format!("\"{}\"", n))
            .collect();
        writeln!(w, "{}", names.join("\t"))?;

        let order: Vec<&str> = self.column_list().iter().map(String::as_str).collect();
        let columns = self.table.get_columns(&order)?;
        for i in 0..self.n_row() {
            let toks: Vec<String> = columns.iter().map(|c| document_cell(c, i)).collect();
            writeln!(w, "{}", toks.join("\t"))?;
        }
        Ok(())
    }

    /// Distinct names per ID, in encounter order, joined by `;`.
    pub fn id_to_names(&self) -> Result<BTreeMap<String, String>, GprError> {
        let ids = self.table.str_column("ID")?;
        let names = self.table.str_column("Name")?;
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (id, name) in ids.iter().zip(names) {
            let entry = grouped.entry(id.as_str()).or_default();
            if !entry.contains(&name.as_str()) {
                entry.push(name.as_str());
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(id, names)| (id.to_string(), names.join(";")))
            .collect())
    }
}

fn push_cell(column: &mut Column, tok: &str) -> Result<(), ColumnType> {
    match column {
        Column::Str(v) => v.push(tok.trim_matches('"').to_string()),
        Column::Int(v) => v.push(tok.trim().parse().map_err(|_| ColumnType::Int)?),
        Column::Float(v) => {
            let value = if tok == ERROR_TOKEN {
                f64::NAN
            } else {
                tok.trim().parse().map_err(|_| ColumnType::Float)?
            };
            v.push(value);
        }
    }
    Ok(())
}

fn document_cell(column: &Column, row: usize) -> String {
    match column {
        Column::Str(v) => format!("\"{}\"", v[row]),
        Column::Int(v) => v[row].to_string(),
        Column::Float(v) if v[row].is_nan() => ERROR_TOKEN.to_string(),
        Column::Float(v) => format_float(v[row]),
    }
}

struct LineReader<'a, R> {
    reader: &'a mut R,
    buf: String,
    line_no: usize,
    origin: &'a str,
}

impl<R: BufRead> LineReader<'_, R> {
    fn next_line(&mut self) -> Result<Option<String>, GprError> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(trim_line_end(&self.buf).to_string()))
    }

    fn required(&mut self, what: &str) -> Result<String, GprError> {
        self.next_line()?.ok_or_else(|| GprError::Truncated {
            path: self.origin.to_string(),
            what: what.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/gpr.rs"]
mod tests;
