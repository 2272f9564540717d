use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use crate::input::open_maybe_gz;
use crate::table::{Column, Table, TableError};

pub const DEFAULT_SEPARATOR: char = '\t';

impl Table {
    /// Reads a delimited file; the first line holds the headers unless `headers` is given.
    pub fn from_file(
        path: &Path,
        sep: char,
        headers: Option<&[String]>,
    ) -> Result<Table, TableError> {
        tracing::info!(path = %path.display(), "reading table");
        let reader = open_maybe_gz(path)?;
        Table::from_reader(reader, &path.display().to_string(), sep, headers)
    }

    /// Like [`Table::from_file`], but `text_columns` keep their tokens as
    /// written (`007` stays `007`). Use it for identifiers and file names.
    pub fn from_file_keep_text(
        path: &Path,
        sep: char,
        text_columns: &[&str],
    ) -> Result<Table, TableError> {
        tracing::info!(path = %path.display(), "reading table");
        let reader = open_maybe_gz(path)?;
        Table::from_reader_keep_text(reader, &path.display().to_string(), sep, text_columns)
    }

    pub fn from_reader<R: BufRead>(
        reader: R,
        origin: &str,
        sep: char,
        headers: Option<&[String]>,
    ) -> Result<Table, TableError> {
        read_delimited(reader, origin, sep, headers, &[])
    }

    pub fn from_reader_keep_text<R: BufRead>(
        reader: R,
        origin: &str,
        sep: char,
        text_columns: &[&str],
    ) -> Result<Table, TableError> {
        read_delimited(reader, origin, sep, None, text_columns)
    }
}

fn read_delimited<R: BufRead>(
    mut reader: R,
    origin: &str,
    sep: char,
    headers: Option<&[String]>,
    text_columns: &[&str],
) -> Result<Table, TableError> {
    let mut buf = String::new();
    let mut line_no = 0usize;

    let headers: Vec<String> = match headers {
        Some(h) => h.to_vec(),
        None => {
            let read = reader.read_line(&mut buf)?;
            if read == 0 {
                return Ok(Table::default());
            }
            line_no += 1;
            trim_line_end(&buf)
                .split(sep)
                .map(|s| s.to_string())
                .collect()
        }
    };

    let mut seen = HashSet::new();
    for h in &headers {
        if !seen.insert(h.as_str()) {
            return Err(TableError::DuplicateHeader(h.clone()));
        }
    }

    let n_column = headers.len();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); n_column];
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = trim_line_end(&buf);
        if line.is_empty() {
            continue;
        }
        let toks: Vec<&str> = line.split(sep).collect();
        if toks.len() != n_column {
            return Err(TableError::FieldCount {
                origin: origin.to_string(),
                line: line_no,
                expected: n_column,
                found: toks.len(),
            });
        }
        for (j, tok) in toks.into_iter().enumerate() {
            cells[j].push(tok.to_string());
        }
    }

    Table::from_columns(headers.into_iter().zip(cells).map(|(h, values)| {
        let column = if text_columns.contains(&h.as_str()) {
            Column::Str(values)
        } else {
            coerce_column(values)
        };
        (h, column)
    }))
}

impl Table {
    /// Writes a header line and the selected rows. `rows` are 1-based.
    pub fn write(
        &self,
        path: &Path,
        rows: Option<&[usize]>,
        columns: Option<&[&str]>,
        sep: char,
    ) -> Result<(), TableError> {
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);
        let (n_rows, n_cols) = self.write_to(&mut w, rows, columns, sep)?;
        w.flush()?;
        tracing::info!(
            rows = n_rows,
            columns = n_cols,
            path = %path.display(),
            "table written"
        );
        Ok(())
    }

    pub fn write_to<W: Write>(
        &self,
        w: &mut W,
        rows: Option<&[usize]>,
        columns: Option<&[&str]>,
        sep: char,
    ) -> Result<(usize, usize), TableError> {
        let col_idx: Vec<usize> = match columns {
            Some(names) => names
                .iter()
                .map(|name| self.index_of(name))
                .collect::<Result<_, _>>()?,
            None => (0..self.n_column()).collect(),
        };
        let row_idx: Vec<usize> = match rows {
            Some(rows) => rows
                .iter()
                .map(|&r| {
                    if r == 0 || r > self.n_row() {
                        Err(TableError::RowOutOfRange {
                            row: r,
                            n_row: self.n_row(),
                        })
                    } else {
                        Ok(r - 1)
                    }
                })
                .collect::<Result<_, _>>()?,
            None => (0..self.n_row()).collect(),
        };

        let sep_str = sep.to_string();
        let header: Vec<&str> = col_idx
            .iter()
            .map(|&j| self.headers()[j].as_str())
            .collect();
        writeln!(w, "{}", header.join(&sep_str))?;
        for &i in &row_idx {
            let toks: Vec<String> = col_idx
                .iter()
                .map(|&j| self.column_at(j).cell_string(i))
                .collect();
            writeln!(w, "{}", toks.join(&sep_str))?;
        }
        Ok((row_idx.len(), col_idx.len()))
    }
}

/// Integer if every cell is an integer, float if every cell is a number, else text.
pub fn coerce_column(cells: Vec<String>) -> Column {
    if cells.is_empty() {
        return Column::Str(cells);
    }
    if let Some(ints) = cells
        .iter()
        .map(|c| c.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()
    {
        return Column::Int(ints);
    }
    if let Some(floats) = cells
        .iter()
        .map(|c| c.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()
    {
        return Column::Float(floats);
    }
    Column::Str(cells)
}

pub(crate) fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
