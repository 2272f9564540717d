use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::input::{GprFile, InputError};
use crate::model::pool::find_pool_label;
use crate::table::{Column, DEFAULT_SEPARATOR, Table, TableError};

pub const DEFAULT_MAP_FILENAME: &str = "map_pool_to_file.txt";
pub const SUMMARY_SUFFIX: &str = "-summary.txt";
pub const TOP_SUFFIX: &str = "-top.txt";
const TEXT_COLUMNS: &[&str] = &["pool", "file"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMapEntry {
    /// Label as written in the map; validated before use.
    pub pool: String,
    pub file: String,
}

/// Pool label to GPR base name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolMap {
    pub entries: Vec<PoolMapEntry>,
}

impl PoolMap {
    pub fn from_file(path: &Path) -> Result<PoolMap, InputError> {
        let table = Table::from_file_keep_text(path, DEFAULT_SEPARATOR, TEXT_COLUMNS)?;
        Ok(PoolMap::from_table(&table)?)
    }

    pub fn from_table(table: &Table) -> Result<PoolMap, TableError> {
        let pools = table.string_column("pool")?;
        let files = table.string_column("file")?;
        let entries = pools
            .into_iter()
            .zip(files)
            .map(|(pool, file)| PoolMapEntry { pool, file })
            .collect();
        Ok(PoolMap { entries })
    }

    /// Derives the map from GPR file names; files without a pool label are skipped.
    pub fn from_gpr_files(files: &[GprFile]) -> PoolMap {
        let mut entries = Vec::new();
        let mut seen = BTreeSet::new();
        for file in files {
            let Some(pool) = find_pool_label(&file.base) else {
                tracing::warn!(file = %file.file_name, "no valid pool name, skipping");
                continue;
            };
            if !seen.insert(pool) {
                tracing::error!(pool = %pool, file = %file.file_name, "pool is repeated");
            }
            tracing::info!(pool = %pool, base = %file.base, "pool mapped");
            entries.push(PoolMapEntry {
                pool: pool.to_string(),
                file: file.base.clone(),
            });
        }
        PoolMap { entries }
    }

    pub fn to_table(&self) -> Result<Table, TableError> {
        let pools = self.entries.iter().map(|e| e.pool.clone()).collect();
        let files = self.entries.iter().map(|e| e.file.clone()).collect();
        Table::from_columns([("pool", Column::Str(pools)), ("file", Column::Str(files))])
    }

    pub fn write(&self, path: &Path) -> Result<(), TableError> {
        self.to_table()?.write(path, None, None, DEFAULT_SEPARATOR)
    }
}

pub fn summary_path(results_dir: &Path, base: &str) -> PathBuf {
    results_dir.join(format!("{}{}", base, SUMMARY_SUFFIX))
}

pub fn top_path(results_dir: &Path, base: &str) -> PathBuf {
    results_dir.join(format!("{}{}", base, TOP_SUFFIX))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/poolmap.rs"]
mod tests;
