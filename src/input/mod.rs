use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use thiserror::Error;

use crate::table::TableError;

pub mod controls;
pub mod gpr;
pub mod poolmap;

use gpr::GprError;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Gpr(#[from] GprError),
}

pub fn open_maybe_gz(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GprFile {
    pub path: PathBuf,
    pub file_name: String,
    pub base: String,
}

/// GPR files in `data_dir`, sorted by file name.
pub fn discover_gpr_files(data_dir: &Path) -> Result<Vec<GprFile>, InputError> {
    if !data_dir.is_dir() {
        return Err(InputError::MissingInput(format!(
            "data directory {} does not exist",
            data_dir.display()
        )));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if let Some(base) = gpr_base_name(&file_name) {
            files.push(GprFile {
                base: base.to_string(),
                path,
                file_name,
            });
        }
    }
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    tracing::info!(
        dir = %data_dir.display(),
        count = files.len(),
        "discovered gpr files"
    );
    Ok(files)
}

/// Base name of a `.gpr` / `.gpr.gz` file (extension case-insensitive).
pub fn gpr_base_name(file_name: &str) -> Option<&str> {
    let lower = file_name.to_ascii_lowercase();
    let stem_len = if lower.ends_with(".gpr") {
        file_name.len() - ".gpr".len()
    } else if lower.ends_with(".gpr.gz") {
        file_name.len() - ".gpr.gz".len()
    } else {
        return None;
    };
    if stem_len == 0 {
        return None;
    }
    Some(&file_name[..stem_len])
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
