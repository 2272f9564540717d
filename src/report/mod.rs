use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::input::gpr::GprError;
use crate::model::thresholds::DeconvParams;
use crate::pipeline::stage5_gpr_file::FileSummary;
use crate::pipeline::stage7_intersect::DeconvSummary;
use crate::table::TableError;

pub mod grid;
pub mod text;

pub const SUMMARY_JSON_FILENAME: &str = "deconv_summary.json";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Gpr(#[from] GprError),
    #[error("bad pool pair {0:?}, expected \"H<n> x V<m>\"")]
    BadPair(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub data_dir: String,
    pub results_dir: String,
    pub params: DeconvParams,
    pub control_pairs: Option<usize>,
    pub files: Vec<FileSummary>,
    pub deconvolution: Option<DeconvSummary>,
}

impl RunSummary {
    pub fn new(data_dir: &Path, results_dir: &Path, params: &DeconvParams) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: data_dir.display().to_string(),
            results_dir: results_dir.display().to_string(),
            params: params.clone(),
            control_pairs: None,
            files: Vec::new(),
            deconvolution: None,
        }
    }
}

/// Non-finite floats render as `null`.
pub fn render_summary_json(summary: &RunSummary) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(summary)?)
}

pub fn write_summary_json(summary: &RunSummary, path: &Path) -> Result<(), ReportError> {
    let json = render_summary_json(summary)?;
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    w.flush()?;
    tracing::info!(path = %path.display(), files = summary.files.len(), "run summary written");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
