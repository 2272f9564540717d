use std::path::PathBuf;

use thiserror::Error;

use crate::input::InputError;
use crate::input::gpr::GprError;
use crate::model::hits::DuplicateHit;
use crate::model::pool::InvalidPoolLabel;
use crate::table::TableError;

pub mod stage1_mask;
pub mod stage2_ratio;
pub mod stage3_group;
pub mod stage4_hits;
pub mod stage5_gpr_file;
pub mod stage6_pool_hits;
pub mod stage7_intersect;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("background is zero at row {row}")]
    ZeroBackground { row: usize },
    #[error("normalization requested but {0} values were not supplied")]
    MissingNormalization(&'static str),
    #[error("{what}: expected {expected} values got {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    InvalidPool(#[from] InvalidPoolLabel),
    #[error("results unavailable for pool {pool}: {}", path.display())]
    MissingSummary { pool: String, path: PathBuf },
    #[error(transparent)]
    DuplicateHit(#[from] DuplicateHit),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Gpr(#[from] GprError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn check_len(
    what: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), PipelineError> {
    if expected != found {
        return Err(PipelineError::LengthMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}
