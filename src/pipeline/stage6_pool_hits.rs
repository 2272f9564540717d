use std::path::{Path, PathBuf};

use crate::input::poolmap::{PoolMap, summary_path};
use crate::model::hits::{HitValues, PoolHits};
use crate::model::pool::PoolLabel;
use crate::pipeline::PipelineError;
use crate::table::{Column, DEFAULT_SEPARATOR, Table, TableError};

pub const POOL_HIT_FILENAME: &str = "pool_hit.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPool {
    pub pool: PoolLabel,
    pub file: String,
    pub summary: PathBuf,
}

/// Every label must parse and every summary must exist before anything is read.
pub fn validate_pools(
    map: &PoolMap,
    results_dir: &Path,
) -> Result<Vec<ValidatedPool>, PipelineError> {
    let mut validated = Vec::with_capacity(map.entries.len());
    for entry in &map.entries {
        let pool: PoolLabel = entry.pool.parse()?;
        let summary = summary_path(results_dir, &entry.file);
        if !summary.is_file() {
            return Err(PipelineError::MissingSummary {
                pool: entry.pool.clone(),
                path: summary,
            });
        }
        tracing::info!(pool = %pool, file = %summary.display(), "pool validated");
        validated.push(ValidatedPool {
            pool,
            file: entry.file.clone(),
            summary,
        });
    }
    Ok(validated)
}

pub fn load_pool_hits(pools: &[ValidatedPool]) -> Result<PoolHits, PipelineError> {
    let mut pool_hits = PoolHits::default();
    for pool in pools {
        let summary = Table::from_file_keep_text(&pool.summary, DEFAULT_SEPARATOR, &["IDName"])?;
        add_summary(&mut pool_hits, pool.pool, &pool.file, &summary)?;
    }
    tracing::info!(
        pools = pool_hits.n_pools(),
        hits = pool_hits.n_hits(),
        "pool hits loaded"
    );
    Ok(pool_hits)
}

/// Adds one summary table's `IDName`, `zscore` and `ratio` rows under `pool`.
pub fn add_summary(
    pool_hits: &mut PoolHits,
    pool: PoolLabel,
    file: &str,
    summary: &Table,
) -> Result<(), PipelineError> {
    pool_hits.add_pool(pool);
    let identities = summary.string_column("IDName")?;
    let zscores = summary.numeric_column("zscore")?;
    let ratios = summary.numeric_column("ratio")?;
    for ((identity, zscore), ratio) in identities.iter().zip(zscores).zip(ratios) {
        pool_hits.insert(pool, file, identity, HitValues { zscore, ratio })?;
    }
    Ok(())
}

pub fn pool_hits_table(pool_hits: &PoolHits) -> Result<Table, TableError> {
    let mut pools = Vec::new();
    let mut files = Vec::new();
    let mut ids = Vec::new();
    let mut zscores = Vec::new();
    let mut ratios = Vec::new();
    for (pool, identity, hit) in pool_hits.iter() {
        pools.push(pool.to_string());
        files.push(hit.file.clone());
        ids.push(identity.to_string());
        zscores.push(hit.values.zscore);
        ratios.push(hit.values.ratio);
    }
    Table::from_columns([
        ("pool", Column::Str(pools)),
        ("file", Column::Str(files)),
        ("id", Column::Str(ids)),
        ("zscore", Column::Float(zscores)),
        ("ratio", Column::Float(ratios)),
    ])
}

pub fn write_pool_hits(pool_hits: &PoolHits, path: &Path) -> Result<(), PipelineError> {
    pool_hits_table(pool_hits)?.write(path, None, None, DEFAULT_SEPARATOR)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_pool_hits.rs"]
mod tests;
