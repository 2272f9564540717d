use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::input::poolmap::PoolMap;
use crate::model::hits::{IntersectionHit, IntersectionHits, IntersectionKey, PoolHits};
use crate::model::pool::{Direction, PoolLabel, pair_label};
use crate::pipeline::PipelineError;
use crate::pipeline::stage6_pool_hits::{
    POOL_HIT_FILENAME, load_pool_hits, validate_pools, write_pool_hits,
};
use crate::report::grid::{GRID_FILENAME, write_grid};
use crate::table::{Column, DEFAULT_SEPARATOR, Table, TableError};

pub const INTERSECTION_HIT_FILENAME: &str = "intersection_hit.txt";
pub const INTERSECTION_HIT_PREFIX: &str = "intersection_hit";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeconvSummary {
    pub pools: usize,
    pub pool_hits: usize,
    pub pairs: usize,
    pub intersection_hits: usize,
}

fn clears(z: f64, threshold: f64) -> bool {
    !z.is_nan() && z >= threshold
}

/// Identities that are hits in both pools of an `H x V` pair.
pub fn intersect(pool_hits: &PoolHits, threshold: f64) -> IntersectionHits {
    let mut hits = IntersectionHits::new();
    for h in PoolLabel::all(Direction::Horizontal) {
        let Some(h_hits) = pool_hits.pool(h) else {
            continue;
        };
        for v in PoolLabel::all(Direction::Vertical) {
            if !pool_hits.contains_pool(v) {
                continue;
            }
            for (identity, h_hit) in h_hits {
                let Some(v_values) = pool_hits.get(v, identity) else {
                    continue;
                };
                let (zh, zv) = (h_hit.values.zscore, v_values.zscore);
                if !clears(zh, threshold) || !clears(zv, threshold) {
                    continue;
                }
                tracing::info!(pair = %pair_label(h, v), id = %identity, zh, zv, "intersection hit");
                hits.insert(
                    IntersectionKey {
                        horizontal: h,
                        vertical: v,
                        identity: identity.clone(),
                    },
                    IntersectionHit {
                        zscore_h: zh,
                        zscore_v: zv,
                        ratio_h: h_hit.values.ratio,
                        ratio_v: v_values.ratio,
                    },
                );
            }
        }
    }
    hits
}

pub fn count_pairs(hits: &IntersectionHits) -> usize {
    hits.keys()
        .map(|k| (k.horizontal, k.vertical))
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn intersection_table(hits: &IntersectionHits) -> Result<Table, TableError> {
    let n = hits.len();
    let mut pairs = Vec::with_capacity(n);
    let mut ids = Vec::with_capacity(n);
    let mut zscore_h = Vec::with_capacity(n);
    let mut zscore_v = Vec::with_capacity(n);
    let mut ratio_h = Vec::with_capacity(n);
    let mut ratio_v = Vec::with_capacity(n);
    for (key, hit) in hits {
        pairs.push(pair_label(key.horizontal, key.vertical));
        ids.push(key.identity.clone());
        zscore_h.push(hit.zscore_h);
        zscore_v.push(hit.zscore_v);
        ratio_h.push(hit.ratio_h);
        ratio_v.push(hit.ratio_v);
    }
    Table::from_columns([
        ("pair", Column::Str(pairs)),
        ("id", Column::Str(ids)),
        ("zscore_h", Column::Float(zscore_h)),
        ("zscore_v", Column::Float(zscore_v)),
        ("ratio_h", Column::Float(ratio_h)),
        ("ratio_v", Column::Float(ratio_v)),
    ])
}

/// `<parent>/intersection_hit_<dirname>.txt` beside the results directory.
pub fn parent_copy_path(results_dir: &Path) -> Option<PathBuf> {
    let dir_name = results_dir.file_name()?.to_str()?;
    let parent = results_dir.parent().unwrap_or(Path::new(""));
    Some(parent.join(format!("{}_{}.txt", INTERSECTION_HIT_PREFIX, dir_name)))
}

/// Writes `intersection_hit.txt` and its copy next to the results directory.
pub fn write_intersection(
    hits: &IntersectionHits,
    results_dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    let table = intersection_table(hits)?;
    let mut written = vec![results_dir.join(INTERSECTION_HIT_FILENAME)];
    match parent_copy_path(results_dir) {
        Some(copy) => written.push(copy),
        None => tracing::warn!(
            results_dir = %results_dir.display(),
            "results directory has no name, skipping intersection copy"
        ),
    }
    for path in &written {
        table.write(path, None, None, DEFAULT_SEPARATOR)?;
    }
    Ok(written)
}

/// Validates the map, collects pool hits, intersects, and writes every
/// deconvolution output under `results_dir`.
pub fn deconv_pools(
    results_dir: &Path,
    map: &PoolMap,
    threshold: f64,
) -> Result<DeconvSummary, PipelineError> {
    let pools = validate_pools(map, results_dir)?;
    let pool_hits = load_pool_hits(&pools)?;
    write_pool_hits(&pool_hits, &results_dir.join(POOL_HIT_FILENAME))?;

    let hits = intersect(&pool_hits, threshold);
    write_intersection(&hits, results_dir)?;
    write_grid(&hits, &results_dir.join(GRID_FILENAME))?;

    let summary = DeconvSummary {
        pools: pool_hits.n_pools(),
        pool_hits: pool_hits.n_hits(),
        pairs: count_pairs(&hits),
        intersection_hits: hits.len(),
    };
    tracing::info!(
        pools = summary.pools,
        pool_hits = summary.pool_hits,
        pairs = summary.pairs,
        intersection_hits = summary.intersection_hits,
        "deconvolution complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_intersect.rs"]
mod tests;
