use std::collections::BTreeSet;

use crate::pipeline::{PipelineError, check_len};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitSelection<K> {
    /// Distinct identities of kept rows, first encounter first.
    pub identities: Vec<K>,
    /// 1-based row numbers.
    pub rows: Vec<usize>,
}

/// Keeps rows with `zscore >= threshold`. NaN never qualifies.
pub fn select_hits<K: Ord + Clone>(
    identities: &[K],
    zscores: &[f64],
    threshold: f64,
) -> Result<HitSelection<K>, PipelineError> {
    check_len("z-scores", identities.len(), zscores.len())?;
    let mut selection = HitSelection {
        identities: Vec::new(),
        rows: Vec::new(),
    };
    let mut seen: BTreeSet<&K> = BTreeSet::new();
    for (idx, (identity, &z)) in identities.iter().zip(zscores).enumerate() {
        if z.is_nan() || z < threshold {
            continue;
        }
        selection.rows.push(idx + 1);
        if seen.insert(identity) {
            selection.identities.push(identity.clone());
        }
    }
    tracing::info!(
        rows = selection.rows.len(),
        identities = selection.identities.len(),
        threshold,
        "hits selected"
    );
    Ok(selection)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_hits.rs"]
mod tests;
