use std::collections::BTreeMap;

use crate::pipeline::stage2_ratio::mean;
use crate::pipeline::{PipelineError, check_len};

#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate<K: Ord> {
    pub by_group: BTreeMap<K, f64>,
    /// Reduced value of each row's group, in row order.
    pub by_row: Vec<f64>,
    /// Values of each group in row encounter order.
    pub raw: BTreeMap<K, Vec<f64>>,
}

pub fn aggregate_by_group<K, F>(
    keys: &[K],
    values: &[f64],
    reducer: F,
) -> Result<GroupAggregate<K>, PipelineError>
where
    K: Ord + Clone,
    F: Fn(&[f64]) -> f64,
{
    check_len("group values", keys.len(), values.len())?;
    let mut raw: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (key, &value) in keys.iter().zip(values) {
        raw.entry(key.clone()).or_default().push(value);
    }
    let by_group: BTreeMap<K, f64> = raw
        .iter()
        .map(|(key, group)| (key.clone(), reducer(group)))
        .collect();
    let by_row = keys
        .iter()
        .map(|key| by_group.get(key).copied().unwrap_or(f64::NAN))
        .collect();
    Ok(GroupAggregate {
        by_group,
        by_row,
        raw,
    })
}

pub fn aggregate_mean<K: Ord + Clone>(
    keys: &[K],
    values: &[f64],
) -> Result<GroupAggregate<K>, PipelineError> {
    aggregate_by_group(keys, values, mean)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_group.rs"]
mod tests;
