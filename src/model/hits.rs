use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::pool::PoolLabel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitValues {
    pub zscore: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolHit {
    pub file: String,
    pub values: HitValues,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("pool {pool} file {file} duplicated id {identity}")]
pub struct DuplicateHit {
    pub pool: PoolLabel,
    pub file: String,
    pub identity: String,
}

/// Per-pool hits keyed by composite identity (`ID_Name`).
#[derive(Debug, Clone, Default)]
pub struct PoolHits {
    pools: BTreeMap<PoolLabel, BTreeMap<String, PoolHit>>,
}

impl PoolHits {
    /// Registers a pool with no hits yet.
    pub fn add_pool(&mut self, pool: PoolLabel) {
        self.pools.entry(pool).or_default();
    }

    pub fn insert(
        &mut self,
        pool: PoolLabel,
        file: &str,
        identity: &str,
        values: HitValues,
    ) -> Result<(), DuplicateHit> {
        let hits = self.pools.entry(pool).or_default();
        if hits.contains_key(identity) {
            return Err(DuplicateHit {
                pool,
                file: file.to_string(),
                identity: identity.to_string(),
            });
        }
        hits.insert(
            identity.to_string(),
            PoolHit {
                file: file.to_string(),
                values,
            },
        );
        Ok(())
    }

    pub fn contains_pool(&self, pool: PoolLabel) -> bool {
        self.pools.contains_key(&pool)
    }

    pub fn pool(&self, pool: PoolLabel) -> Option<&BTreeMap<String, PoolHit>> {
        self.pools.get(&pool)
    }

    pub fn get(&self, pool: PoolLabel, identity: &str) -> Option<&HitValues> {
        self.pools
            .get(&pool)
            .and_then(|hits| hits.get(identity))
            .map(|hit| &hit.values)
    }

    pub fn n_pools(&self) -> usize {
        self.pools.len()
    }

    pub fn n_hits(&self) -> usize {
        self.pools.values().map(|hits| hits.len()).sum()
    }

    /// All hits ordered by pool then identity.
    pub fn iter(&self) -> impl Iterator<Item = (PoolLabel, &str, &PoolHit)> {
        self.pools.iter().flat_map(|(&pool, hits)| {
            hits.iter()
                .map(move |(identity, hit)| (pool, identity.as_str(), hit))
        })
    }
}

/// Orders by horizontal pool, vertical pool, then identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntersectionKey {
    pub horizontal: PoolLabel,
    pub vertical: PoolLabel,
    pub identity: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionHit {
    pub zscore_h: f64,
    pub zscore_v: f64,
    pub ratio_h: f64,
    pub ratio_v: f64,
}

pub type IntersectionHits = BTreeMap<IntersectionKey, IntersectionHit>;
