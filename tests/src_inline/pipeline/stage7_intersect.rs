use super::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::input::poolmap::PoolMapEntry;
use crate::model::hits::HitValues;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_pooldeconv_stage7_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

fn label(s: &str) -> PoolLabel {
    s.parse().unwrap()
}

fn add(hits: &mut PoolHits, pool: &str, identity: &str, zscore: f64, ratio: f64) {
    hits.insert(label(pool), pool, identity, HitValues { zscore, ratio })
        .unwrap();
}

fn key(h: &str, v: &str, identity: &str) -> IntersectionKey {
    IntersectionKey {
        horizontal: label(h),
        vertical: label(v),
        identity: identity.to_string(),
    }
}

#[test]
fn test_pair_hit_carries_both_pools() {
    let mut hits = PoolHits::default();
    add(&mut hits, "H1", "X", 3.0, 2.0);
    add(&mut hits, "V1", "X", 4.0, 5.0);

    let inter = intersect(&hits, 2.5);
    assert_eq!(inter.len(), 1);
    let hit = inter[&key("H1", "V1", "X")];
    assert_eq!(hit.zscore_h, 3.0);
    assert_eq!(hit.zscore_v, 4.0);
    assert_eq!(hit.ratio_h, 2.0);
    assert_eq!(hit.ratio_v, 5.0);

    let table = intersection_table(&inter).unwrap();
    assert_eq!(
        table.headers(),
        &["pair", "id", "zscore_h", "zscore_v", "ratio_h", "ratio_v"]
    );
    assert_eq!(table.str_column("pair").unwrap(), &["H1 x V1"]);
}

#[test]
fn test_single_pool_and_weak_hits_dropped() {
    let mut hits = PoolHits::default();
    add(&mut hits, "H1", "W", 1.0, 1.0);
    add(&mut hits, "V1", "W", 5.0, 1.0);
    add(&mut hits, "H1", "Y", 3.0, 1.0);
    add(&mut hits, "V2", "Y", 2.4, 1.0);
    add(&mut hits, "H2", "Z", 9.0, 1.0);
    add(&mut hits, "H3", "N", f64::NAN, 1.0);
    add(&mut hits, "V3", "N", 3.0, 1.0);
    assert!(intersect(&hits, 2.5).is_empty());
}

#[test]
fn test_order_is_numeric_by_pool_then_identity() {
    let mut hits = PoolHits::default();
    for pool in ["H2", "H1", "V10", "V2"] {
        add(&mut hits, pool, "b", 3.0, 1.0);
        add(&mut hits, pool, "a", 3.0, 1.0);
    }
    let inter = intersect(&hits, 2.5);
    let pairs: Vec<String> = intersection_table(&inter)
        .unwrap()
        .string_column("pair")
        .unwrap();
    assert_eq!(
        pairs,
        vec![
            "H1 x V2", "H1 x V2", "H1 x V10", "H1 x V10", "H2 x V2", "H2 x V2", "H2 x V10",
            "H2 x V10",
        ]
    );
    let first: Vec<&str> = inter.keys().take(2).map(|k| k.identity.as_str()).collect();
    assert_eq!(first, vec!["a", "b"]);
    assert_eq!(count_pairs(&inter), 4);
}

#[test]
fn test_parent_copy_path() {
    assert_eq!(
        parent_copy_path(Path::new("/data/out/run1")),
        Some(PathBuf::from("/data/out/intersection_hit_run1.txt"))
    );
    assert_eq!(
        parent_copy_path(Path::new("run1")),
        Some(PathBuf::from("intersection_hit_run1.txt"))
    );
    assert_eq!(parent_copy_path(Path::new("/")), None);
}

#[test]
fn test_deconv_pools_writes_every_output() {
    let base = make_temp_dir();
    let results = base.join("results");
    fs::create_dir_all(&results).unwrap();
    let header = "IDName\tID\tName\tzscore\tratio\tzscores\tratios\n";
    write_file(
        &results.join("s_H1-summary.txt"),
        &format!("{header}7_x\t7\tx\t3.0\t2.0\t3.0\t2.0\n8_y\t8\ty\t3.0\t2.0\t3.0\t2.0\n"),
    );
    write_file(
        &results.join("s_V4-summary.txt"),
        &format!("{header}7_x\t7\tx\t4.0\t5.0\t4.0\t5.0\n"),
    );
    write_file(&results.join("s_V5-summary.txt"), header);
    let map = PoolMap {
        entries: [("H1", "s_H1"), ("V4", "s_V4"), ("V5", "s_V5")]
            .iter()
            .map(|(pool, file)| PoolMapEntry {
                pool: pool.to_string(),
                file: file.to_string(),
            })
            .collect(),
    };

    let summary = deconv_pools(&results, &map, 2.5).unwrap();
    assert_eq!(
        summary,
        DeconvSummary {
            pools: 3,
            pool_hits: 3,
            pairs: 1,
            intersection_hits: 1,
        }
    );

    assert!(results.join(POOL_HIT_FILENAME).is_file());
    let list = Table::from_file(
        &results.join(INTERSECTION_HIT_FILENAME),
        DEFAULT_SEPARATOR,
        None,
    )
    .unwrap();
    assert_eq!(list.str_column("pair").unwrap(), &["H1 x V4"]);
    assert_eq!(list.str_column("id").unwrap(), &["7_x"]);
    assert_eq!(list.float_column("ratio_v").unwrap(), &[5.0]);

    let copy = base.join("intersection_hit_results.txt");
    assert_eq!(
        fs::read_to_string(&copy).unwrap(),
        fs::read_to_string(results.join(INTERSECTION_HIT_FILENAME)).unwrap()
    );

    let grid = Table::from_file(&results.join(GRID_FILENAME), DEFAULT_SEPARATOR, None).unwrap();
    assert_eq!(grid.n_row(), 12);
    assert_eq!(grid.n_column(), 13);
    assert_eq!(grid.str_column("V4").unwrap()[0], "7_x");
    assert_eq!(grid.str_column("V4").unwrap()[1], "");
}

#[test]
fn test_deconv_pools_stops_on_missing_summary() {
    let results = make_temp_dir();
    let map = PoolMap {
        entries: vec![PoolMapEntry {
            pool: "H1".to_string(),
            file: "absent".to_string(),
        }],
    };
    let err = deconv_pools(&results, &map, 2.5).unwrap_err();
    assert!(matches!(err, PipelineError::MissingSummary { .. }));
    assert!(!results.join(POOL_HIT_FILENAME).exists());
}
