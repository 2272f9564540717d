use super::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_pooldeconv_grid_{}_{}", std::process::id(), id));
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

#[test]
fn test_grid_shape_and_sorted_cells() {
    let grid = build_grid([
        (label("H2"), label("V12"), "b_2"),
        (label("H2"), label("V12"), "a_1"),
        (label("H1"), label("V1"), "z_9"),
    ])
    .unwrap();
    assert_eq!(grid.n_row(), 12);
    assert_eq!(grid.headers()[0], "pool");
    assert_eq!(grid.headers()[1], "V1");
    assert_eq!(grid.headers()[12], "V12");

    let pools = grid.str_column("pool").unwrap();
    assert_eq!(pools[0], "H1");
    assert_eq!(pools[11], "H12");
    assert_eq!(grid.str_column("V12").unwrap()[1], "a_1 b_2");
    assert_eq!(grid.str_column("V1").unwrap()[0], "z_9");
    assert_eq!(grid.str_column("V1").unwrap()[1], "");
}

#[test]
fn test_grid_from_list_rejects_bad_pair() {
    let list = Table::from_columns([
        ("pair", Column::Str(vec!["V1 x H1".to_string()])),
        ("id", Column::Str(vec!["7_x".to_string()])),
    ])
    .unwrap();
    let err = grid_from_list(&list).unwrap_err();
    assert!(matches!(err, ReportError::BadPair(ref p) if p == "V1 x H1"));
}

#[test]
fn test_make_grid_for_dir_names_outputs() {
    let dir = make_temp_dir();
    let header = "pair\tid\tzscore_h\tzscore_v\tratio_h\tratio_v\n";
    write_file(
        &dir.join("intersection_hit.txt"),
        &format!("{header}H3 x V7\t7_x\t3.0\t3.0\t1.0\t1.0\n"),
    );
    write_file(
        &dir.join("intersection_hit_run2.txt"),
        &format!("{header}H1 x V1\t12\t3.0\t3.0\t1.0\t1.0\n"),
    );
    write_file(&dir.join("pool_hit.txt"), "pool\tfile\tid\tzscore\tratio\n");

    let written = make_grid_for_dir(&dir).unwrap();
    assert_eq!(
        written,
        vec![
            dir.join("intersection_grid.txt"),
            dir.join("intersection_grid_run2.txt"),
        ]
    );

    let grid = Table::from_file(&written[0], DEFAULT_SEPARATOR, None).unwrap();
    assert_eq!(grid.str_column("V7").unwrap()[2], "7_x");
    // an all-integer id column still lands in the grid as text
    let grid = Table::from_file(&written[1], DEFAULT_SEPARATOR, None).unwrap();
    assert_eq!(grid.str_column("V1").unwrap()[0], "12");
}

#[test]
fn test_make_grid_for_missing_dir_is_error() {
    let dir = make_temp_dir().join("absent");
    assert!(matches!(make_grid_for_dir(&dir), Err(ReportError::Io(_))));
}
