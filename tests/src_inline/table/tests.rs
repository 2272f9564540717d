use super::*;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_pooldeconv_table_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn read(text: &str) -> Result<Table, TableError> {
    Table::from_reader(text.as_bytes(), "test", DEFAULT_SEPARATOR, None)
}

fn write_string(table: &Table, rows: Option<&[usize]>, columns: Option<&[&str]>) -> String {
    let mut out = Vec::new();
    table
        .write_to(&mut out, rows, columns, DEFAULT_SEPARATOR)
        .unwrap();
    String::from_utf8(out).unwrap()
}

fn sample() -> Table {
    Table::from_columns([
        ("name", Column::Str(vec!["a".into(), "b".into(), "c".into()])),
        ("count", Column::Int(vec![1, 2, 3])),
        ("score", Column::Float(vec![0.5, f64::NAN, 3.0])),
    ])
    .unwrap()
}

#[test]
fn test_from_columns_rejects_duplicate_names() {
    let err = Table::from_columns([
        ("x", Column::Int(vec![1])),
        ("x", Column::Int(vec![2])),
    ])
    .unwrap_err();
    assert!(matches!(err, TableError::DuplicateHeader(ref h) if h == "x"));
}

#[test]
fn test_from_columns_rejects_ragged_columns() {
    let err = Table::from_columns([
        ("x", Column::Int(vec![1, 2])),
        ("y", Column::Int(vec![2])),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        TableError::LengthMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn test_reader_coerces_int_then_float_then_string() {
    let table = read("a\tb\tc\n1\t2.5\tx\n2\t3\ty\n").unwrap();
    assert_eq!(table.headers(), &["a", "b", "c"]);
    assert_eq!(table.n_row(), 2);
    assert_eq!(table.int_column("a").unwrap(), &[1, 2]);
    assert_eq!(table.float_column("b").unwrap(), &[2.5, 3.0]);
    assert_eq!(table.str_column("c").unwrap(), &["x", "y"]);
}

#[test]
fn test_reader_rejects_duplicate_header() {
    let err = read("a\ta\n1\t2\n").unwrap_err();
    assert!(matches!(err, TableError::DuplicateHeader(_)));
}

#[test]
fn test_reader_reports_field_count_line() {
    let err = read("a\tb\n1\t2\n3\n").unwrap_err();
    match err {
        TableError::FieldCount {
            line,
            expected,
            found,
            ..
        } => {
            assert_eq!(line, 3);
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_reader_skips_blank_lines_and_crlf() {
    let table = read("a\tb\r\n1\tx\r\n\r\n2\ty\r\n").unwrap();
    assert_eq!(table.n_row(), 2);
    assert_eq!(table.str_column("b").unwrap(), &["x", "y"]);
}

#[test]
fn test_reader_with_explicit_headers() {
    let headers = vec!["id".to_string(), "name".to_string()];
    let table =
        Table::from_reader("7\tfoo\n8\tbar\n".as_bytes(), "test", '\t', Some(&headers)).unwrap();
    assert_eq!(table.n_row(), 2);
    assert_eq!(table.int_column("id").unwrap(), &[7, 8]);
}

#[test]
fn test_keep_text_columns_stay_verbatim() {
    let text = "id\tname\tcount\n007\t1.50\t3\n12\t2e1\t4\n";
    let table = Table::from_reader_keep_text(text.as_bytes(), "test", '\t', &["id", "name"])
        .unwrap();
    assert_eq!(table.str_column("id").unwrap(), &["007", "12"]);
    assert_eq!(table.str_column("name").unwrap(), &["1.50", "2e1"]);
    assert_eq!(table.int_column("count").unwrap(), &[3, 4]);

    let coerced = read(text).unwrap();
    assert_eq!(coerced.int_column("id").unwrap(), &[7, 12]);
}

#[test]
fn test_empty_input_is_empty_table() {
    let table = read("").unwrap();
    assert_eq!(table.n_row(), 0);
    assert_eq!(table.n_column(), 0);
}

#[test]
fn test_header_only_column_is_numeric_view() {
    let table = read("IDName\tzscore\n").unwrap();
    assert_eq!(table.n_row(), 0);
    assert!(table.numeric_column("zscore").unwrap().is_empty());
}

#[test]
fn test_get_columns_in_requested_order() {
    let table = sample();
    let cols = table.get_columns(&["score", "name"]).unwrap();
    assert_eq!(cols[0].column_type(), ColumnType::Float);
    assert_eq!(cols[1].column_type(), ColumnType::Str);
    let err = table.get_columns(&["name", "missing"]).unwrap_err();
    assert!(matches!(err, TableError::MissingColumn(ref c) if c == "missing"));
}

#[test]
fn test_column_lookup_by_name() {
    let table = sample();
    assert_eq!(table.column("score").unwrap().column_type(), ColumnType::Float);
    assert_eq!(table.column("name").unwrap().column_type(), ColumnType::Str);
    let err = table.column("missing").unwrap_err();
    assert!(matches!(err, TableError::MissingColumn(ref c) if c == "missing"));
}

#[test]
fn test_typed_access_checks_type() {
    let table = sample();
    let err = table.float_column("name").unwrap_err();
    assert!(matches!(
        err,
        TableError::ColumnType {
            expected: ColumnType::Float,
            found: ColumnType::Str,
            ..
        }
    ));
    assert_eq!(table.numeric_column("count").unwrap(), vec![1.0, 2.0, 3.0]);
    assert_eq!(table.string_column("count").unwrap(), vec!["1", "2", "3"]);
}

#[test]
fn test_add_columns_contract() {
    let table = sample();
    let err = table
        .clone()
        .add_columns([("count", Column::Int(vec![0, 0, 0]))])
        .unwrap_err();
    assert!(matches!(err, TableError::ColumnExists(_)));

    let err = table
        .clone()
        .add_columns([("extra", Column::Int(vec![0]))])
        .unwrap_err();
    assert!(matches!(err, TableError::LengthMismatch { .. }));

    let table = table
        .add_columns([
            ("z", Column::Float(vec![1.0, 2.0, 3.0])),
            ("y", Column::Int(vec![4, 5, 6])),
        ])
        .unwrap();
    assert_eq!(table.headers(), &["name", "count", "score", "z", "y"]);
}

#[test]
fn test_write_rows_are_one_based_and_columns_subset() {
    let table = sample();
    let text = write_string(&table, Some(&[3, 1]), Some(&["score", "name"]));
    assert_eq!(text, "score\tname\n3.0\tc\n0.5\ta\n");
}

#[test]
fn test_write_rejects_bad_rows_and_columns() {
    let table = sample();
    let mut out = Vec::new();
    let err = table
        .write_to(&mut out, Some(&[0]), None, '\t')
        .unwrap_err();
    assert!(matches!(err, TableError::RowOutOfRange { row: 0, n_row: 3 }));
    let err = table
        .write_to(&mut out, Some(&[4]), None, '\t')
        .unwrap_err();
    assert!(matches!(err, TableError::RowOutOfRange { row: 4, .. }));
    let err = table
        .write_to(&mut out, None, Some(&["nope"]), '\t')
        .unwrap_err();
    assert!(matches!(err, TableError::MissingColumn(_)));
}

#[test]
fn test_round_trip_through_file_keeps_types_and_nan() {
    let dir = make_temp_dir();
    let path = dir.join("table.txt");
    let table = sample();
    table.write(&path, None, None, DEFAULT_SEPARATOR).unwrap();
    let back = Table::from_file(&path, DEFAULT_SEPARATOR, None).unwrap();
    assert!(back.same_contents(&table));
    assert!(back.float_column("score").unwrap()[1].is_nan());
}

#[test]
fn test_round_trip_other_separator() {
    let table = sample();
    let mut out = Vec::new();
    table.write_to(&mut out, None, None, ',').unwrap();
    let back = Table::from_reader(out.as_slice(), "csv", ',', None).unwrap();
    assert!(back.same_contents(&table));
}

#[test]
fn test_delete_rows_mask_idempotence() {
    let table = sample();
    let same = table.clone().delete_rows(&[false, false, false]).unwrap();
    assert!(same.same_contents(&table));

    let empty = table.clone().delete_rows(&[true, true, true]).unwrap();
    assert_eq!(empty.n_row(), 0);
    assert_eq!(empty.n_column(), 3);

    let middle = table.clone().delete_rows(&[true, false, true]).unwrap();
    assert_eq!(middle.str_column("name").unwrap(), &["b"]);

    let err = table.delete_rows(&[true]).unwrap_err();
    assert!(matches!(
        err,
        TableError::MaskLength {
            expected: 3,
            found: 1
        }
    ));
}

#[test]
fn test_format_float() {
    assert_eq!(format_float(3.0), "3.0");
    assert_eq!(format_float(-0.25), "-0.25");
    assert_eq!(format_float(f64::NAN), "NaN");
    assert_eq!(format_float(0.1 + 0.2).parse::<f64>().unwrap(), 0.1 + 0.2);
}
