use super::*;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::pipeline::stage1_mask::MaskCounts;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_pooldeconv_report_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn file_summary(ratio_stdev: f64) -> FileSummary {
    FileSummary {
        input: "data/scan_H1.gpr".to_string(),
        n_row_orig: 10,
        n_row_kept: 8,
        mask: MaskCounts {
            bad_flag: 1,
            control_token: 1,
            masked: 2,
            ..MaskCounts::default()
        },
        ratio_mean: 1.5,
        ratio_stdev,
        hit_rows: 1,
        hit_identities: 1,
    }
}

#[test]
fn test_summary_json_fields() {
    let mut summary = RunSummary::new(
        Path::new("data"),
        Path::new("results"),
        &DeconvParams::default_v1(),
    );
    summary.control_pairs = Some(4);
    summary.files.push(file_summary(0.5));
    summary.deconvolution = Some(DeconvSummary {
        pools: 2,
        pool_hits: 3,
        pairs: 1,
        intersection_hits: 1,
    });

    let json = render_summary_json(&summary).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["tool"], env!("CARGO_PKG_NAME"));
    assert_eq!(value["data_dir"], "data");
    assert_eq!(value["params"]["z_threshold"], 2.5);
    assert_eq!(value["params"]["flag_bad"], -100);
    assert_eq!(value["params"]["signal_fg"], "F635 Median");
    assert_eq!(value["control_pairs"], 4);
    assert_eq!(value["files"][0]["mask"]["masked"], 2);
    assert_eq!(value["files"][0]["n_row_kept"], 8);
    assert_eq!(value["deconvolution"]["intersection_hits"], 1);
}

#[test]
fn test_nan_statistics_render_as_null() {
    let mut summary = RunSummary::new(
        Path::new("data"),
        Path::new("results"),
        &DeconvParams::default_v1(),
    );
    summary.files.push(file_summary(f64::NAN));
    let json = render_summary_json(&summary).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["files"][0]["ratio_stdev"].is_null());
    assert!(value["deconvolution"].is_null());
    assert!(value["control_pairs"].is_null());
}

#[test]
fn test_write_summary_json() {
    let dir = make_temp_dir();
    let path = dir.join(SUMMARY_JSON_FILENAME);
    let summary = RunSummary::new(&dir, &dir, &DeconvParams::default_v1());
    write_summary_json(&summary, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("}\n"));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["files"].as_array().map(Vec::len), Some(0));
}
