use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::input::controls::ControlSet;
use crate::input::gpr::GprDocument;
use crate::model::identity::{ProbeIdentity, build_identities};
use crate::model::thresholds::DeconvParams;
use crate::pipeline::PipelineError;
use crate::pipeline::stage1_mask::{MaskCounts, MaskInputs, build_row_mask};
use crate::pipeline::stage2_ratio::compute_ratio_zscore;
use crate::pipeline::stage3_group::aggregate_mean;
use crate::pipeline::stage4_hits::select_hits;
use crate::table::{Column, DEFAULT_SEPARATOR, Table, format_float};

pub const ROW_NUMBER_ORIG: &str = "row_number_orig";
pub const IDNAME: &str = "idname";
pub const RATIO_NAIVE: &str = "ratio_naive";
pub const ZSCORE_NAIVE: &str = "zscore_naive";
pub const ZSCORE_MEAN_NAIVE: &str = "zscore_mean_naive";
pub const LIST_SEPARATOR: &str = ";";

/// Per-file record for `deconv_summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub input: String,
    pub n_row_orig: usize,
    pub n_row_kept: usize,
    pub mask: MaskCounts,
    pub ratio_mean: f64,
    pub ratio_stdev: f64,
    pub hit_rows: usize,
    pub hit_identities: usize,
}

#[derive(Debug)]
pub struct GprDeconv {
    /// Surviving rows with the derived columns appended.
    pub document: GprDocument,
    /// Columns written to the `-top` file, in order.
    pub top_columns: Vec<String>,
    /// 1-based rows of `document` that cleared the threshold.
    pub hit_rows: Vec<usize>,
    /// One row per hit identity.
    pub summary: Table,
    pub mask: MaskCounts,
    pub n_row_orig: usize,
    pub ratio_mean: f64,
    pub ratio_stdev: f64,
}

pub fn deconvolve_document(
    gpr: GprDocument,
    params: &DeconvParams,
    controls: Option<&ControlSet>,
) -> Result<GprDeconv, PipelineError> {
    let table = gpr.table();
    let n_row_orig = table.n_row();
    let flags = table.int_column("Flags")?.to_vec();
    let ids = table.str_column("ID")?.to_vec();
    let fg = table.numeric_column(&params.signal_fg)?;
    let bg = table.numeric_column(&params.signal_bg)?;
    let norm = if params.do_norm {
        Some((
            table.numeric_column(&params.norm_fg)?,
            table.numeric_column(&params.norm_bg)?,
        ))
    } else {
        None
    };
    tracing::info!(n_row_orig, "gpr rows");

    let row_number_orig: Vec<i64> = (1..=n_row_orig as i64).collect();
    let gpr = gpr.add_columns([(ROW_NUMBER_ORIG, Column::Int(row_number_orig))])?;

    let control_ids = controls.map(|c| c.ids());
    let row_mask = build_row_mask(&MaskInputs {
        flags: &flags,
        ids: &ids,
        fg: &fg,
        bg: &bg,
        norm: norm.as_ref().map(|(f, b)| (f.as_slice(), b.as_slice())),
        control_ids: control_ids.as_ref(),
        flag_bad: params.flag_bad,
    })?;
    let gpr = gpr.delete_rows(&row_mask.mask)?;

    let table = gpr.table();
    let names = table.str_column("Name")?.to_vec();
    let ids = table.str_column("ID")?.to_vec();
    let fg = table.numeric_column(&params.signal_fg)?;
    let bg = table.numeric_column(&params.signal_bg)?;
    let norm = if params.do_norm {
        Some((
            table.numeric_column(&params.norm_fg)?,
            table.numeric_column(&params.norm_bg)?,
        ))
    } else {
        None
    };

    let identities = build_identities(&ids, &names);
    let idname: Vec<String> = identities.iter().map(ProbeIdentity::key).collect();
    let gpr = gpr.add_columns([(IDNAME, Column::Str(idname))])?;

    let rz = compute_ratio_zscore(
        &fg,
        &bg,
        norm.as_ref().map(|(f, b)| (f.as_slice(), b.as_slice())),
        params,
    )?;
    let zscores = aggregate_mean(&identities, &rz.zscore)?;
    let ratios = aggregate_mean(&identities, &rz.ratio)?;

    let gpr = gpr.add_columns([
        (RATIO_NAIVE, Column::Float(rz.ratio.clone())),
        (ZSCORE_NAIVE, Column::Float(rz.zscore.clone())),
        (ZSCORE_MEAN_NAIVE, Column::Float(zscores.by_row.clone())),
    ])?;

    let hits = select_hits(&identities, &rz.zscore, params.z_threshold)?;

    let mut top_columns = vec![
        "Name".to_string(),
        "ID".to_string(),
        params.signal_fg.clone(),
        params.signal_bg.clone(),
    ];
    if params.do_norm {
        top_columns.push(params.norm_fg.clone());
        top_columns.push(params.norm_bg.clone());
    }
    for name in [
        ROW_NUMBER_ORIG,
        IDNAME,
        RATIO_NAIVE,
        ZSCORE_NAIVE,
        ZSCORE_MEAN_NAIVE,
    ] {
        top_columns.push(name.to_string());
    }

    let joined = |values: Option<&Vec<f64>>| {
        values
            .map(|v| {
                v.iter()
                    .map(|&x| format_float(x))
                    .collect::<Vec<_>>()
                    .join(LIST_SEPARATOR)
            })
            .unwrap_or_default()
    };
    let lookup = |map: &BTreeMap<ProbeIdentity, f64>, k: &ProbeIdentity| {
        map.get(k).copied().unwrap_or(f64::NAN)
    };
    let hit_ids = &hits.identities;
    let summary = Table::from_columns([
        ("IDName", Column::Str(hit_ids.iter().map(ProbeIdentity::key).collect())),
        ("ID", Column::Str(hit_ids.iter().map(|k| k.id.clone()).collect())),
        ("Name", Column::Str(hit_ids.iter().map(|k| k.name.clone()).collect())),
        (
            "zscore",
            Column::Float(hit_ids.iter().map(|k| lookup(&zscores.by_group, k)).collect()),
        ),
        (
            "ratio",
            Column::Float(hit_ids.iter().map(|k| lookup(&ratios.by_group, k)).collect()),
        ),
        (
            "zscores",
            Column::Str(hit_ids.iter().map(|k| joined(zscores.raw.get(k))).collect()),
        ),
        (
            "ratios",
            Column::Str(hit_ids.iter().map(|k| joined(ratios.raw.get(k))).collect()),
        ),
    ])?;

    Ok(GprDeconv {
        document: gpr,
        top_columns,
        hit_rows: hits.rows,
        summary,
        mask: row_mask.counts,
        n_row_orig,
        ratio_mean: rz.mean,
        ratio_stdev: rz.stdev,
    })
}

/// Reads one GPR file and writes its `-top` and `-summary` tables.
pub fn process_gpr_file(
    input: &Path,
    top_path: &Path,
    summary_path: &Path,
    params: &DeconvParams,
    controls: Option<&ControlSet>,
) -> Result<FileSummary, PipelineError> {
    tracing::info!(
        input = %input.display(),
        top = %top_path.display(),
        summary = %summary_path.display(),
        "processing gpr file"
    );
    let gpr = GprDocument::from_file(input)?;
    let result = deconvolve_document(gpr, params, controls)?;

    let top_columns: Vec<&str> = result.top_columns.iter().map(String::as_str).collect();
    result
        .document
        .write(top_path, Some(&result.hit_rows), Some(&top_columns))?;
    result
        .summary
        .write(summary_path, None, None, DEFAULT_SEPARATOR)?;

    Ok(FileSummary {
        input: input.display().to_string(),
        n_row_orig: result.n_row_orig,
        n_row_kept: result.document.n_row(),
        mask: result.mask,
        ratio_mean: result.ratio_mean,
        ratio_stdev: result.ratio_stdev,
        hit_rows: result.hit_rows.len(),
        hit_identities: result.summary.n_row(),
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_gpr_file.rs"]
mod tests;
