use std::collections::HashSet;

use serde::Serialize;

use crate::model::thresholds::CONTROL_TOKEN;
use crate::pipeline::{PipelineError, check_len};

#[derive(Debug, Clone, Copy)]
pub struct MaskInputs<'a> {
    pub flags: &'a [i64],
    pub ids: &'a [String],
    pub fg: &'a [f64],
    pub bg: &'a [f64],
    /// Normalization foreground and background, when normalizing.
    pub norm: Option<(&'a [f64], &'a [f64])>,
    pub control_ids: Option<&'a HashSet<&'a str>>,
    pub flag_bad: i64,
}

/// Rows hit by each predicate; a row can count toward several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaskCounts {
    pub bad_flag: usize,
    pub control_list: usize,
    pub control_token: usize,
    pub bad_signal: usize,
    pub bad_norm: usize,
    pub masked: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowMask {
    /// True where the row is dropped.
    pub mask: Vec<bool>,
    pub counts: MaskCounts,
}

fn invalid_signal(fg: f64, bg: f64) -> bool {
    // NaN fails both comparisons
    !(fg > 0.0 && bg > 0.0)
}

pub fn build_row_mask(inputs: &MaskInputs<'_>) -> Result<RowMask, PipelineError> {
    let n_row = inputs.flags.len();
    check_len("ID", n_row, inputs.ids.len())?;
    check_len("signal foreground", n_row, inputs.fg.len())?;
    check_len("signal background", n_row, inputs.bg.len())?;
    if let Some((nfg, nbg)) = inputs.norm {
        check_len("normalization foreground", n_row, nfg.len())?;
        check_len("normalization background", n_row, nbg.len())?;
    }

    let mut counts = MaskCounts::default();
    let mut mask = Vec::with_capacity(n_row);
    for row in 0..n_row {
        let id = inputs.ids[row].as_str();
        let bad_flag = inputs.flags[row] <= inputs.flag_bad;
        let control_list = inputs
            .control_ids
            .is_some_and(|ids| ids.contains(id));
        let control_token = id == CONTROL_TOKEN;
        let bad_signal = invalid_signal(inputs.fg[row], inputs.bg[row]);
        let bad_norm = inputs
            .norm
            .is_some_and(|(nfg, nbg)| invalid_signal(nfg[row], nbg[row]));

        counts.bad_flag += bad_flag as usize;
        counts.control_list += control_list as usize;
        counts.control_token += control_token as usize;
        counts.bad_signal += bad_signal as usize;
        counts.bad_norm += bad_norm as usize;

        let drop = bad_flag || control_list || control_token || bad_signal || bad_norm;
        counts.masked += drop as usize;
        mask.push(drop);
    }

    tracing::info!(
        n_row,
        masked = counts.masked,
        bad_flag = counts.bad_flag,
        control_list = counts.control_list,
        control_token = counts.control_token,
        bad_signal = counts.bad_signal,
        bad_norm = counts.bad_norm,
        "row mask built"
    );
    Ok(RowMask { mask, counts })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_mask.rs"]
mod tests;
