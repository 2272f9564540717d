use crate::model::thresholds::DeconvParams;
use crate::pipeline::{PipelineError, check_len};

#[derive(Debug, Clone, PartialEq)]
pub struct RatioZscore {
    pub ratio: Vec<f64>,
    pub zscore: Vec<f64>,
    pub mean: f64,
    pub stdev: f64,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); NaN below two values.
pub fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Ratio of foreground to background, optionally divided by the
/// normalization ratio and log2 transformed, then z-scored over all rows.
pub fn compute_ratio_zscore(
    fg: &[f64],
    bg: &[f64],
    norm: Option<(&[f64], &[f64])>,
    params: &DeconvParams,
) -> Result<RatioZscore, PipelineError> {
    check_len("signal background", fg.len(), bg.len())?;
    if let Some(row) = bg.iter().position(|&b| b == 0.0) {
        return Err(PipelineError::ZeroBackground { row: row + 1 });
    }
    let mut ratio: Vec<f64> = fg.iter().zip(bg).map(|(f, b)| f / b).collect();

    if params.do_norm {
        let (nfg, nbg) = norm.ok_or(PipelineError::MissingNormalization("norm_fg/norm_bg"))?;
        check_len("normalization foreground", fg.len(), nfg.len())?;
        check_len("normalization background", fg.len(), nbg.len())?;
        for ((r, nf), nb) in ratio.iter_mut().zip(nfg).zip(nbg) {
            *r /= nf / nb;
        }
    }
    if params.do_log {
        for r in ratio.iter_mut() {
            *r = r.log2();
        }
    }

    let mean = mean(&ratio);
    let stdev = sample_stdev(&ratio, mean);
    let zscore = ratio.iter().map(|r| (r - mean) / stdev).collect();
    tracing::info!(n_row = ratio.len(), mean, stdev, "ratio and z-score computed");
    Ok(RatioZscore {
        ratio,
        zscore,
        mean,
        stdev,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_ratio.rs"]
mod tests;
