use serde::Serialize;

/// Manual instrument flag at or below which a spot is unreliable.
pub const FLAG_BAD: i64 = -100;
/// Aggregated z-score a hit must reach.
pub const Z_THRESHOLD: f64 = 2.5;
/// `ID` value that always marks a control spot.
pub const CONTROL_TOKEN: &str = "CONTROL";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeconvParams {
    pub signal_fg: String,
    pub signal_bg: String,
    pub norm_fg: String,
    pub norm_bg: String,
    pub do_norm: bool,
    pub do_log: bool,
    pub z_threshold: f64,
    pub flag_bad: i64,
}

impl DeconvParams {
    pub fn default_v1() -> Self {
        Self {
            signal_fg: "F635 Median".to_string(),
            signal_bg: "B635 Median".to_string(),
            norm_fg: "F532 Median".to_string(),
            norm_bg: "B532 Median".to_string(),
            do_norm: false,
            do_log: false,
            z_threshold: Z_THRESHOLD,
            flag_bad: FLAG_BAD,
        }
    }
}

impl Default for DeconvParams {
    fn default() -> Self {
        Self::default_v1()
    }
}
