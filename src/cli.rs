use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::input::controls::ControlMode;
use crate::input::poolmap::DEFAULT_MAP_FILENAME;
use crate::model::thresholds::{DeconvParams, FLAG_BAD, Z_THRESHOLD};

#[derive(Debug, Parser)]
#[command(
    name = "kira-pooldeconv",
    version,
    about = "Deconvolute protein array pooling data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score every GPR file, then intersect horizontal and vertical pools.
    Run(RunArgs),
    /// Tally flagged vs unflagged spots per (ID, Name) into a control list.
    Controls(ControlsArgs),
    /// Turn intersection_hit* lists into 12 x 12 grids.
    Grid(GridArgs),
    /// Print spot histograms for one GPR file.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(help = "Directory for reading gpr data files")]
    pub data_dir: PathBuf,

    #[arg(help = "Directory for writing results")]
    pub results_dir: PathBuf,

    #[arg(long, help = "Control list with columns id, name (and control, exptl in tally mode)")]
    pub control_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ControlModeArg::Simple)]
    pub control_mode: ControlModeArg,

    #[arg(long, default_value_t = false, help = "Create the pool-to-file map from gpr file names")]
    pub create_map: bool,

    #[arg(long, default_value = DEFAULT_MAP_FILENAME, help = "Pool-to-file map inside RESULTS_DIR")]
    pub map_filename: String,

    #[arg(long, default_value = "F635 Median")]
    pub signal_fg: String,

    #[arg(long, default_value = "B635 Median")]
    pub signal_bg: String,

    #[arg(long, default_value = "F532 Median")]
    pub norm_fg: String,

    #[arg(long, default_value = "B532 Median")]
    pub norm_bg: String,

    #[arg(long, default_value_t = false, help = "Normalize signal fg/bg by norm fg/bg")]
    pub do_norm: bool,

    #[arg(long, default_value_t = false, help = "Take log2 before calculating z-scores")]
    pub do_log: bool,

    #[arg(long, default_value_t = false)]
    pub skip_gpr: bool,

    #[arg(long, default_value_t = false)]
    pub skip_deconv: bool,

    #[arg(long, default_value_t = Z_THRESHOLD)]
    pub z_threshold: f64,

    #[arg(long, default_value_t = FLAG_BAD, allow_negative_numbers = true)]
    pub flag_bad: i64,
}

impl RunArgs {
    pub fn params(&self) -> DeconvParams {
        DeconvParams {
            signal_fg: self.signal_fg.clone(),
            signal_bg: self.signal_bg.clone(),
            norm_fg: self.norm_fg.clone(),
            norm_bg: self.norm_bg.clone(),
            do_norm: self.do_norm,
            do_log: self.do_log,
            z_threshold: self.z_threshold,
            flag_bad: self.flag_bad,
        }
    }
}

#[derive(Debug, Args)]
pub struct ControlsArgs {
    pub data_dir: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = FLAG_BAD, allow_negative_numbers = true)]
    pub flag_bad: i64,
}

#[derive(Debug, Args)]
pub struct GridArgs {
    pub results_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    pub gpr: PathBuf,

    #[arg(long, default_value_t = FLAG_BAD, allow_negative_numbers = true)]
    pub flag_bad: i64,

    /// Write the parsed document back out as a GPR file.
    #[arg(long)]
    pub rewrite: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ControlModeArg {
    Simple,
    Tally,
}

impl From<ControlModeArg> for ControlMode {
    fn from(arg: ControlModeArg) -> Self {
        match arg {
            ControlModeArg::Simple => ControlMode::Simple,
            ControlModeArg::Tally => ControlMode::Tally,
        }
    }
}
