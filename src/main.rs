mod cli;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod table;

use std::fs;
use std::path::Path;

use clap::Parser;

use crate::cli::{Cli, Commands, ControlsArgs, GridArgs, InspectArgs, RunArgs};
use crate::input::controls::{load_controls, tally_controls, tally_to_table};
use crate::input::gpr::GprDocument;
use crate::input::poolmap::{PoolMap, summary_path, top_path};
use crate::input::discover_gpr_files;
use crate::pipeline::stage5_gpr_file::process_gpr_file;
use crate::pipeline::stage7_intersect::deconv_pools;
use crate::report::grid::make_grid_for_dir;
use crate::report::text::render_inspect_text;
use crate::report::{RunSummary, SUMMARY_JSON_FILENAME, write_summary_json};
use crate::table::DEFAULT_SEPARATOR;

const CONTROL_DICT_FILENAME: &str = "control_dict.txt";
const ID_TO_NAMES_FILENAME: &str = "id_to_names.txt";

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Controls(args) => controls(&args),
        Commands::Grid(args) => grid(&args),
        Commands::Inspect(args) => inspect(&args),
    }
}

fn run(args: &RunArgs) -> Result<(), String> {
    let params = args.params();
    let results_dir = args.results_dir.as_path();
    if !results_dir.exists() {
        tracing::info!(dir = %results_dir.display(), "making results directory");
        fs::create_dir_all(results_dir).map_err(|e| e.to_string())?;
    }
    let mut summary = RunSummary::new(&args.data_dir, results_dir, &params);

    let controls = match &args.control_file {
        Some(path) => {
            let loaded = load_controls(path, args.control_mode.into()).map_err(|e| e.to_string())?;
            loaded
                .controls
                .write(&results_dir.join(CONTROL_DICT_FILENAME))
                .map_err(|e| e.to_string())?;
            if let Some(id_to_names) = &loaded.id_to_names {
                id_to_names
                    .write(
                        &results_dir.join(ID_TO_NAMES_FILENAME),
                        None,
                        None,
                        DEFAULT_SEPARATOR,
                    )
                    .map_err(|e| e.to_string())?;
            }
            if loaded.controls.is_empty() {
                tracing::warn!(path = %path.display(), "control list has no pairs");
            }
            summary.control_pairs = Some(loaded.controls.len());
            Some(loaded.controls)
        }
        None => None,
    };

    if !args.skip_gpr {
        let files = discover_gpr_files(&args.data_dir).map_err(|e| e.to_string())?;
        tracing::info!(dir = %args.data_dir.display(), files = files.len(), "gpr files found");
        for file in &files {
            let file_summary = process_gpr_file(
                &file.path,
                &top_path(results_dir, &file.base),
                &summary_path(results_dir, &file.base),
                &params,
                controls.as_ref(),
            )
            .map_err(|e| e.to_string())?;
            summary.files.push(file_summary);
        }
    }

    let map_path = results_dir.join(&args.map_filename);
    if args.create_map {
        let files = discover_gpr_files(&args.data_dir).map_err(|e| e.to_string())?;
        let map = PoolMap::from_gpr_files(&files);
        map.write(&map_path).map_err(|e| e.to_string())?;
    }

    if !args.skip_deconv {
        let map = PoolMap::from_file(&map_path).map_err(|e| e.to_string())?;
        let deconv = deconv_pools(results_dir, &map, params.z_threshold)
            .map_err(|e| e.to_string())?;
        summary.deconvolution = Some(deconv);
    }

    write_summary_json(&summary, &results_dir.join(SUMMARY_JSON_FILENAME))
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn controls(args: &ControlsArgs) -> Result<(), String> {
    let files = discover_gpr_files(&args.data_dir).map_err(|e| e.to_string())?;
    let tally = tally_controls(&files, args.flag_bad).map_err(|e| e.to_string())?;
    tally_to_table(&tally)
        .and_then(|t| t.write(&args.out, None, None, DEFAULT_SEPARATOR))
        .map_err(|e| e.to_string())
}

fn grid(args: &GridArgs) -> Result<(), String> {
    let written = make_grid_for_dir(&args.results_dir).map_err(|e| e.to_string())?;
    if written.is_empty() {
        tracing::warn!(dir = %args.results_dir.display(), "no intersection_hit files found");
    }
    Ok(())
}

fn inspect(args: &InspectArgs) -> Result<(), String> {
    let gpr = GprDocument::from_file(&args.gpr).map_err(|e| e.to_string())?;
    let text = render_inspect_text(&gpr, args.flag_bad).map_err(|e| e.to_string())?;
    print_header(&gpr, &args.gpr);
    print!("{text}");
    if let Some(out) = &args.rewrite {
        gpr.write_document(out).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn print_header(gpr: &GprDocument, path: &Path) {
    println!("{}", path.display());
    println!("{} {}", gpr.file_type, gpr.version_number);
    if let Some(kind) = gpr.header("Type") {
        println!("type {kind}");
    }
    println!("rows {} columns {} headers {}", gpr.n_row(), gpr.n_column(), gpr.n_header());
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
