// ========================================================================================
//
//                      THE ORCHESTRATOR: SSTD-REPORT
//
// ========================================================================================
//
// This binary owns the process lifecycle: argument parsing, logger setup, and the
// exit status. All data work happens in `pipeline::run`, which
// finishes before anything is printed, so a failing run prints nothing to stdout.

use clap::Parser;
use sstd_report::pipeline;
use std::io;
use std::path::PathBuf;
use std::process;

// ========================================================================================
//                           APPLICATION-LEVEL CONSTANTS
// ========================================================================================

/// The file written by the scheme reliability scorer, relative to the working directory.
const DEFAULT_INPUT_PATH: &str = "simple-scored-state-set.sstd";

// ========================================================================================
//                         COMMAND-LINE INTERFACE DEFINITION
// ========================================================================================

#[derive(Parser, Debug)]
#[clap(
    name = "sstd-report",
    version,
    about = "Prints a scored state set as a table and sums its probability mass by scheme state."
)]
struct Args {
    /// Path to the scored state set (.sstd) file.
    #[arg(value_name = "INPUT_PATH", default_value = DEFAULT_INPUT_PATH)]
    input_path: PathBuf,
}

// ========================================================================================
//                           THE MAIN ORCHESTRATION LOGIC
// ========================================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let report = match pipeline::run(&args.input_path) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = pipeline::write_report(&report, io::stdout().lock()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
