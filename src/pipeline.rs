// ========================================================================================
//
//                              THE REPORT PIPELINE
//
// ========================================================================================
//
// Reader -> Flattener -> Kernel, strictly in that order. `run` does all of the work and
// returns a finished `Report`; nothing is written until the caller asks for it, so a
// failure anywhere leaves standard output untouched.

use crate::io;
use crate::kernel;
use crate::reformat;
use crate::types::{PartitionSums, SstdError};
use log::{info, warn};
use polars::prelude::*;
use std::io::Write;
use std::path::Path;

/// How far the total probability mass may drift from one before it is reported.
pub const MASS_TOLERANCE: f64 = 1e-5;

/// Everything the binary prints. `write_report` renders every row and column of
/// `table`; polars' `Display` would truncate it.
#[derive(Debug)]
pub struct Report {
    pub table: DataFrame,
    pub sums: PartitionSums,
}

/// Runs the whole pipeline for the file at `path`.
pub fn run(path: &Path) -> Result<Report, SstdError> {
    let records = io::read_records(path)?;
    info!(
        "Loaded {} records from '{}'",
        records.len(),
        path.display()
    );

    let degraded = kernel::count_degraded_reconfigurations(&records);
    if degraded > 0 {
        warn!(
            "{degraded} of {} records lose working elements after reconfiguration",
            records.len()
        );
    }

    let table = reformat::flatten_records(&records)?;
    let sums = kernel::partition_sums(&table)?;
    info!(
        "Probability mass: scheme_state=true {}, scheme_state=false {}",
        sums.sum_true, sums.sum_false
    );

    if !records.is_empty() && !sums.is_normalized(MASS_TOLERANCE) {
        warn!(
            "Total probability mass is {}, not 1; the state set may be incomplete",
            sums.total()
        );
    }

    Ok(Report { table, sums })
}

/// Writes the whole table as tab-separated text (header line, then one line per row),
/// followed by the true-state and false-state sums, one per line.
pub fn write_report<W: Write>(report: &Report, mut out: W) -> Result<(), SstdError> {
    let mut table = report.table.clone();
    CsvWriter::new(&mut out)
        .include_header(true)
        .with_separator(b'\t')
        .finish(&mut table)?;

    let mut buffer = ryu::Buffer::new();
    writeln!(out, "{}", buffer.format(report.sums.sum_true))?;
    writeln!(out, "{}", buffer.format(report.sums.sum_false))?;
    out.flush()?;
    Ok(())
}
