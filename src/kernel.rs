// ========================================================================================
//
//                          THE PARTITIONED SUMMATION KERNEL
//
// ========================================================================================
//
// ### Purpose ###
//
// This module is the computational heart of the report. It partitions the flattened
// table by `scheme_state` and sums `probability` within each partition.
//
// ### Summation Order ###
//
// Floating-point addition is not associative, so the order is part of the contract:
// probabilities are added one at a time, in row order, into a single accumulator per
// partition. Polars' own `sum()` makes no such promise for chunked columns.

use crate::reformat::{PROBABILITY_COLUMN, SCHEME_STATE_COLUMN};
use crate::types::{PartitionSums, Record, SstdError};
use polars::prelude::*;

/// Sums `probability` over the rows where `scheme_state` is true and, separately,
/// where it is false. An empty partition sums to `0.0`.
pub fn partition_sums(table: &DataFrame) -> Result<PartitionSums, SstdError> {
    let flags = table.column(SCHEME_STATE_COLUMN)?.bool()?;
    let probabilities = table.column(PROBABILITY_COLUMN)?.f64()?;

    let mut sums = PartitionSums::default();
    for (flag, probability) in flags.into_iter().zip(probabilities.into_iter()) {
        match (flag, probability) {
            (Some(flag), Some(probability)) => sums.add(flag, probability),
            (None, _) => {
                return Err(SstdError::NullValue {
                    column: SCHEME_STATE_COLUMN.to_string(),
                });
            }
            (_, None) => {
                return Err(SstdError::NullValue {
                    column: PROBABILITY_COLUMN.to_string(),
                });
            }
        }
    }
    Ok(sums)
}

/// Counts records whose reconfigured state vector has fewer working elements than the
/// state it was derived from. Reconfiguration only ever moves load onto working
/// elements, so any such record points at a producer defect.
pub fn count_degraded_reconfigurations(records: &[Record]) -> usize {
    records
        .iter()
        .filter(|r| r.sv2.true_count() < r.sv1.true_count())
        .count()
}
