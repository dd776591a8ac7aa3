// ========================================================================================
//
//                         RECORD FLATTENING INTO A SCALAR TABLE
//
// ========================================================================================
//
// This module turns decoded records into a `polars` `DataFrame` with one scalar column
// per field. The two state vectors are expanded positionally, so element `i` of `sv1`
// becomes the boolean column `sv1_i`. It never filters or reorders rows.

use crate::types::{Record, STATE_VECTOR_LEN, SstdError, StateVector};
use polars::prelude::*;

pub const SCHEME_STATE_COLUMN: &str = "scheme_state";
pub const PROBABILITY_COLUMN: &str = "probability";
pub const SV1_PREFIX: &str = "sv1";
pub const SV2_PREFIX: &str = "sv2";

/// The name of the column holding element `index` of a state vector.
pub fn state_column_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index}")
}

/// Every column of the flattened table, in table order.
pub fn flat_column_names() -> Vec<String> {
    let mut names = Vec::with_capacity(2 + 2 * STATE_VECTOR_LEN);
    names.push(SCHEME_STATE_COLUMN.to_string());
    names.push(PROBABILITY_COLUMN.to_string());
    for i in 0..STATE_VECTOR_LEN {
        names.push(state_column_name(SV1_PREFIX, i));
        names.push(state_column_name(SV2_PREFIX, i));
    }
    names
}

/// Builds the flattened table: `scheme_state`, `probability`, then `sv1_i` and `sv2_i`
/// interleaved for each element index.
pub fn flatten_records(records: &[Record]) -> Result<DataFrame, SstdError> {
    let scheme_states: Vec<bool> = records.iter().map(|r| r.scheme_state).collect();
    let probabilities: Vec<f64> = records.iter().map(|r| r.probability).collect();

    let mut columns = Vec::with_capacity(2 + 2 * STATE_VECTOR_LEN);
    columns.push(Column::new(SCHEME_STATE_COLUMN.into(), scheme_states));
    columns.push(Column::new(PROBABILITY_COLUMN.into(), probabilities));

    for i in 0..STATE_VECTOR_LEN {
        columns.push(state_column(records, SV1_PREFIX, i, |r| &r.sv1));
        columns.push(state_column(records, SV2_PREFIX, i, |r| &r.sv2));
    }

    Ok(DataFrame::new(columns)?)
}

fn state_column<F>(records: &[Record], prefix: &str, index: usize, select: F) -> Column
where
    F: Fn(&Record) -> &StateVector,
{
    let values: Vec<bool> = records
        .iter()
        .map(|r| select(r).as_array()[index])
        .collect();
    Column::new(state_column_name(prefix, index).into(), values)
}
