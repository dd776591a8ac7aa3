// ========================================================================================
//
//                         THE SCORED STATE SET RECORD READER
//
// ========================================================================================
//
// ### Purpose ###
//
// This module owns the on-disk layout of `.sstd` files. Its sole responsibility is to
// turn the raw bytes of a file into an ordered `Vec<Record>`, and nothing else. The
// layout is a flat array of 25-byte records with no header and no padding:
//
//   offset  size  field
//   ------  ----  ------------------------------------------------------------------
//        0     1  scheme_state   (nonzero = true)
//        1     8  probability    (IEEE-754 binary64, little-endian)
//        9     8  sv1            (one byte per element, index 0 first)
//       17     8  sv2            (one byte per element, index 0 first)
//
// Field offsets are fixed here rather than inferred from a struct layout, because
// the producer writes a packed array and Rust is free to pad `Record`.

use crate::types::{MalformedReason, Record, STATE_VECTOR_LEN, SstdError, StateVector};
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const SCHEME_STATE_OFFSET: usize = 0;
pub const PROBABILITY_OFFSET: usize = 1;
pub const SV1_OFFSET: usize = PROBABILITY_OFFSET + 8;
pub const SV2_OFFSET: usize = SV1_OFFSET + STATE_VECTOR_LEN;

/// The encoded size of one record, in bytes.
pub const RECORD_SIZE: usize = SV2_OFFSET + STATE_VECTOR_LEN;

// ========================================================================================
//                                  RECORD CODEC
// ========================================================================================

impl Record {
    /// Decodes one record from exactly `RECORD_SIZE` bytes.
    pub fn decode(raw: &[u8; RECORD_SIZE]) -> Self {
        let mut probability = [0u8; 8];
        probability.copy_from_slice(&raw[PROBABILITY_OFFSET..SV1_OFFSET]);

        Self {
            scheme_state: raw[SCHEME_STATE_OFFSET] != 0,
            probability: f64::from_le_bytes(probability),
            sv1: decode_state_vector(&raw[SV1_OFFSET..SV2_OFFSET]),
            sv2: decode_state_vector(&raw[SV2_OFFSET..RECORD_SIZE]),
        }
    }

    /// Encodes the record in the canonical form: booleans become `0x00` or `0x01`.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut raw = [0u8; RECORD_SIZE];
        raw[SCHEME_STATE_OFFSET] = u8::from(self.scheme_state);
        raw[PROBABILITY_OFFSET..SV1_OFFSET].copy_from_slice(&self.probability.to_le_bytes());
        encode_state_vector(&self.sv1, &mut raw[SV1_OFFSET..SV2_OFFSET]);
        encode_state_vector(&self.sv2, &mut raw[SV2_OFFSET..RECORD_SIZE]);
        raw
    }
}

fn decode_state_vector(bytes: &[u8]) -> StateVector {
    let mut states = [false; STATE_VECTOR_LEN];
    for (state, &byte) in states.iter_mut().zip(bytes) {
        *state = byte != 0;
    }
    StateVector::new(states)
}

fn encode_state_vector(sv: &StateVector, out: &mut [u8]) {
    for (byte, &state) in out.iter_mut().zip(sv.as_array()) {
        *byte = u8::from(state);
    }
}

// ========================================================================================
//                                   PUBLIC API
// ========================================================================================

/// Decodes an in-memory `.sstd` image. File order is preserved.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<Record>, MalformedReason> {
    let remainder = bytes.len() % RECORD_SIZE;
    if remainder != 0 {
        return Err(MalformedReason::TrailingBytes {
            len: bytes.len(),
            remainder,
        });
    }

    let mut raw = [0u8; RECORD_SIZE];
    let records = bytes
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| {
            raw.copy_from_slice(chunk);
            Record::decode(&raw)
        })
        .collect();
    Ok(records)
}

/// Reads the whole file into memory and decodes it.
pub fn read_records(path: &Path) -> Result<Vec<Record>, SstdError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SstdError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => SstdError::MalformedInput {
            path: path.to_path_buf(),
            reason: MalformedReason::Unreadable(e),
        },
    })?;

    let records = decode_records(&bytes).map_err(|reason| SstdError::MalformedInput {
        path: path.to_path_buf(),
        reason,
    })?;

    debug!(
        "Decoded {} records ({} bytes) from '{}'",
        records.len(),
        bytes.len(),
        path.display()
    );
    Ok(records)
}

/// Writes records in the `.sstd` layout, replacing any existing file.
pub fn write_records(path: &Path, records: &[Record]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        writer.write_all(&record.encode())?;
    }
    writer.flush()
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::{NamedTempFile, tempdir};

    fn sv(states: [bool; STATE_VECTOR_LEN]) -> StateVector {
        StateVector::new(states)
    }

    fn scenario_records() -> Vec<Record> {
        vec![
            Record {
                scheme_state: true,
                probability: 0.5,
                sv1: sv([true, false, false, false, false, false, false, false]),
                sv2: StateVector::default(),
            },
            Record {
                scheme_state: false,
                probability: 1.25,
                sv1: StateVector::default(),
                sv2: sv([true, true, false, false, false, false, false, false]),
            },
        ]
    }

    fn write_bytes(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(bytes).expect("write fixture");
        file.flush().expect("flush fixture");
        file
    }

    #[test]
    fn record_size_is_packed() {
        assert_eq!(RECORD_SIZE, 25);
        assert_eq!(SV1_OFFSET, 9);
        assert_eq!(SV2_OFFSET, 17);
    }

    #[test]
    fn decode_reads_fields_at_fixed_offsets() {
        let mut raw = [0u8; RECORD_SIZE];
        raw[0] = 1;
        raw[1..9].copy_from_slice(&0.75f64.to_le_bytes());
        raw[9] = 1;
        raw[16] = 1;
        raw[18] = 1;

        let record = Record::decode(&raw);
        assert!(record.scheme_state);
        assert_abs_diff_eq!(record.probability, 0.75);
        assert_eq!(record.sv1.to_string(), "10000001");
        assert_eq!(record.sv2.to_string(), "01000000");
    }

    #[test]
    fn any_nonzero_byte_decodes_as_true() {
        let mut raw = [0u8; RECORD_SIZE];
        raw[SCHEME_STATE_OFFSET] = 0xFF;
        raw[SV2_OFFSET + 7] = 0x02;

        let record = Record::decode(&raw);
        assert!(record.scheme_state);
        assert_eq!(record.sv2.get(7), Some(true));
        assert_eq!(record.sv2.true_count(), 1);
    }

    #[test]
    fn decode_then_encode_is_byte_identical() {
        let bytes: Vec<u8> = scenario_records()
            .iter()
            .flat_map(|record| record.encode())
            .collect();

        let decoded = decode_records(&bytes).unwrap();
        assert_eq!(decoded, scenario_records());

        let reencoded: Vec<u8> = decoded.iter().flat_map(|record| record.encode()).collect();
        assert_eq!(reencoded, bytes);
    }

    #[test]
    fn read_records_preserves_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("two.sstd");
        write_records(&path, &scenario_records()).unwrap();

        assert_eq!(fs::metadata(&path).unwrap().len(), 2 * RECORD_SIZE as u64);
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].scheme_state);
        assert_abs_diff_eq!(records[0].probability, 0.5);
        assert!(!records[1].scheme_state);
        assert_abs_diff_eq!(records[1].probability, 1.25);
        assert_eq!(records[1].sv2.to_string(), "11000000");
    }

    #[test]
    fn empty_file_yields_no_records() {
        let file = write_bytes(&[]);
        let records = read_records(file.path()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn trailing_partial_record_is_malformed() {
        let mut bytes = scenario_records()[0].encode().to_vec();
        bytes.extend_from_slice(&[0u8; RECORD_SIZE / 2]);
        assert_eq!(bytes.len(), 37);

        let file = write_bytes(&bytes);
        let err = read_records(file.path()).unwrap_err();
        assert!(err.is_malformed(), "expected MalformedInput, got {err:?}");
        match err {
            SstdError::MalformedInput {
                reason: MalformedReason::TrailingBytes { len, remainder },
                ..
            } => {
                assert_eq!(len, 37);
                assert_eq!(remainder, 12);
            }
            other => panic!("Expected TrailingBytes, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_reported_by_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.sstd");

        let err = read_records(&path).unwrap_err();
        assert!(err.is_file_not_found(), "expected FileNotFound, got {err:?}");
        assert!(err.to_string().contains("absent.sstd"));
    }

    #[test]
    fn directory_is_malformed_not_missing() {
        let dir = tempdir().unwrap();
        let err = read_records(dir.path()).unwrap_err();
        assert!(err.is_malformed(), "expected MalformedInput, got {err:?}");
        match &err {
            SstdError::MalformedInput {
                reason: MalformedReason::Unreadable(_),
                ..
            } => assert!(err.to_string().contains("could not be read")),
            other => panic!("Expected Unreadable, got {other:?}"),
        }
    }
}
