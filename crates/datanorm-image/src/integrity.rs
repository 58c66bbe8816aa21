// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output integrity — SHA-256 digests of written JPEGs.

use std::path::Path;

use datanorm_core::error::DatanormError;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// Recorded for every converted file so two runs over the same input can be
/// compared file by file.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Verify that `data` matches the expected SHA-256 hex digest.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<(), DatanormError> {
    let actual = hash_bytes(data);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(DatanormError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}

/// Re-read a written output file and check it against its recorded digest.
pub fn verify_output(path: impl AsRef<Path>, expected_hex: &str) -> Result<(), DatanormError> {
    let data = std::fs::read(path.as_ref())?;
    verify_hash(&data, expected_hex)
}
