// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-file transform: decode, flatten to RGB, resize, encode JPEG, write.
//
// Encoding finishes in memory before the destination is touched, so a file
// that fails at any step leaves nothing behind.

use std::path::Path;

use datanorm_core::error::Result;
use datanorm_core::types::{Dimensions, ResizePolicy};
use tracing::{debug, instrument};

use crate::image::ImageProcessor;
use crate::integrity::hash_bytes;

/// What a successful transform produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub original: Dimensions,
    pub normalized: Dimensions,
    /// Size of the written JPEG.
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the written JPEG.
    pub sha256: String,
}

/// Encode `source` as a normalized JPEG, returning the bytes without writing.
pub fn encode_normalized(
    source: &Path,
    policy: ResizePolicy,
    quality: u8,
) -> Result<(Vec<u8>, Dimensions, Dimensions)> {
    let processor = ImageProcessor::open(source)?;
    let original = processor.dimensions();
    let processor = processor.to_rgb().resize(policy);
    let normalized = processor.dimensions();
    let jpeg = processor.to_jpeg_bytes(quality)?;
    Ok((jpeg, original, normalized))
}

/// Normalize one image file and write it to `destination`.
///
/// The destination is overwritten if it exists. Its parent directory must
/// already exist.
#[instrument(skip_all, fields(source = %source.display(), destination = %destination.display()))]
pub fn normalize_image(
    source: &Path,
    destination: &Path,
    policy: ResizePolicy,
    quality: u8,
) -> Result<NormalizedImage> {
    let (jpeg, original, normalized) = encode_normalized(source, policy, quality)?;
    std::fs::write(destination, &jpeg)?;

    debug!(
        %original,
        %normalized,
        bytes = jpeg.len(),
        "Image normalized"
    );

    Ok(NormalizedImage {
        original,
        normalized,
        bytes: jpeg.len() as u64,
        sha256: hash_bytes(&jpeg),
    })
}
