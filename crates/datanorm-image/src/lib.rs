// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// datanorm-image — Image normalization for the Datanorm dataset tool.
//
// Provides the single-file transform (decode, RGB flattening, bounded or exact
// resize, JPEG encoding), the dataset walker that applies it to every class
// directory with sequential output naming, output digests, and JSON run
// reports.

pub mod dataset;
pub mod image;
pub mod integrity;
pub mod normalize;
pub mod report;

// Re-export the primary entry points so callers can use `datanorm_image::DatasetWalker` etc.
pub use dataset::{DatasetWalker, normalize_dataset};
pub use crate::image::processor::ImageProcessor;
pub use integrity::{hash_bytes, verify_output};
pub use normalize::{NormalizedImage, normalize_image};
