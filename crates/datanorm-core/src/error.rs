// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Datanorm.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Datanorm operations.
#[derive(Debug, Error)]
pub enum DatanormError {
    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    // -- Dataset layout --
    #[error("class directory not found: {}", .0.display())]
    MissingClassDir(PathBuf),

    // -- Image pipeline --
    #[error("image processing failed: {0}")]
    Image(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DatanormError>;
