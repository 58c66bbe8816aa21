// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Datanorm dataset normalizer.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a normalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How images are brought to their target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Downscale so neither side exceeds `max_side`, keeping aspect ratio.
    /// Images already within the bound are left at their size.
    Bounded { max_side: u32 },
    /// Force exactly `width` x `height`, distorting if the aspect differs.
    Exact { width: u32, height: u32 },
}

impl ResizePolicy {
    /// Dimensions an image of `width` x `height` will have after the policy.
    ///
    /// Mirrors the arithmetic of `image::DynamicImage::resize`: the scale
    /// factor is the smaller of the two side ratios and each side is
    /// rounded, never dropping below one pixel.
    pub fn target_dimensions(&self, width: u32, height: u32) -> Dimensions {
        match *self {
            ResizePolicy::Exact { width, height } => Dimensions { width, height },
            ResizePolicy::Bounded { max_side } => {
                if width <= max_side && height <= max_side {
                    return Dimensions { width, height };
                }
                let ratio = f64::min(
                    max_side as f64 / width as f64,
                    max_side as f64 / height as f64,
                );
                let scale = |side: u32| ((side as f64 * ratio).round() as u32).max(1);
                Dimensions {
                    width: scale(width),
                    height: scale(height),
                }
            }
        }
    }
}

impl std::fmt::Display for ResizePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResizePolicy::Bounded { max_side } => write!(f, "bounded({max_side})"),
            ResizePolicy::Exact { width, height } => write!(f, "exact({width}x{height})"),
        }
    }
}

/// When the per-class sequence number advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Numbering {
    /// Only successful conversions take a number; output names have no gaps.
    #[default]
    Dense,
    /// Every attempted file takes a number, so failures leave gaps.
    Gapped,
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Why an input entry was passed over without an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// File name does not end in an allowed extension.
    Extension,
    /// Entry is a directory, socket, or anything else that is not a file.
    NotAFile,
}

/// Result of handling a single input entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted {
        source: PathBuf,
        output: PathBuf,
        sequence: u32,
        original: Dimensions,
        normalized: Dimensions,
        bytes: u64,
        /// Lowercase hex SHA-256 of the written JPEG.
        sha256: String,
    },
    Skipped {
        source: PathBuf,
        reason: SkipReason,
    },
    Failed {
        source: PathBuf,
        /// Sequence number consumed by the attempt (gapped numbering only).
        sequence: Option<u32>,
        reason: String,
    },
}

impl FileOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, FileOutcome::Converted { .. })
    }
}

/// Per-class outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: String,
    /// False when the input class directory was missing and skipped.
    pub present: bool,
    pub outcomes: Vec<FileOutcome>,
}

impl ClassReport {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            present: true,
            outcomes: Vec::new(),
        }
    }

    /// Report for a class whose input directory does not exist.
    pub fn missing(class: impl Into<String>) -> Self {
        Self {
            present: false,
            ..Self::new(class)
        }
    }

    /// Number of files written to the output tree.
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Skipped { .. }))
            .count()
    }

    /// Files the transform was run on, whatever the result.
    pub fn attempted(&self) -> usize {
        self.converted() + self.failed()
    }
}

/// Structured report for one full run over all classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub policy: ResizePolicy,
    pub quality: u8,
    pub classes: Vec<ClassReport>,
}

impl RunReport {
    pub fn total_converted(&self) -> usize {
        self.classes.iter().map(ClassReport::converted).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.classes.iter().map(ClassReport::failed).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.classes.iter().map(ClassReport::skipped).sum()
    }

    /// True if any file failed or any class directory was missing.
    pub fn has_failures(&self) -> bool {
        self.total_failed() > 0 || self.classes.iter().any(|c| !c.present)
    }

    pub fn class(&self, name: &str) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.class == name)
    }
}

/// File name for the `sequence`-th output image of `class`.
pub fn output_file_name(class: &str, sequence: u32) -> String {
    format!("{class}_{sequence:04}.jpg")
}
