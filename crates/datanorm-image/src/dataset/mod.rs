// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dataset module — class directory listing and the sequential walker that
// turns an input dataset into a normalized output tree.

pub mod listing;
pub mod walker;

pub use listing::{ClassEntry, list_class_dir};
pub use walker::{DatasetWalker, normalize_dataset};
