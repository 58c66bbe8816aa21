// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dataset walker — drives the per-file transform over every configured class
// and collects the outcomes into a `RunReport`.
//
// Processing is strictly sequential. Per-file failures are logged and
// recorded, never fatal; only config, layout and output-tree errors abort.

use std::fs;
use std::path::Path;

use chrono::Utc;
use datanorm_core::config::NormalizeConfig;
use datanorm_core::error::{DatanormError, Result};
use datanorm_core::types::{
    ClassReport, FileOutcome, Numbering, RunId, RunReport, SkipReason, output_file_name,
};
use tracing::{debug, info, instrument, warn};

use super::listing::{ClassEntry, list_class_dir};
use crate::normalize::normalize_image;

/// Walks the input dataset and writes the normalized output tree.
pub struct DatasetWalker {
    config: NormalizeConfig,
}

impl DatasetWalker {
    /// Validate `config` and build a walker for it.
    pub fn new(config: NormalizeConfig) -> Result<Self> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    /// Run once over all classes.
    ///
    /// Missing class directories are checked before the output root is
    /// wiped, so a misconfigured run leaves the previous output intact.
    #[instrument(skip_all, fields(
        input = %self.config.input_root.display(),
        output = %self.config.output_root.display(),
        policy = %self.config.resize,
    ))]
    pub fn run(&self) -> Result<RunReport> {
        let mut report = RunReport {
            id: RunId::new(),
            started_at: Utc::now(),
            finished_at: None,
            input_root: self.config.input_root.clone(),
            output_root: self.config.output_root.clone(),
            policy: self.config.resize,
            quality: self.config.quality,
            classes: Vec::with_capacity(self.config.classes.len()),
        };
        info!(run = %report.id, "Normalization started");

        if !self.config.skip_missing_classes {
            for class in &self.config.classes {
                let dir = self.config.input_class_dir(class);
                if !dir.is_dir() {
                    return Err(DatanormError::MissingClassDir(dir));
                }
            }
        }

        self.prepare_output()?;

        for class in &self.config.classes {
            let class_report = self.process_class(class)?;
            if class_report.present {
                info!(
                    class = %class,
                    converted = class_report.converted(),
                    failed = class_report.failed(),
                    skipped = class_report.skipped(),
                    "{class}: {} images normalized",
                    class_report.converted()
                );
            }
            report.classes.push(class_report);
        }

        report.finished_at = Some(Utc::now());
        info!(
            run = %report.id,
            converted = report.total_converted(),
            failed = report.total_failed(),
            skipped = report.total_skipped(),
            "Normalization completed"
        );

        if let Some(path) = &self.config.report_path {
            crate::report::save(&report, path)?;
        }

        Ok(report)
    }

    /// Wipe (if configured) and recreate the output root and class dirs.
    fn prepare_output(&self) -> Result<()> {
        let root = &self.config.output_root;
        if self.config.clean_output && root.exists() {
            info!(path = %root.display(), "Removing previous output");
            fs::remove_dir_all(root)?;
        }
        fs::create_dir_all(root)?;
        for class in &self.config.classes {
            fs::create_dir_all(self.config.output_class_dir(class))?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn process_class(&self, class: &str) -> Result<ClassReport> {
        let input_dir = self.config.input_class_dir(class);
        let output_dir = self.config.output_class_dir(class);

        let entries = match list_class_dir(&input_dir) {
            Ok(entries) => entries,
            Err(DatanormError::MissingClassDir(dir)) if self.config.skip_missing_classes => {
                warn!(class, dir = %dir.display(), "Class directory missing, skipping");
                return Ok(ClassReport::missing(class));
            }
            Err(err) => return Err(err),
        };

        let mut report = ClassReport::new(class);
        let mut sequence: u32 = 1;
        for entry in entries {
            let outcome = self.process_entry(class, &entry, &output_dir, sequence);
            match (&outcome, self.config.numbering) {
                (FileOutcome::Converted { .. }, _) => sequence += 1,
                (FileOutcome::Failed { .. }, Numbering::Gapped) => sequence += 1,
                _ => {}
            }
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    fn process_entry(
        &self,
        class: &str,
        entry: &ClassEntry,
        output_dir: &Path,
        sequence: u32,
    ) -> FileOutcome {
        let source = entry.path.clone();

        if !self.config.accepts(&entry.name_lossy()) {
            debug!(path = %source.display(), "Extension not allowed, skipping");
            return FileOutcome::Skipped {
                source,
                reason: SkipReason::Extension,
            };
        }
        if !entry.is_file {
            debug!(path = %source.display(), "Not a regular file, skipping");
            return FileOutcome::Skipped {
                source,
                reason: SkipReason::NotAFile,
            };
        }

        let output = output_dir.join(output_file_name(class, sequence));
        match normalize_image(&source, &output, self.config.resize, self.config.quality) {
            Ok(normalized) => FileOutcome::Converted {
                source,
                output,
                sequence,
                original: normalized.original,
                normalized: normalized.normalized,
                bytes: normalized.bytes,
                sha256: normalized.sha256,
            },
            Err(err) => {
                warn!(path = %source.display(), error = %err, "Image could not be normalized");
                FileOutcome::Failed {
                    source,
                    sequence: match self.config.numbering {
                        Numbering::Gapped => Some(sequence),
                        Numbering::Dense => None,
                    },
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// Validate `config` and run it once.
pub fn normalize_dataset(config: NormalizeConfig) -> Result<RunReport> {
    DatasetWalker::new(config)?.run()
}
