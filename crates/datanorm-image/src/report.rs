// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON persistence for run reports.

use std::path::Path;

use datanorm_core::error::Result;
use datanorm_core::types::RunReport;
use tracing::info;

/// Write `report` as pretty-printed JSON, creating parent directories.
pub fn save(report: &RunReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), run = %report.id, "Run report written");
    Ok(())
}

/// Read a report previously written by [`save`].
pub fn load(path: impl AsRef<Path>) -> Result<RunReport> {
    let text = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use datanorm_core::error::DatanormError;
    use datanorm_core::types::{ClassReport, FileOutcome, ResizePolicy, RunId, SkipReason};

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/nested/run.json");

        let mut class = ClassReport::new("not_amora");
        class.outcomes.push(FileOutcome::Skipped {
            source: "dataset/not_amora/a.gif".into(),
            reason: SkipReason::Extension,
        });
        let report = RunReport {
            id: RunId::new(),
            started_at: Utc::now(),
            finished_at: Some(Utc::now()),
            input_root: "dataset".into(),
            output_root: "dataset_compressed".into(),
            policy: ResizePolicy::Bounded { max_side: 600 },
            quality: 70,
            classes: vec![class],
        };

        save(&report, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#""status": "skipped""#));
        assert!(text.contains(r#""reason": "extension""#));
        assert_eq!(load(&path).unwrap(), report);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path), Err(DatanormError::Serialization(_))));
    }
}
