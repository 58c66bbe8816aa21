// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Datanorm — normalize a labeled image dataset into sequentially numbered JPEGs.
//
// Entry point. Initialises logging, resolves the configuration from the
// environment, runs the dataset walker, and maps the run report to an exit
// code.

mod services;

use std::process::ExitCode;

use datanorm_core::RunReport;
use datanorm_image::DatasetWalker;

/// Exit code for a completed run that had failures while `strict` is set.
const EXIT_STRICT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, source) = match services::settings::from_env() {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(error = %e, "could not load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%source, "Datanorm starting");

    let strict = config.strict;
    let report = match DatasetWalker::new(config).and_then(|walker| walker.run()) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "normalization aborted");
            return ExitCode::FAILURE;
        }
    };

    exit_code(&report, strict)
}

/// A finished run exits 0 even with per-file failures, unless `strict`.
fn exit_code(report: &RunReport, strict: bool) -> ExitCode {
    if strict && report.has_failures() {
        tracing::warn!(
            failed = report.total_failed(),
            "run finished with failures in strict mode"
        );
        ExitCode::from(EXIT_STRICT_FAILURE)
    } else {
        ExitCode::SUCCESS
    }
}
