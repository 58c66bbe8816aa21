// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Environment-aware configuration resolution.
//
// The binary takes no arguments. `DATANORM_CONFIG` names a JSON config file
// and wins if set; otherwise `DATANORM_PRESET` picks a compiled-in preset,
// defaulting to `compress`.

use std::path::PathBuf;

use datanorm_core::NormalizeConfig;
use datanorm_core::error::Result;

pub const CONFIG_ENV: &str = "DATANORM_CONFIG";
pub const PRESET_ENV: &str = "DATANORM_PRESET";

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Preset(String),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "file {}", path.display()),
            ConfigSource::Preset(name) => write!(f, "preset {name}"),
        }
    }
}

/// Resolve the configuration from the process environment.
pub fn from_env() -> Result<(NormalizeConfig, ConfigSource)> {
    resolve(|key| std::env::var(key).ok())
}

/// Resolve the configuration using `lookup` for variable access.
pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<(NormalizeConfig, ConfigSource)> {
    let set = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(path) = set(CONFIG_ENV) {
        let path = PathBuf::from(path);
        let config = NormalizeConfig::from_json_file(&path)?;
        return Ok((config, ConfigSource::File(path)));
    }

    let preset = set(PRESET_ENV).unwrap_or_else(|| "compress".to_owned());
    let config = NormalizeConfig::preset(&preset)?;
    Ok((config, ConfigSource::Preset(preset.trim().to_ascii_lowercase())))
}
