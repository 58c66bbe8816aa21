// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Normalization run configuration and the compiled-in presets.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DatanormError, Result};
use crate::types::{Numbering, ResizePolicy};

/// Everything a normalization run depends on besides the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Dataset root holding one subdirectory per class.
    pub input_root: PathBuf,
    /// Root of the mirrored output tree.
    pub output_root: PathBuf,
    /// Class subdirectories to process, in order.
    pub classes: Vec<String>,
    /// Accepted file extensions, matched case-insensitively.
    pub extensions: Vec<String>,
    pub resize: ResizePolicy,
    /// JPEG quality factor (1-100).
    pub quality: u8,
    /// Delete the whole output root before the run.
    pub clean_output: bool,
    pub numbering: Numbering,
    /// Record a missing class directory as empty instead of aborting.
    pub skip_missing_classes: bool,
    /// Where to write the JSON run report, if anywhere.
    pub report_path: Option<PathBuf>,
    /// Treat any per-file failure as a failed run.
    pub strict: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self::compress()
    }
}

impl NormalizeConfig {
    /// Aspect-preserving compression: cap the long side at 600px, quality 70,
    /// wipe the output tree first so re-runs leave no stale files.
    pub fn compress() -> Self {
        Self {
            input_root: PathBuf::from("dataset"),
            output_root: PathBuf::from("dataset_compressed"),
            classes: default_classes(),
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into(), "webp".into()],
            resize: ResizePolicy::Bounded { max_side: 600 },
            quality: 70,
            clean_output: true,
            numbering: Numbering::Dense,
            skip_missing_classes: false,
            report_path: None,
            strict: false,
        }
    }

    /// Fixed-size training input: force 400x400, quality 90, merge into an
    /// existing output tree.
    pub fn preprocess() -> Self {
        Self {
            output_root: PathBuf::from("dataset_processed"),
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            resize: ResizePolicy::Exact {
                width: 400,
                height: 400,
            },
            quality: 90,
            clean_output: false,
            ..Self::compress()
        }
    }

    /// Look up a compiled-in preset by name.
    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "compress" => Ok(Self::compress()),
            "preprocess" => Ok(Self::preprocess()),
            other => Err(DatanormError::UnknownPreset(other.to_owned())),
        }
    }

    /// Load a configuration from a JSON file. Missing fields take the
    /// compress preset's values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Check the configuration and normalise the extension list.
    ///
    /// Extensions lose any leading dot, are lower-cased and deduplicated.
    /// The roots are compared after resolving symlinks and `..`, so the
    /// output wipe can never reach the input tree.
    pub fn validate(mut self) -> Result<Self> {
        if !(1..=100).contains(&self.quality) {
            return Err(DatanormError::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.quality
            )));
        }

        match self.resize {
            ResizePolicy::Bounded { max_side: 0 } => {
                return Err(DatanormError::Config(
                    "bounded resize needs a non-zero max_side".into(),
                ));
            }
            ResizePolicy::Exact { width, height } if width == 0 || height == 0 => {
                return Err(DatanormError::Config(format!(
                    "exact resize needs non-zero dimensions, got {width}x{height}"
                )));
            }
            _ => {}
        }

        if self.classes.is_empty() {
            return Err(DatanormError::Config("class list is empty".into()));
        }
        for (i, class) in self.classes.iter().enumerate() {
            if !is_plain_name(class) {
                return Err(DatanormError::Config(format!(
                    "class name {class:?} must be a single path component"
                )));
            }
            if self.classes[..i].contains(class) {
                return Err(DatanormError::Config(format!(
                    "class {class:?} is listed twice"
                )));
            }
        }

        let mut seen = HashSet::new();
        self.extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty() && seen.insert(ext.clone()))
            .collect();
        if self.extensions.is_empty() {
            return Err(DatanormError::Config("extension allow-list is empty".into()));
        }

        let input = resolve_root(&self.input_root)?;
        let output = resolve_root(&self.output_root)?;
        if output == input {
            return Err(DatanormError::Config(format!(
                "output root {} is the input root {}",
                self.output_root.display(),
                self.input_root.display()
            )));
        }
        if self.clean_output && (input.starts_with(&output) || output.starts_with(&input)) {
            return Err(DatanormError::Config(format!(
                "cleaning output root {} would delete files under input root {}",
                self.output_root.display(),
                self.input_root.display()
            )));
        }

        Ok(self)
    }

    /// Whether `file_name` ends in one of the allowed extensions.
    ///
    /// Compares against the whole lower-cased name, so a file called
    /// `.png` matches too.
    pub fn accepts(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.extensions.iter().any(|ext| {
            lower.len() > ext.len()
                && lower.ends_with(ext.as_str())
                && lower.as_bytes()[lower.len() - ext.len() - 1] == b'.'
        })
    }

    pub fn input_class_dir(&self, class: &str) -> PathBuf {
        self.input_root.join(class)
    }

    pub fn output_class_dir(&self, class: &str) -> PathBuf {
        self.output_root.join(class)
    }
}

fn default_classes() -> Vec<String> {
    vec!["amora".into(), "not_amora".into()]
}

/// Absolute form of `path` with symlinks and `.`/`..` resolved.
///
/// The longest existing prefix is canonicalized on disk; components past it
/// are applied lexically, since they do not exist yet.
fn resolve_root(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|err| {
        DatanormError::Config(format!("cannot resolve {}: {err}", path.display()))
    })?;

    let mut resolved = PathBuf::new();
    let mut on_disk = true;
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component),
            Component::CurDir => {}
            Component::ParentDir if !on_disk => {
                resolved.pop();
            }
            Component::ParentDir | Component::Normal(_) => {
                resolved.push(component);
                if on_disk {
                    match resolved.canonicalize() {
                        Ok(canonical) => resolved = canonical,
                        Err(_) => on_disk = false,
                    }
                }
            }
        }
    }
    Ok(resolved)
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_compress_preset() {
        let config = NormalizeConfig::default();
        assert_eq!(config.resize, ResizePolicy::Bounded { max_side: 600 });
        assert_eq!(config.quality, 70);
        assert!(config.clean_output);
        assert_eq!(config.classes, vec!["amora", "not_amora"]);
    }

    #[test]
    fn preprocess_preset_forces_square_output() {
        let config = NormalizeConfig::preset("Preprocess").unwrap();
        assert_eq!(
            config.resize,
            ResizePolicy::Exact {
                width: 400,
                height: 400
            }
        );
        assert_eq!(config.quality, 90);
        assert!(!config.clean_output);
        assert!(!config.extensions.iter().any(|e| e == "webp"));
    }

    #[test]
    fn unknown_preset_is_rejected() {
        match NormalizeConfig::preset("thumbnail") {
            Err(DatanormError::UnknownPreset(name)) => assert_eq!(name, "thumbnail"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validate_normalises_extensions() {
        let config = NormalizeConfig {
            extensions: vec![".JPG".into(), "png".into(), " .Webp ".into()],
            ..NormalizeConfig::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.extensions, vec!["jpg", "png", "webp"]);
    }

    #[test]
    fn validate_rejects_bad_quality() {
        for quality in [0u8, 101] {
            let config = NormalizeConfig {
                quality,
                ..NormalizeConfig::default()
            };
            assert!(matches!(config.validate(), Err(DatanormError::Config(_))));
        }
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        let config = NormalizeConfig {
            resize: ResizePolicy::Exact {
                width: 0,
                height: 400,
            },
            ..NormalizeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = NormalizeConfig {
            resize: ResizePolicy::Bounded { max_side: 0 },
            ..NormalizeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_path_like_class_names() {
        for class in ["", "..", "a/b", "../escape", "."] {
            let config = NormalizeConfig {
                classes: vec![class.into()],
                ..NormalizeConfig::default()
            };
            assert!(config.validate().is_err(), "{class:?} should be rejected");
        }
    }

    #[test]
    fn validate_rejects_duplicate_classes() {
        let config = NormalizeConfig {
            classes: vec!["amora".into(), "amora".into()],
            ..NormalizeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_refuses_to_wipe_input() {
        let config = NormalizeConfig {
            input_root: PathBuf::from("work/dataset"),
            output_root: PathBuf::from("work"),
            clean_output: true,
            ..NormalizeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = NormalizeConfig {
            input_root: PathBuf::from("work/dataset"),
            output_root: PathBuf::from("work"),
            clean_output: false,
            ..NormalizeConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_refuses_cleaning_inside_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dataset");
        std::fs::create_dir_all(input.join("amora")).unwrap();

        let config = NormalizeConfig {
            input_root: input.clone(),
            output_root: input.join("amora"),
            clean_output: true,
            ..NormalizeConfig::default()
        };
        assert!(matches!(config.validate(), Err(DatanormError::Config(_))));

        // Still inside the input tree when the output does not exist yet.
        let config = NormalizeConfig {
            input_root: input.clone(),
            output_root: input.join("fresh/out"),
            clean_output: true,
            ..NormalizeConfig::default()
        };
        assert!(matches!(config.validate(), Err(DatanormError::Config(_))));
    }

    #[test]
    fn validate_sees_through_differently_spelled_roots() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dataset");
        std::fs::create_dir_all(&input).unwrap();

        for output in [
            dir.path().join("missing/../dataset"),
            dir.path().join("dataset/."),
            dir.path().join("dataset/amora/.."),
        ] {
            let config = NormalizeConfig {
                input_root: input.clone(),
                output_root: output.clone(),
                clean_output: false,
                ..NormalizeConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(DatanormError::Config(_))),
                "{} should be seen as the input root",
                output.display()
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn validate_resolves_symlinked_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dataset");
        std::fs::create_dir_all(&input).unwrap();
        let link = dir.path().join("alias");
        std::os::unix::fs::symlink(&input, &link).unwrap();

        let config = NormalizeConfig {
            input_root: input,
            output_root: link,
            clean_output: true,
            ..NormalizeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_sibling_roots() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dataset");
        std::fs::create_dir_all(&input).unwrap();

        let config = NormalizeConfig {
            input_root: input,
            output_root: dir.path().join("dataset_compressed"),
            clean_output: true,
            ..NormalizeConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_drops_repeated_extensions() {
        let config = NormalizeConfig {
            extensions: vec!["jpg".into(), "png".into(), ".JPG".into(), "PNG".into()],
            ..NormalizeConfig::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.extensions, vec!["jpg", "png"]);
    }

    #[test]
    fn accepts_is_case_insensitive() {
        let config = NormalizeConfig::default().validate().unwrap();
        assert!(config.accepts("img1.PNG"));
        assert!(config.accepts("photo.JpEg"));
        assert!(config.accepts("leaf.webp"));
        assert!(config.accepts(".png"));
        assert!(!config.accepts("a.gif"));
        assert!(!config.accepts("notes.txt"));
        assert!(!config.accepts("png"));
        assert!(!config.accepts("archive.xpng"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: NormalizeConfig =
            serde_json::from_str(r#"{"quality": 85, "classes": ["cats"]}"#).unwrap();
        assert_eq!(config.quality, 85);
        assert_eq!(config.classes, vec!["cats"]);
        assert_eq!(config.output_root, PathBuf::from("dataset_compressed"));
    }
}
