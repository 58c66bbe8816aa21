// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sorted, non-recursive listing of a class directory.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use datanorm_core::error::{DatanormError, Result};
use tracing::debug;

/// One entry of a class directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub path: PathBuf,
    pub file_name: OsString,
    /// True for regular files, including symlinks that resolve to one.
    pub is_file: bool,
}

impl ClassEntry {
    /// File name for extension matching; non-UTF-8 bytes are replaced.
    pub fn name_lossy(&self) -> String {
        self.file_name.to_string_lossy().into_owned()
    }
}

/// List the direct children of `dir`, sorted by file name.
///
/// Sorting pins down output numbering regardless of the order the
/// filesystem hands entries back in.
pub fn list_class_dir(dir: &Path) -> Result<Vec<ClassEntry>> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(DatanormError::MissingClassDir(dir.to_path_buf())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(DatanormError::MissingClassDir(dir.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // Follows symlinks; a dangling link is simply not a file.
        let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
        entries.push(ClassEntry {
            file_name: entry.file_name(),
            path,
            is_file,
        });
    }
    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    debug!(dir = %dir.display(), count = entries.len(), "Class directory listed");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn entries_come_back_sorted() {
        let dir = tempdir().unwrap();
        let d = dir.path();
        for name in ["c.jpg", "a.png", "B.JPG", "b.jpeg"] {
            File::create(d.join(name)).unwrap();
        }
        fs::create_dir(d.join("nested")).unwrap();

        let entries = list_class_dir(d).unwrap();
        let names: Vec<String> = entries.iter().map(ClassEntry::name_lossy).collect();
        // Byte order: uppercase sorts before lowercase.
        assert_eq!(names, vec!["B.JPG", "a.png", "b.jpeg", "c.jpg", "nested"]);

        let nested = entries.iter().find(|e| e.file_name == "nested").unwrap();
        assert!(!nested.is_file);
        assert!(entries.iter().filter(|e| e.file_name != "nested").all(|e| e.is_file));
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("amora");
        match list_class_dir(&missing) {
            Err(DatanormError::MissingClassDir(path)) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn file_in_place_of_directory_is_reported() {
        let dir = tempdir().unwrap();
        let not_a_dir = dir.path().join("amora");
        File::create(&not_a_dir).unwrap();
        assert!(matches!(
            list_class_dir(&not_a_dir),
            Err(DatanormError::MissingClassDir(_))
        ));
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let dir = tempdir().unwrap();
        assert!(list_class_dir(dir.path()).unwrap().is_empty());
    }
}
