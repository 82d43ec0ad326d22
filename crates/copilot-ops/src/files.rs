//! Context file resolution
//!
//! `--file` values and fileset entries are either literal paths or globs.
//! Globs are matched against a walk of the working directory, relative to its
//! root: `*.yaml` only matches top-level files and `**/*.yaml` matches at any
//! depth. Hidden and ignored files are skipped.

use crate::prelude::*;
use copilot_ops_core::filemap::{File, FileMap};
use ignore::{overrides::OverrideBuilder, WalkBuilder};
use std::path::Path;

/// Read every file matched by `patterns` under `root`, keyed by relative path.
pub fn collect_files(root: &Path, patterns: &[String]) -> Result<FileMap> {
    let mut files = FileMap::new();

    for pattern in patterns {
        let relative = pattern.trim_start_matches("./");
        let literal = root.join(relative);

        if literal.is_file() {
            files.insert(read_file(root, &literal)?);
            continue;
        }

        let matched = glob_files(root, relative)?;
        if matched.is_empty() {
            return Err(eyre!("No files matched '{}'", pattern));
        }
        for file in matched {
            files.insert(file);
        }
    }

    log::debug!("collected {} context file(s)", files.len());

    Ok(files)
}

/// Gitignore globs without a slash match at any depth, so anchor them to the root.
fn anchored(pattern: &str) -> String {
    if pattern.starts_with('/') || pattern.contains("**") {
        pattern.to_string()
    } else {
        f!("/{pattern}")
    }
}

fn glob_files(root: &Path, pattern: &str) -> Result<Vec<File>> {
    let overrides = OverrideBuilder::new(root)
        .add(&anchored(pattern))
        .and_then(|builder| builder.build())
        .map_err(|e| eyre!("Invalid file pattern '{}': {}", pattern, e))?;

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).overrides(overrides).build() {
        let entry = entry.map_err(|e| eyre!("Failed to walk {}: {}", root.display(), e))?;
        if entry.file_type().is_some_and(|kind| kind.is_file()) {
            files.push(read_file(root, entry.path())?);
        }
    }

    Ok(files)
}

fn read_file(root: &Path, path: &Path) -> Result<File> {
    let content = std::fs::read_to_string(path)
        .with_context(|| f!("Failed to read file '{}'", path.display()))?;

    let relative = path.strip_prefix(root).unwrap_or(path);
    let relative = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Ok(File::new(relative, content))
}
