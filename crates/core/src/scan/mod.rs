//! Filesystem layer: walks roots, reads text files and tokenizes them.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::file::TokenizedFile;
use crate::tokenize::tokenize;
use crate::types::{ScanOptions, ScanOutcome, ScanStats};

mod read;
mod walker;

#[cfg(test)]
mod tests;

pub(crate) use read::{make_rel_path, read_text_file};
pub(crate) use walker::visit_root_files;

#[derive(Debug, Clone)]
pub(crate) struct Root {
    pub(crate) path: PathBuf,
    pub(crate) label: String,
}

fn should_stop_due_to_max_files(options: &ScanOptions, stats: &mut ScanStats) -> bool {
    let Some(max_files) = options.max_files else {
        return false;
    };
    if stats.scanned_files < max_files as u64 {
        return false;
    }
    stats.skipped_budget_max_files = stats.skipped_budget_max_files.saturating_add(1);
    true
}

pub(crate) fn validate_roots(roots: &[PathBuf]) -> Result<(), ScanError> {
    for root in roots {
        let meta = fs::metadata(root).map_err(|err| ScanError::InvalidRoot {
            path: root.clone(),
            reason: err.to_string(),
        })?;
        if !meta.is_dir() {
            return Err(ScanError::InvalidRoot {
                path: root.clone(),
                reason: "not a directory".to_string(),
            });
        }
    }
    Ok(())
}

pub(crate) fn root_label(root: &Path, id: usize) -> String {
    root.file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("root{id}"))
}

/// Labels roots by directory name; repeated names get a `~<id>` suffix.
pub(crate) fn label_roots(roots: &[PathBuf]) -> Vec<Root> {
    let mut seen = HashSet::new();
    roots
        .iter()
        .enumerate()
        .map(|(id, path)| {
            let mut label = root_label(path, id);
            if !seen.insert(label.clone()) {
                label = format!("{label}~{id}");
                seen.insert(label.clone());
            }
            Root {
                path: path.clone(),
                label,
            }
        })
        .collect()
}

fn ignore_dirs_contains(ignore_dirs: &HashSet<String>, name: &str) -> bool {
    if ignore_dirs.contains(name) {
        return true;
    }
    #[cfg(windows)]
    {
        ignore_dirs.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

fn extension_allowed(options: &ScanOptions, path: &Path) -> bool {
    let Some(allowed) = options.extensions.as_ref() else {
        return true;
    };
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.contains(&ext.to_ascii_lowercase()))
}

/// Reads and tokenizes every eligible file under `roots`.
///
/// Files are labelled `<root label>/<relative path>` and returned in walk
/// order: roots in the order given, entries sorted by file name.
pub fn scan_files(
    roots: &[PathBuf],
    options: &ScanOptions,
) -> Result<ScanOutcome<Vec<TokenizedFile>>, ScanError> {
    options.validate()?;
    validate_roots(roots)?;

    let mut stats = ScanStats::default();
    let mut files = Vec::new();

    for root in label_roots(roots) {
        let flow = visit_root_files(&root, options, &mut stats, |stats, abs_path| {
            let Some(text) = read_text_file(&abs_path, options, stats)? else {
                return Ok(ControlFlow::Continue(()));
            };
            let rel = make_rel_path(&root.path, &abs_path);
            let label = format!("{}/{rel}", root.label);
            let file = tokenize(label, &text).map_err(io::Error::other)?;
            tracing::debug!(path = file.path(), tokens = file.len(), "tokenized file");
            files.push(file);
            Ok(ControlFlow::Continue(()))
        })?;
        if flow.is_break() {
            break;
        }
    }

    Ok(ScanOutcome {
        result: files,
        stats,
    })
}
