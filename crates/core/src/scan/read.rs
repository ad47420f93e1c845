use std::fs;
use std::io;
use std::path::Path;

use crate::types::{ScanOptions, ScanStats};

pub(crate) fn make_rel_path(root: &Path, abs_path: &Path) -> String {
    match abs_path.strip_prefix(root) {
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => abs_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<unknown>".to_string()),
    }
}

/// Bumps the skip counter matching an I/O error kind; unknown kinds count
/// as walk errors.
pub(crate) fn count_io_skip(stats: &mut ScanStats, kind: Option<io::ErrorKind>) {
    let counter = match kind {
        Some(io::ErrorKind::NotFound) => &mut stats.skipped_not_found,
        Some(io::ErrorKind::PermissionDenied) => &mut stats.skipped_permission_denied,
        _ => &mut stats.skipped_walk_errors,
    };
    *counter = counter.saturating_add(1);
}

fn record_io_skip(stats: &mut ScanStats, path: &Path, err: &io::Error) {
    count_io_skip(stats, Some(err.kind()));
    tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
}

/// Reads one file as UTF-8 text.
///
/// Returns `Ok(None)` for files that are skipped (too large, binary, not
/// UTF-8, vanished or unreadable); each skip bumps its counter in `stats`.
pub(crate) fn read_text_file(
    path: &Path,
    options: &ScanOptions,
    stats: &mut ScanStats,
) -> io::Result<Option<String>> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(err) => {
            record_io_skip(stats, path, &err);
            return Ok(None);
        }
    };
    if metadata.file_type().is_symlink() {
        stats.skipped_walk_errors = stats.skipped_walk_errors.saturating_add(1);
        return Ok(None);
    }
    if let Some(max_file_size) = options.max_file_size
        && metadata.len() > max_file_size
    {
        stats.skipped_too_large = stats.skipped_too_large.saturating_add(1);
        tracing::debug!(path = %path.display(), size = metadata.len(), "skipping large file");
        return Ok(None);
    }

    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(err) => {
            record_io_skip(stats, path, &err);
            return Ok(None);
        }
    };

    stats.scanned_files = stats.scanned_files.saturating_add(1);
    stats.scanned_bytes = stats.scanned_bytes.saturating_add(bytes.len() as u64);

    if bytes.contains(&0) {
        stats.skipped_binary = stats.skipped_binary.saturating_add(1);
        return Ok(None);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(Some(text)),
        Err(_) => {
            stats.skipped_not_utf8 = stats.skipped_not_utf8.saturating_add(1);
            Ok(None)
        }
    }
}
