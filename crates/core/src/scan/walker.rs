use std::io;
use std::ops::ControlFlow;
use std::path::PathBuf;

use ignore::WalkBuilder;

use crate::types::{ScanOptions, ScanStats};

use super::read::count_io_skip;
use super::{Root, extension_allowed, ignore_dirs_contains, should_stop_due_to_max_files};

pub(crate) fn visit_root_files<F>(
    root: &Root,
    options: &ScanOptions,
    stats: &mut ScanStats,
    mut on_file_cb: F,
) -> io::Result<ControlFlow<()>>
where
    F: FnMut(&mut ScanStats, PathBuf) -> io::Result<ControlFlow<()>>,
{
    if options.max_files == Some(0) {
        stats.skipped_budget_max_files = stats.skipped_budget_max_files.saturating_add(1);
        return Ok(ControlFlow::Break(()));
    }

    let ignore_dirs = options.ignore_dirs.clone();
    let respect_gitignore = options.respect_gitignore;
    let is_git_repo = root.path.join(".git").exists();

    let mut builder = WalkBuilder::new(&root.path);
    builder
        .hidden(false)
        .follow_links(false)
        .ignore(false)
        .git_ignore(respect_gitignore)
        .git_global(respect_gitignore && is_git_repo)
        .git_exclude(respect_gitignore && is_git_repo)
        .parents(false)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let walker = builder
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            if entry.path_is_symlink() {
                return false;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if !is_dir {
                return true;
            }
            !entry
                .file_name()
                .to_str()
                .is_some_and(|name| ignore_dirs_contains(&ignore_dirs, name))
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                count_io_skip(stats, err.io_error().map(io::Error::kind));
                tracing::debug!(root = %root.path.display(), error = %err, "walk error");
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        stats.candidate_files = stats.candidate_files.saturating_add(1);
        let abs_path = entry.into_path();
        if !extension_allowed(options, &abs_path) {
            stats.skipped_extension = stats.skipped_extension.saturating_add(1);
            continue;
        }

        if on_file_cb(stats, abs_path)?.is_break() {
            return Ok(ControlFlow::Break(()));
        }

        if should_stop_due_to_max_files(options, stats) {
            return Ok(ControlFlow::Break(()));
        }
    }

    Ok(ControlFlow::Continue(()))
}
