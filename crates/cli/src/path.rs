use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Makes `p` absolute and lexically clean, preferring the canonical form
/// when the path exists.
pub(crate) fn resolve_path(p: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(p)?;
    let normalized = normalize_path(&absolute);
    Ok(fs::canonicalize(&normalized).unwrap_or(normalized))
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            std::path::Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}
