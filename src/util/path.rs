use std::path::{Path, PathBuf};

use crate::domain::expand_env_vars;

/// Resolve an operator-supplied project directory against `cwd`.
///
/// `~` and `$VAR` are expanded first; `.` and `..` components are folded
/// lexically so the result is absolute even if the directory does not exist yet.
pub fn resolve_root(dir: &Path, cwd: &Path) -> PathBuf {
    let expanded = PathBuf::from(expand_env_vars(&dir.to_string_lossy()));
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };
    normalize(&joined)
}

/// `path` relative to `base` when one can be computed, else `path` itself.
pub fn display_relative(path: &Path, base: &Path) -> PathBuf {
    match pathdiff::diff_paths(path, base) {
        Some(rel) if !rel.as_os_str().is_empty() => rel,
        _ => path.to_path_buf(),
    }
}

fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

// Helper function for cross-platform path comparison
pub fn normalize_path_separator(s: &str) -> String {
    s.replace('\\', "/")
}
