// Path utilities
//
// Every path the generator touches is resolved against the configured base
// directory and lexically normalized, so the same file reached through
// different relative imports ("./a/../b.ts" vs "./b.ts") maps to one key.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Join `path` onto `base` unless it is already absolute, then normalize
pub fn absolute_from(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Lexically remove `.` and `..` components without touching the file system
///
/// Unlike `canonicalize()` this works for files that do not exist yet
/// (the d.ts output, scratch files) and never resolves symlinks.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match result.components().next_back() {
                    Some(Component::Normal(_)) => result.pop(),
                    _ => false,
                };
                if !popped {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Convert a path under `base_dir` to a relative Unix-style path (with `/` separators)
///
/// Used for log and diagnostic output so messages stay short and stable
/// across platforms.
pub fn to_relative_unix_style(absolute: &Path, base_dir: &Path) -> Result<String> {
    let normalized_path = normalize(absolute);
    let normalized_root = normalize(base_dir);

    let relative = normalized_path
        .strip_prefix(&normalized_root)
        .with_context(|| {
            format!(
                "File path '{}' is not within workspace root '{}'",
                normalized_path.display(),
                normalized_root.display()
            )
        })?;

    let path_str = relative.to_str().context("Path contains invalid UTF-8")?;

    // On Unix, MAIN_SEPARATOR is already '/', so this is a no-op
    let unix_style = if MAIN_SEPARATOR == '\\' {
        path_str.replace('\\', "/")
    } else {
        path_str.to_string()
    };

    Ok(unix_style)
}

/// Relative Unix-style display path, falling back to the full path outside `base_dir`
pub fn display_path(path: &Path, base_dir: &Path) -> String {
    to_relative_unix_style(path, base_dir)
        .unwrap_or_else(|_| path.to_string_lossy().replace('\\', "/"))
}
