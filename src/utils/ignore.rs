//! Source-file exclusion rules
//!
//! Files pulled into the program by imports are only traversed when they
//! belong to the library itself: dependency-manager directories and
//! translated localization tables are skipped.

use std::path::{Component, Path};

/// Directory the package manager installs dependencies into
const DEPENDENCY_DIR: &str = "node_modules";

const LOCALIZATION_DIR: &str = "localization";
const DEFAULT_LOCALE: &str = "english";

/// Files installed by the package manager
///
/// Matches `node_modules` as a whole path component, so `my_node_modules`
/// is not a dependency directory.
pub fn is_dependency_file(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == DEPENDENCY_DIR))
}

/// Translation tables other than the default locale
///
/// Identified purely by location: any file directly inside a `localization`
/// directory except `english.*`.
pub fn is_non_english_localization_file(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    if stem == DEFAULT_LOCALE {
        return false;
    }
    path.parent()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == LOCALIZATION_DIR)
}

/// Combined traversal filter
pub fn is_excluded_source(path: &Path) -> bool {
    is_dependency_file(path) || is_non_english_localization_file(path)
}
