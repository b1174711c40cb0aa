//! Search scope: ordered, deduplicated directories, highest priority first

use std::path::{Path, PathBuf};

use crate::core::config::SearchConfig;

/// Directories searched when resolving a file or folder argument
///
/// The first entry is the primary one (normally the directory the controlled
/// application reports as current); exact and fuzzy tiers try it alone before
/// walking the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchScope {
    entries: Vec<PathBuf>,
}

impl SearchScope {
    /// Scope over exactly these directories, in order
    pub fn from_entries(entries: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut scope = Self::default();
        for entry in entries {
            scope.push(entry);
        }
        scope
    }

    /// Build a fresh scope for one resolution attempt
    ///
    /// `current` is the reported current directory and `restrict` an
    /// explicitly mentioned folder. With a restriction only that folder
    /// is searched.
    pub fn build(current: Option<&Path>, restrict: Option<&Path>, config: &SearchConfig) -> Self {
        if let Some(folder) = restrict {
            return Self::from_entries([folder.to_path_buf()]);
        }

        let mut scope = Self::default();
        if let Some(dir) = current {
            scope.push(dir.to_path_buf());
        }
        for root in &config.extra_roots {
            scope.push(root.clone());
        }
        if config.include_profile_dirs {
            for dir in profile_dirs(config) {
                scope.push(dir);
            }
        }

        tracing::debug!("Search scope: {:?}", scope.entries);
        scope
    }

    /// Add an entry if it exists and is not already present
    pub fn push(&mut self, dir: PathBuf) {
        if !dir.is_dir() || self.entries.contains(&dir) {
            return;
        }
        self.entries.push(dir);
    }

    pub fn primary(&self) -> Option<&Path> {
        self.entries.first().map(PathBuf::as_path)
    }

    /// Entries after the primary one
    pub fn remaining(&self) -> &[PathBuf] {
        self.entries.get(1..).unwrap_or_default()
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Is `path` inside some scope entry?
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|entry| path.starts_with(entry))
    }
}

/// Desktop, data folders with two levels of sub-folders, Documents, home
fn profile_dirs(config: &SearchConfig) -> Vec<PathBuf> {
    let mut dirs_found = Vec::new();

    if let Some(desktop) = dirs::desktop_dir() {
        dirs_found.push(desktop.clone());
        for name in &config.data_folders {
            let data = desktop.join(name);
            if !data.is_dir() {
                continue;
            }
            dirs_found.push(data.clone());
            for child in subdirectories(&data) {
                dirs_found.push(child.clone());
                dirs_found.extend(subdirectories(&child));
            }
        }
    }
    if let Some(documents) = dirs::document_dir() {
        dirs_found.push(documents);
    }
    if let Some(home) = dirs::home_dir() {
        dirs_found.push(home);
    }

    dirs_found
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut children: Vec<PathBuf> = read
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    children.sort();
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn no_profile() -> SearchConfig {
        SearchConfig {
            include_profile_dirs: false,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_current_dir_is_primary() {
        let current = tempdir().unwrap();
        let extra = tempdir().unwrap();
        let config = SearchConfig {
            extra_roots: vec![extra.path().to_path_buf()],
            ..no_profile()
        };

        let scope = SearchScope::build(Some(current.path()), None, &config);
        assert_eq!(scope.primary(), Some(current.path()));
        assert_eq!(scope.remaining(), &[extra.path().to_path_buf()]);
    }

    #[test]
    fn test_deduplicates_and_skips_missing() {
        let current = tempdir().unwrap();
        let config = SearchConfig {
            extra_roots: vec![
                current.path().to_path_buf(),
                current.path().join("does-not-exist"),
            ],
            ..no_profile()
        };

        let scope = SearchScope::build(Some(current.path()), None, &config);
        assert_eq!(scope.entries().len(), 1);
    }

    #[test]
    fn test_restriction_replaces_scope() {
        let current = tempdir().unwrap();
        let folder = tempdir().unwrap();

        let scope = SearchScope::build(Some(current.path()), Some(folder.path()), &no_profile());
        assert_eq!(scope.entries(), &[folder.path().to_path_buf()]);
    }

    #[test]
    fn test_empty_scope() {
        let scope = SearchScope::build(None, None, &no_profile());
        assert!(scope.is_empty());
        assert!(scope.primary().is_none());
        assert!(scope.remaining().is_empty());
    }

    #[test]
    fn test_contains() {
        let dir = tempdir().unwrap();
        let scope = SearchScope::from_entries([dir.path().to_path_buf()]);
        assert!(scope.contains(&dir.path().join("a/b.fpd")));
        assert!(!scope.contains(Path::new("/elsewhere/b.fpd")));
    }
}
