//! Tiered file and directory search over a [`SearchScope`]
//!
//! Tiers run in strict order and the first non-empty tier wins:
//! 1. exact, case-sensitive name in the primary entry
//! 2. exact, case-insensitive name in the primary entry
//! 3. fuzzy match in the primary entry
//! 4. exact name in the primary's sub-folders or below the remaining entries
//! 5. fuzzy match over the same walk
//!
//! Queries must be a single plain name; anything with a separator, a root
//! or a `..` finds nothing. Every candidate comes from a directory listing
//! or a walk that never follows symlinks, so every result lies inside the
//! scope.

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::core::config::SearchConfig;
use crate::search::score::score;
use crate::search::scope::SearchScope;

/// One scored search hit
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyCandidate {
    pub path: PathBuf,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

/// Finds files and directories by (possibly misspelled) name
#[derive(Debug, Clone)]
pub struct Locator {
    min_score: f64,
    max_depth: usize,
    directory_depth: usize,
}

impl Locator {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            min_score: config.min_score,
            max_depth: config.max_depth,
            directory_depth: config.directory_depth,
        }
    }

    /// Ranked files matching `query` with one of `extensions`
    ///
    /// A query ending in a known extension is narrowed to that extension and
    /// its stem becomes the query.
    pub fn search_files(
        &self,
        query: &str,
        scope: &SearchScope,
        extensions: &[String],
    ) -> Vec<FuzzyCandidate> {
        let Some(query) = plain_name(query) else {
            return Vec::new();
        };
        let (stem, extensions) = split_known_extension(query, extensions);
        if stem.is_empty() || extensions.is_empty() {
            return Vec::new();
        }

        let names: Vec<String> = extensions
            .iter()
            .map(|ext| format!("{}.{}", stem, ext))
            .collect();
        let accepts = |path: &Path| has_extension(path, &extensions);

        self.tiered(&stem, &names, scope, EntryKind::File, self.max_depth, &accepts)
    }

    /// Ranked directories matching `query`
    pub fn search_directories(&self, query: &str, scope: &SearchScope) -> Vec<FuzzyCandidate> {
        let Some(query) = plain_name(query.trim().trim_end_matches(['/', '\\'])) else {
            return Vec::new();
        };
        let names = [query.to_string()];
        self.tiered(
            query,
            &names,
            scope,
            EntryKind::Directory,
            self.directory_depth,
            &|_: &Path| true,
        )
    }

    /// Best file match, if any
    pub fn find_file(&self, query: &str, scope: &SearchScope, extensions: &[String]) -> Option<PathBuf> {
        self.search_files(query, scope, extensions)
            .into_iter()
            .next()
            .map(|c| c.path)
    }

    /// Best directory match, if any
    pub fn find_directory(&self, query: &str, scope: &SearchScope) -> Option<PathBuf> {
        self.search_directories(query, scope)
            .into_iter()
            .next()
            .map(|c| c.path)
    }

    fn tiered(
        &self,
        query: &str,
        names: &[String],
        scope: &SearchScope,
        kind: EntryKind,
        depth: usize,
        accepts: &(dyn Fn(&Path) -> bool + Sync),
    ) -> Vec<FuzzyCandidate> {
        if let Some(primary) = scope.primary() {
            let listing = list_entries(primary, kind);

            let verbatim = names.iter().find_map(|name| {
                listing
                    .iter()
                    .find(|path| path.file_name().is_some_and(|n| n == name.as_str()))
            });
            if let Some(path) = verbatim {
                tracing::debug!("Tier 1 exact match: {}", path.display());
                return vec![FuzzyCandidate {
                    path: path.clone(),
                    score: 1.0,
                }];
            }

            let exact = exact_matches(&listing, names);
            if !exact.is_empty() {
                tracing::debug!("Tier 2 case-insensitive match in {}", primary.display());
                return rank(exact);
            }

            let fuzzy = self.fuzzy_matches(query, &listing, accepts);
            if !fuzzy.is_empty() {
                tracing::debug!("Tier 3 fuzzy match in {}", primary.display());
                return fuzzy;
            }
        }

        // The primary's top level was covered above
        let walked: Vec<PathBuf> = scope
            .primary()
            .into_iter()
            .flat_map(|primary| walk_entries(primary, kind, 2, depth))
            .chain(
                scope
                    .remaining()
                    .iter()
                    .flat_map(|entry| walk_entries(entry, kind, 1, depth)),
            )
            .collect();

        let exact = exact_matches(&walked, names);
        if !exact.is_empty() {
            tracing::debug!("Tier 4 exact match across scope");
            return rank(exact);
        }

        let fuzzy = self.fuzzy_matches(query, &walked, accepts);
        if fuzzy.is_empty() {
            tracing::debug!("No match for '{}' in {} scope entries", query, scope.entries().len());
        } else {
            tracing::debug!("Tier 5 fuzzy match across scope");
        }
        fuzzy
    }

    fn fuzzy_matches(
        &self,
        query: &str,
        candidates: &[PathBuf],
        accepts: &(dyn Fn(&Path) -> bool + Sync),
    ) -> Vec<FuzzyCandidate> {
        let scored: Vec<FuzzyCandidate> = candidates
            .par_iter()
            .filter(|path| accepts(path.as_path()))
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                let s = score(query, name);
                (s >= self.min_score).then(|| FuzzyCandidate {
                    path: path.clone(),
                    score: s,
                })
            })
            .collect();
        rank(scored)
    }
}

impl EntryKind {
    fn matches(self, path: &Path) -> bool {
        match self {
            EntryKind::File => path.is_file(),
            EntryKind::Directory => path.is_dir(),
        }
    }
}

/// Score descending, then shallower path, then lexicographic
fn rank(mut candidates: Vec<FuzzyCandidate>) -> Vec<FuzzyCandidate> {
    candidates.sort_by_cached_key(|c| {
        (
            Reverse(OrderedFloat(c.score)),
            c.path.components().count(),
            c.path.clone(),
        )
    });
    candidates
}

fn exact_matches(candidates: &[PathBuf], names: &[String]) -> Vec<FuzzyCandidate> {
    candidates
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| names.iter().any(|name| name.eq_ignore_ascii_case(n)))
        })
        .map(|path| FuzzyCandidate {
            path: path.clone(),
            score: 1.0,
        })
        .collect()
}

fn list_entries(dir: &Path, kind: EntryKind) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(read) => read
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| kind.matches(path))
            .collect(),
        Err(e) => {
            tracing::debug!("Cannot list {}: {}", dir.display(), e);
            Vec::new()
        }
    }
}

fn walk_entries(root: &Path, kind: EntryKind, min_depth: usize, max_depth: usize) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(min_depth)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| match kind {
            EntryKind::File => entry.file_type().is_file(),
            EntryKind::Directory => entry.file_type().is_dir(),
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// The query as a single file or folder name, if it is one
fn plain_name(query: &str) -> Option<&str> {
    let query = query.trim();
    if query.is_empty() || query.contains(['/', '\\']) {
        return None;
    }
    let mut components = Path::new(query).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(query),
        _ => None,
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
}

fn split_known_extension(query: &str, extensions: &[String]) -> (String, Vec<String>) {
    let path = Path::new(query);
    if let (Some(stem), Some(ext)) = (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        if let Some(known) = extensions.iter().find(|k| k.eq_ignore_ascii_case(ext)) {
            return (stem.to_string(), vec![known.clone()]);
        }
    }
    (query.to_string(), extensions.to_vec())
}

/// Newest file in `dir` (not recursive)
///
/// Extensions are tried in order and the first one with any file wins, so
/// with `["fpd", "opd"]` a fresh `.opd` never beats an old `.fpd`.
pub fn most_recent_file(dir: &Path, extensions: &[String]) -> Option<PathBuf> {
    let files = list_entries(dir, EntryKind::File);
    extensions.iter().find_map(|ext| {
        files
            .iter()
            .filter(|path| has_extension(path, std::slice::from_ref(ext)))
            .filter_map(|path| {
                let modified = path.metadata().and_then(|m| m.modified()).ok()?;
                Some((modified, path))
            })
            .max_by_key(|(modified, path)| (*modified, Reverse((*path).clone())))
            .map(|(_, path): (SystemTime, &PathBuf)| path.clone())
    })
}
