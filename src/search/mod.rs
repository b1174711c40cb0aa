//! Fuzzy filesystem search: scoring, scope, tiered locator

pub mod locator;
pub mod score;
pub mod scope;

pub use locator::{most_recent_file, FuzzyCandidate, Locator};
pub use score::score;
pub use scope::SearchScope;
