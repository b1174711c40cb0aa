//! Fuzzy filename scoring
//!
//! The score of a query against a candidate is the best of four signals:
//! edit similarity, containment of alternative spellings, shared digit
//! groups, and containment of the full digit string. Inspection files are
//! named by specimen numbers ("D25-28_01.opd"), so digits carry most of the
//! signal when a user types "D2528".

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_\s]+").expect("separators"));
static DIGIT_GROUPS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digit groups"));
static LETTER_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]\d+").expect("letter digits"));
static NUMERIC_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)[-_\s]+(\d+)").expect("numeric range"));

/// Levenshtein distance over chars
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Edit similarity in [0, 1]; two empty strings are identical
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / longest as f64
}

/// Alternative spellings of a lowercased name
///
/// Name as given; separators stripped; digits only; letter+digit tokens
/// ("d25"); both ends of numeric ranges and their concatenation.
/// Empty forms are never produced.
pub fn alternative_forms(name: &str) -> Vec<String> {
    let mut forms = vec![name.to_string(), SEPARATORS.replace_all(name, "").into_owned()];

    let digits: String = DIGIT_GROUPS.find_iter(name).map(|m| m.as_str()).collect();
    forms.push(digits);

    forms.extend(LETTER_DIGITS.find_iter(name).map(|m| m.as_str().to_string()));

    for caps in NUMERIC_RANGE.captures_iter(name) {
        let start = &caps[1];
        let end = &caps[2];
        forms.push(start.to_string());
        forms.push(end.to_string());
        forms.push(format!("{}{}", start, end));
    }

    forms.retain(|f| !f.is_empty());
    forms.sort();
    forms.dedup();
    forms
}

fn length_ratio(a: &str, b: &str) -> f64 {
    let (la, lb) = (a.chars().count(), b.chars().count());
    let (short, long) = if la < lb { (la, lb) } else { (lb, la) };
    short as f64 / long.max(1) as f64
}

fn containment_score(query: &str, candidate: &str) -> f64 {
    let query_forms = alternative_forms(query);
    let candidate_forms = alternative_forms(candidate);

    let mut best: f64 = 0.0;
    for q in &query_forms {
        for c in &candidate_forms {
            if c.contains(q.as_str()) || q.contains(c.as_str()) {
                best = best.max(0.7 + 0.3 * length_ratio(q, c));
            }
        }
    }
    best
}

fn digit_group_score(query: &str, candidate: &str) -> f64 {
    let query_groups: Vec<&str> = DIGIT_GROUPS.find_iter(query).map(|m| m.as_str()).collect();
    let candidate_groups: Vec<&str> = DIGIT_GROUPS.find_iter(candidate).map(|m| m.as_str()).collect();
    if query_groups.is_empty() || candidate_groups.is_empty() {
        return 0.0;
    }

    let matched = query_groups
        .iter()
        .filter(|q| candidate_groups.iter().any(|c| c.contains(*q)))
        .count();
    if matched == 0 {
        return 0.0;
    }
    0.6 + 0.4 * (matched as f64 / query_groups.len() as f64)
}

fn consecutive_digit_score(query: &str, candidate: &str) -> f64 {
    let query_digits: String = query.chars().filter(char::is_ascii_digit).collect();
    let candidate_digits: String = candidate.chars().filter(char::is_ascii_digit).collect();
    if query_digits.is_empty() || candidate_digits.is_empty() {
        return 0.0;
    }
    if candidate_digits.contains(&query_digits) || query_digits.contains(&candidate_digits) {
        0.8 + 0.2 * length_ratio(&query_digits, &candidate_digits)
    } else {
        0.0
    }
}

/// Score a query against a candidate path's basename, in [0, 1]
pub fn score(query: &str, candidate: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let basename = Path::new(candidate)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(candidate)
        .to_lowercase();

    if query.is_empty() || basename.is_empty() {
        return 0.0;
    }

    let similarity = edit_similarity(&query, &basename);
    let containment = containment_score(&query, &basename);
    let digit_groups = digit_group_score(&query, &basename);
    let consecutive = consecutive_digit_score(&query, &basename);

    similarity
        .max(containment)
        .max(digit_groups)
        .max(consecutive)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("cat", "cat"), 0);
        assert_eq!(levenshtein_distance("cat", "cta"), 2);
        assert_eq!(levenshtein_distance("cat", "cut"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_self_match_is_perfect() {
        assert_eq!(score("scan_01.fpd", "scan_01.fpd"), 1.0);
        assert_eq!(score("Weld Test", "weld test"), 1.0);
    }

    #[test]
    fn test_specimen_digits_match() {
        let s = score("D2528", "D25-28_01.opd");
        assert!(s >= 0.8, "score was {}", s);
    }

    #[test]
    fn test_basename_only() {
        let full = score("scan_01.fpd", "/data/archive/scan_01.fpd");
        assert_eq!(full, 1.0);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        let s = score("weld", "calibration.opd");
        assert!(s < 0.3, "score was {}", s);
    }

    #[test]
    fn test_alternative_forms() {
        let forms = alternative_forms("d25-28_01");
        for expected in ["d25-28_01", "d252801", "252801", "d25", "25", "28", "2528"] {
            assert!(forms.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(forms.iter().all(|f| !f.is_empty()));
    }

    #[test]
    fn test_digit_group_overlap() {
        // One of two query groups appears in the candidate
        let s = digit_group_score("plate 7 77", "plate_7.fpd");
        assert!((s - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        assert_eq!(score("", "scan.fpd"), 0.0);
    }
}
