//! Fixed keyword tables and the deterministic matchers built on them
//!
//! All matching is done on lowercased text with a leading word boundary, so
//! "defects" matches "defect" but "show" never matches "how".

use regex::Regex;
use std::sync::LazyLock;

use crate::command::catalog::CommandId;

/// Words that mark a turn as information seeking
pub const QUESTION_INDICATORS: &[&str] = &[
    "how",
    "what",
    "why",
    "when",
    "where",
    "explain",
    "describe",
    "tell me about",
    "information on",
    "details about",
];

/// Verbs that make a question an explicit request ("can you open ...")
pub const ACTION_VERBS: &[&str] = &[
    "open", "load", "run", "find", "detect", "analyze", "analyse", "start", "change", "set",
    "show", "refresh", "update", "generate", "make", "create", "execute", "perform", "switch",
];

/// Verbs that, opening a turn, mean "do it now" even if a keyword is ambiguous
pub const IMPERATIVE_PREFIXES: &[&str] = &[
    "run", "start", "execute", "perform", "do", "show", "get", "display",
];

/// Keywords that could be either a question topic or a command
///
/// Scanned in order; the first hit becomes the suggested command.
pub const AMBIGUOUS_KEYWORDS: &[(&str, CommandId)] = &[
    ("defect", CommandId::StartDefectDetection),
    ("analysis", CommandId::DoAnalysisSnr),
    ("snr", CommandId::DoAnalysisSnr),
    ("file information", CommandId::GetFileInformation),
    ("directory", CommandId::GetDirectory),
    ("folder", CommandId::GetDirectory),
];

/// Phrases that name a command outright
pub const COMMAND_PHRASES: &[(CommandId, &[&str])] = &[
    (CommandId::LoadData, &["load", "open", "datafile"]),
    (
        CommandId::UpdatePlot,
        &["refresh", "redraw", "update plot", "update the plot", "plot"],
    ),
    (
        CommandId::GetFileInformation,
        &["file information", "file info", "file details", "metadata"],
    ),
    (
        CommandId::GetDirectory,
        &[
            "current folder",
            "current path",
            "current location",
            "current directory",
            "working directory",
        ],
    ),
    (
        CommandId::DoAnalysisSnr,
        &["snr", "signal analysis", "noise ratio", "signal to noise"],
    ),
    (CommandId::StartDefectDetection, &["defect", "flaw"]),
    (
        CommandId::SetNewDirectory,
        &[
            "change folder",
            "change directory",
            "change the directory",
            "new directory",
            "set directory",
            "set path",
            "switch to",
            "update folder",
            "update directory",
        ],
    ),
    (CommandId::MakeSingleFileOnly, &["report"]),
    (
        CommandId::DoFolderAnalysis,
        &["all files", "folder analysis", "batch analysis"],
    ),
];

/// Questions that deserve a follow-up offer to run a command
pub const QUESTION_SUGGESTIONS: &[(&str, CommandId)] = &[
    (r"how.*find.*defect", CommandId::StartDefectDetection),
    (r"how.*detect.*defect", CommandId::StartDefectDetection),
    (r"how.*identify.*defect", CommandId::StartDefectDetection),
    (r"how.*understand.*defect", CommandId::StartDefectDetection),
    (r"what.*defect.*look like", CommandId::StartDefectDetection),
    (r"explain.*defect.*detection", CommandId::StartDefectDetection),
];

fn phrase_pattern(phrase: &str) -> String {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    format!(r"\b{}", words.join(r"\s+"))
}

fn word_pattern(words: &[&str]) -> String {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| {
            let parts: Vec<String> = w.split_whitespace().map(regex::escape).collect();
            parts.join(r"\s+")
        })
        .collect();
    format!(r"\b(?:{})\b", alternatives.join("|"))
}

static QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&word_pattern(QUESTION_INDICATORS)).expect("question pattern"));

static POLITE_REQUEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    let verbs = word_pattern(ACTION_VERBS);
    Regex::new(&format!(
        r"(?:\b(?:can|could|would|will)\s+you\s+(?:please\s+)?|^please\s+){}",
        verbs
    ))
    .expect("polite request pattern")
});

static IMPERATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{}", word_pattern(IMPERATIVE_PREFIXES))).expect("imperative pattern")
});

static COMMAND_PHRASE_RES: LazyLock<Vec<(CommandId, Vec<Regex>)>> = LazyLock::new(|| {
    COMMAND_PHRASES
        .iter()
        .map(|(cmd, phrases)| {
            let patterns = phrases
                .iter()
                .map(|p| Regex::new(&phrase_pattern(p)).expect("command phrase pattern"))
                .collect();
            (*cmd, patterns)
        })
        .collect()
});

static QUESTION_SUGGESTION_RES: LazyLock<Vec<(Regex, CommandId)>> = LazyLock::new(|| {
    QUESTION_SUGGESTIONS
        .iter()
        .map(|(p, cmd)| (Regex::new(p).expect("suggestion pattern"), *cmd))
        .collect()
});

/// Does the text contain a question indicator word?
pub fn has_question_indicator(lower: &str) -> bool {
    QUESTION_RE.is_match(lower)
}

/// "can you open ...", "please run ..."
pub fn is_polite_request(lower: &str) -> bool {
    POLITE_REQUEST_RE.is_match(lower.trim())
}

pub fn starts_with_imperative(lower: &str) -> bool {
    IMPERATIVE_RE.is_match(lower.trim_start())
}

/// First ambiguous keyword present in the text
pub fn ambiguous_command(lower: &str) -> Option<CommandId> {
    AMBIGUOUS_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, cmd)| *cmd)
}

/// Deterministic keyword matcher
///
/// Returns every command whose phrase appears in the text, ordered by first
/// occurrence, each at most once.
pub fn keyword_commands(lower: &str) -> Vec<CommandId> {
    let mut hits: Vec<(usize, CommandId)> = COMMAND_PHRASE_RES
        .iter()
        .filter_map(|(cmd, patterns)| {
            patterns
                .iter()
                .filter_map(|re| re.find(lower).map(|m| m.start()))
                .min()
                .map(|pos| (pos, *cmd))
        })
        .collect();
    hits.sort_by_key(|(pos, _)| *pos);
    hits.into_iter().map(|(_, cmd)| cmd).collect()
}

/// Command to offer after answering a question, if any
pub fn question_suggestion(lower: &str) -> Option<CommandId> {
    QUESTION_SUGGESTION_RES
        .iter()
        .find(|(re, _)| re.is_match(lower))
        .map(|(_, cmd)| *cmd)
}
