//! Intent classification: chat, command, or a keyword worth asking about

use crate::command::catalog::CommandId;
use crate::command::keywords;

/// How a turn should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Answer conversationally, run nothing
    Chat,
    /// Hand the text to the command extractor
    Command,
    /// Answer, then offer to run the suggested command
    Ambiguous(CommandId),
}

/// Classify one user turn
///
/// Never fails. Anything that looks like a question without an explicit
/// request to act is Chat, so an unclear turn never executes by itself.
pub fn classify(text: &str) -> Intent {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return Intent::Chat;
    }

    let polite = keywords::is_polite_request(&lower);
    let question = lower.ends_with('?') || keywords::has_question_indicator(&lower);
    if question && !polite {
        tracing::debug!("Classified as chat: {:?}", text);
        return Intent::Chat;
    }

    if let Some(suggested) = keywords::ambiguous_command(&lower) {
        let explicit = keywords::keyword_commands(&lower)
            .into_iter()
            .any(|cmd| cmd != suggested);
        if !explicit && !polite && !keywords::starts_with_imperative(&lower) {
            tracing::debug!("Classified as ambiguous ({}): {:?}", suggested, text);
            return Intent::Ambiguous(suggested);
        }
    }

    Intent::Command
}
