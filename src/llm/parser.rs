//! Parse free-form completions into validated values
//!
//! Completions are untrusted. Command lists are filtered against the known
//! vocabulary and single-value answers are stripped of decoration.

use crate::command::catalog::CommandId;

/// Result of parsing a command-list completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommands {
    /// Known commands in response order, duplicates kept
    pub commands: Vec<CommandId>,
    /// Tokens outside the vocabulary, dropped from `commands`
    pub unknown: Vec<String>,
}

/// Strip code fences, quotes and surrounding whitespace
pub fn clean_completion(response: &str) -> &str {
    response
        .trim()
        .trim_matches('`')
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
}

/// Parse a comma-separated command list
pub fn parse_command_list(response: &str) -> ParsedCommands {
    let mut parsed = ParsedCommands::default();
    let cleaned = clean_completion(response);

    let tokens = cleaned
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(|t| t.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|t| !t.is_empty());

    for token in tokens {
        match CommandId::lookup(token) {
            Some(cmd) => parsed.commands.push(cmd),
            None => {
                tracing::warn!("Discarding unknown command token: {:?}", token);
                parsed.unknown.push(token.to_string());
            }
        }
    }

    parsed
}

/// Parse a single-value extraction (a filename or folder)
///
/// Empty answers and the usual "nothing found" phrasings become `None`.
pub fn parse_single_value(response: &str) -> Option<String> {
    let first_line = clean_completion(response).lines().next()?.trim();
    let value = first_line
        .strip_prefix("Output:")
        .unwrap_or(first_line)
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();

    let lowered = value.to_lowercase();
    if value.is_empty() || matches!(lowered.as_str(), "none" | "null" | "n/a" | "\"\"") {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_list() {
        let parsed = parse_command_list("loadData,startDefectDetection");
        assert_eq!(
            parsed.commands,
            vec![CommandId::LoadData, CommandId::StartDefectDetection]
        );
        assert!(parsed.unknown.is_empty());
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let parsed = parse_command_list("updatePlot, loadData, updatePlot");
        assert_eq!(
            parsed.commands,
            vec![CommandId::UpdatePlot, CommandId::LoadData, CommandId::UpdatePlot]
        );
    }

    #[test]
    fn test_parse_drops_unknown_tokens() {
        let parsed = parse_command_list("```\nloadData, formatDisk, doAnalysisSNR\n```");
        assert_eq!(parsed.commands, vec![CommandId::LoadData, CommandId::DoAnalysisSnr]);
        assert_eq!(parsed.unknown, vec!["formatDisk".to_string()]);
    }

    #[test]
    fn test_parse_empty_response() {
        assert_eq!(parse_command_list(""), ParsedCommands::default());
        assert_eq!(parse_command_list("\"\"").commands, Vec::new());
    }

    #[test]
    fn test_parse_quoted_tokens() {
        let parsed = parse_command_list("\"getDirectory\", 'updatePlot'.");
        assert_eq!(parsed.commands, vec![CommandId::GetDirectory, CommandId::UpdatePlot]);
    }

    #[test]
    fn test_single_value() {
        assert_eq!(parse_single_value("scan_01.fpd\n"), Some("scan_01.fpd".into()));
        assert_eq!(
            parse_single_value("Output: C:/Data/Scans"),
            Some("C:/Data/Scans".into())
        );
        assert_eq!(parse_single_value("`Test Results`"), Some("Test Results".into()));
        assert_eq!(parse_single_value("   "), None);
        assert_eq!(parse_single_value("None"), None);
    }
}
