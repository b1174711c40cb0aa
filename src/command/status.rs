//! User-facing text: immediate status, suggestions, final results

use crate::command::catalog::CommandId;
use crate::command::executor::ExecutorReply;
use crate::core::error::Result;
use crate::core::types::{ArgValue, ExecutionResult, RequestId};

/// Acknowledgement after the user declines a suggestion
pub const DECLINED: &str = "Okay, I won't run that command.";

/// Immediate feedback, produced when a command is enqueued
pub fn status_message(command: CommandId, args: &[ArgValue]) -> String {
    let first = || args.first().map(|a| strip_quotes(&a.to_string())).unwrap_or_default();
    match command {
        CommandId::LoadData => {
            let files: Vec<String> = args.iter().map(|a| strip_quotes(&a.to_string())).collect();
            format!("Opening file: {}", files.join(", "))
        }
        CommandId::SetNewDirectory => format!("Changing current directory to: {}", first()),
        CommandId::DoFolderAnalysis => format!("Analyzing all files in directory: {}", first()),
        CommandId::StartDefectDetection => "Starting defect detection on the current file...".into(),
        CommandId::DoAnalysisSnr => "Running SNR analysis on the current file...".into(),
        CommandId::GetFileInformation => "Retrieving file information...".into(),
        CommandId::GetDirectory => "Getting current directory information...".into(),
        CommandId::UpdatePlot => "Updating the plot display...".into(),
        CommandId::MakeSingleFileOnly => "Generating report for the current file...".into(),
    }
}

/// Yes/no offer to run a command
pub fn suggestion_text(command: CommandId) -> String {
    match command {
        CommandId::StartDefectDetection => {
            "Would you like me to run defect detection on the current file?".into()
        }
        CommandId::DoAnalysisSnr => "Would you like me to run SNR analysis on the current file?".into(),
        CommandId::GetFileInformation => "Would you like me to show the file information?".into(),
        CommandId::GetDirectory => "Would you like me to show the current directory?".into(),
        other => format!("Would you like me to run {}?", other),
    }
}

/// Final result for one executed command
///
/// `outcome` is the executor's answer: `Err` for transport failures,
/// `ExecutorReply { ok: false }` for application-level failures.
pub fn compose_result(
    request_id: RequestId,
    command: CommandId,
    outcome: Result<ExecutorReply>,
) -> ExecutionResult {
    let (success, status_message, response_text) = match outcome {
        Ok(reply) if reply.ok => (
            true,
            format!("Command '{}' executed successfully.", command),
            reply.text,
        ),
        Ok(reply) => (false, format!("Failed to execute command '{}'.", command), reply.text),
        Err(e) => {
            let message = format!("Error executing command: {}", e);
            (false, message.clone(), message)
        }
    };

    ExecutionResult {
        request_id,
        command,
        success,
        status_message,
        response_text,
    }
}

fn strip_quotes(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '[' | ']' | '"' | '\'')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PilotError;

    #[test]
    fn test_status_templates() {
        assert_eq!(
            status_message(CommandId::LoadData, &["C:/Data/scan_01.fpd".into()]),
            "Opening file: C:/Data/scan_01.fpd"
        );
        assert_eq!(
            status_message(
                CommandId::SetNewDirectory,
                &["\"Data\"".into(), false.into(), "".into()]
            ),
            "Changing current directory to: Data"
        );
        assert_eq!(
            status_message(CommandId::DoFolderAnalysis, &["/scans".into()]),
            "Analyzing all files in directory: /scans"
        );
        assert_eq!(
            status_message(CommandId::StartDefectDetection, &[]),
            "Starting defect detection on the current file..."
        );
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(
            suggestion_text(CommandId::StartDefectDetection),
            "Would you like me to run defect detection on the current file?"
        );
        assert_eq!(
            suggestion_text(CommandId::UpdatePlot),
            "Would you like me to run updatePlot?"
        );
    }

    #[test]
    fn test_compose_success() {
        let id = RequestId::new();
        let result = compose_result(id, CommandId::UpdatePlot, Ok(ExecutorReply::ok("Plot updated")));
        assert!(result.success);
        assert_eq!(result.request_id, id);
        assert_eq!(result.status_message, "Command 'updatePlot' executed successfully.");
        assert_eq!(result.response_text, "Plot updated");
    }

    #[test]
    fn test_compose_application_failure() {
        let result = compose_result(
            RequestId::new(),
            CommandId::LoadData,
            Ok(ExecutorReply::failed("Failed to execute command 'loadData'. Status code: 500")),
        );
        assert!(!result.success);
        assert_eq!(
            result.response_text,
            "Failed to execute command 'loadData'. Status code: 500"
        );
    }

    #[test]
    fn test_compose_transport_failure() {
        let result = compose_result(
            RequestId::new(),
            CommandId::GetDirectory,
            Err(PilotError::Executor("connection refused".into())),
        );
        assert!(!result.success);
        assert!(result.response_text.contains("connection refused"));
    }
}
