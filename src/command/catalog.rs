//! The fixed command vocabulary shared with the controlled application

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::PilotError;

/// Type of a single positional argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Text,
    Flag,
}

/// Commands the controlled application understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandId {
    /// Open a data file: `(filename)`
    #[serde(rename = "loadData")]
    LoadData,
    #[serde(rename = "updatePlot")]
    UpdatePlot,
    #[serde(rename = "getFileInformation")]
    GetFileInformation,
    #[serde(rename = "getDirectory")]
    GetDirectory,
    /// Change working folder: `(folder, isRootSearchCurrentDir, rootSearchPath)`
    #[serde(rename = "setNewDirectory")]
    SetNewDirectory,
    #[serde(rename = "doAnalysisSNR")]
    DoAnalysisSnr,
    #[serde(rename = "startDefectDetection")]
    StartDefectDetection,
    /// Report for the currently opened file
    #[serde(rename = "makeSingleFileOnly")]
    MakeSingleFileOnly,
    /// Analyze every file in a folder: `(folder)`
    #[serde(rename = "doFolderAnalysis")]
    DoFolderAnalysis,
}

/// What kind of filesystem argument a command needs resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentTarget {
    None,
    File,
    Folder,
}

impl CommandId {
    pub const ALL: [CommandId; 9] = [
        CommandId::LoadData,
        CommandId::UpdatePlot,
        CommandId::GetFileInformation,
        CommandId::GetDirectory,
        CommandId::SetNewDirectory,
        CommandId::DoAnalysisSnr,
        CommandId::StartDefectDetection,
        CommandId::MakeSingleFileOnly,
        CommandId::DoFolderAnalysis,
    ];

    /// Wire name, identical to the application's endpoint name
    pub fn name(&self) -> &'static str {
        match self {
            CommandId::LoadData => "loadData",
            CommandId::UpdatePlot => "updatePlot",
            CommandId::GetFileInformation => "getFileInformation",
            CommandId::GetDirectory => "getDirectory",
            CommandId::SetNewDirectory => "setNewDirectory",
            CommandId::DoAnalysisSnr => "doAnalysisSNR",
            CommandId::StartDefectDetection => "startDefectDetection",
            CommandId::MakeSingleFileOnly => "makeSingleFileOnly",
            CommandId::DoFolderAnalysis => "doFolderAnalysis",
        }
    }

    /// Declared positional argument types
    pub fn arity(&self) -> &'static [ArgKind] {
        match self {
            CommandId::LoadData | CommandId::DoFolderAnalysis => &[ArgKind::Text],
            CommandId::SetNewDirectory => &[ArgKind::Text, ArgKind::Flag, ArgKind::Text],
            _ => &[],
        }
    }

    pub fn argument_target(&self) -> ArgumentTarget {
        match self {
            CommandId::LoadData => ArgumentTarget::File,
            CommandId::SetNewDirectory | CommandId::DoFolderAnalysis => ArgumentTarget::Folder,
            _ => ArgumentTarget::None,
        }
    }

    /// Case-insensitive lookup of a wire name
    pub fn lookup(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandId {
    type Err = PilotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| PilotError::UnknownCommand(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for cmd in CommandId::ALL {
            assert_eq!(cmd.name().parse::<CommandId>().unwrap(), cmd);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(CommandId::lookup("LOADDATA"), Some(CommandId::LoadData));
        assert_eq!(CommandId::lookup(" doanalysissnr "), Some(CommandId::DoAnalysisSnr));
        assert_eq!(CommandId::lookup("deleteEverything"), None);
    }

    #[test]
    fn test_arity() {
        assert_eq!(CommandId::LoadData.arity(), &[ArgKind::Text]);
        assert_eq!(
            CommandId::SetNewDirectory.arity(),
            &[ArgKind::Text, ArgKind::Flag, ArgKind::Text]
        );
        assert!(CommandId::StartDefectDetection.arity().is_empty());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&CommandId::DoAnalysisSnr).unwrap();
        assert_eq!(json, "\"doAnalysisSNR\"");
        let cmd: CommandId = serde_json::from_str("\"startDefectDetection\"").unwrap();
        assert_eq!(cmd, CommandId::StartDefectDetection);
    }

    #[test]
    fn test_unknown_command_error() {
        let err = "startSNRAnalysis".parse::<CommandId>().unwrap_err();
        assert!(matches!(err, PilotError::UnknownCommand(_)));
    }
}
