//! Localized prompt table
//!
//! One `(language, prompt kind) -> text` lookup, built once at startup.
//! Lookups fall back to English when a language lacks an entry, so callers
//! never see a missing prompt.

use ahash::AHashMap;
use serde::Deserialize;
use std::path::Path;

use crate::core::error::Result;
use crate::core::types::Language;

/// Kinds of prompt the pipeline asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    CommandsDescription,
    CommandNamesExtraction,
    LegacyCommandExtraction,
    GeneralConversation,
    FileNameExtraction,
    FolderExtraction,
}

impl PromptKind {
    pub const ALL: [PromptKind; 6] = [
        PromptKind::CommandsDescription,
        PromptKind::CommandNamesExtraction,
        PromptKind::LegacyCommandExtraction,
        PromptKind::GeneralConversation,
        PromptKind::FileNameExtraction,
        PromptKind::FolderExtraction,
    ];
}

/// Prompt lookup table
#[derive(Debug, Clone)]
pub struct PromptTable {
    entries: AHashMap<(Language, PromptKind), String>,
}

impl Default for PromptTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptTable {
    /// Built-in English prompts plus Korean command prompts
    pub fn builtin() -> Self {
        let mut entries = AHashMap::new();

        let description = COMMANDS_DESCRIPTION_EN.to_string();
        entries.insert(
            (Language::English, PromptKind::CommandsDescription),
            description.clone(),
        );
        entries.insert(
            (Language::English, PromptKind::CommandNamesExtraction),
            COMMAND_NAMES_EXTRACTION_EN.replace("{commands}", &description),
        );
        entries.insert(
            (Language::English, PromptKind::LegacyCommandExtraction),
            LEGACY_COMMAND_EXTRACTION_EN.replace("{commands}", &description),
        );
        entries.insert(
            (Language::English, PromptKind::GeneralConversation),
            GENERAL_CONVERSATION_EN.replace("{commands}", &description),
        );
        entries.insert(
            (Language::English, PromptKind::FileNameExtraction),
            FILE_NAME_EXTRACTION_EN.to_string(),
        );
        entries.insert(
            (Language::English, PromptKind::FolderExtraction),
            FOLDER_EXTRACTION_EN.to_string(),
        );

        let description_ko = COMMANDS_DESCRIPTION_KO.to_string();
        entries.insert(
            (Language::Korean, PromptKind::CommandsDescription),
            description_ko.clone(),
        );
        entries.insert(
            (Language::Korean, PromptKind::CommandNamesExtraction),
            COMMAND_NAMES_EXTRACTION_KO.replace("{commands}", &description_ko),
        );

        Self { entries }
    }

    /// Prompt for `language`, falling back to English
    pub fn get(&self, language: Language, kind: PromptKind) -> &str {
        self.entries
            .get(&(language, kind))
            .or_else(|| self.entries.get(&(Language::English, kind)))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Add or replace a single prompt
    pub fn insert(&mut self, language: Language, kind: PromptKind, text: impl Into<String>) {
        self.entries.insert((language, kind), text.into());
    }

    /// Overlay `<code>.json` files from a directory
    ///
    /// Each file maps prompt kinds to text, e.g.
    /// `{"general_conversation": "..."}`. Files named after unknown
    /// languages are skipped.
    pub fn load_overrides(&mut self, dir: &Path) -> Result<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(language) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(Language::from_code)
            else {
                tracing::warn!("Skipping prompt file for unknown language: {}", path.display());
                continue;
            };

            let content = std::fs::read_to_string(&path)?;
            let prompts: AHashMap<PromptKind, String> = serde_json::from_str(&content)?;
            for (kind, text) in prompts {
                self.insert(language, kind, text);
                loaded += 1;
            }
            tracing::info!("Loaded prompts for language: {}", language.code());
        }
        Ok(loaded)
    }
}

const COMMANDS_DESCRIPTION_EN: &str = r#"
"loadData": Opens or loads a data file for analysis. Used when the user wants to open a specific file.
Example: "Open the file test_data.fpd" or "Load the latest scan data"

"updatePlot": Refreshes or updates the current plot/scan visualization.
Example: "Refresh the plot" or "Update the visualization"

"getFileInformation": Opens the File Information window to display metadata about the currently opened file.
Example: "Show me file details"

"getDirectory": Shows the current working directory (folder) where the application is looking for files.
Example: "Show me the working directory"

"doAnalysisSNR": Opens the SNR (Signal to Noise Ratio) analysis window to perform signal quality analysis.
Example: "Run SNR analysis" or "Analyze signal to noise ratio"

"startDefectDetection": Runs the neural network to detect flaws or defects in the data and displays them in the C-scan plot.
Example: "Find defects in this scan" or "Run defect detection"

"setNewDirectory": Changes the current working directory to a different folder.
Example: "Change directory to C:/Data" or "Switch to the Documents folder"

"makeSingleFileOnly": Generates a report for the currently opened file based on its analysis.
Example: "Create a report for this file"

"doFolderAnalysis": Analyzes all files in a specified folder and prepares a comprehensive report.
Example: "Analyze all files in the Data folder"
"#;

const COMMAND_NAMES_EXTRACTION_EN: &str = r#"Here is the list of commands with their descriptions:
{commands}

If the user asks you to PERFORM an action that one or more of these commands can do,
return ONLY the exact command names separated by commas, in the order they should run.
If the user is asking for INFORMATION or explanation, is just chatting, or asks for anything else,
return an empty string.

Examples:
User: "Run defect detection on this file"
Response: startDefectDetection

User: "Open test.fpd and run SNR analysis"
Response: loadData,doAnalysisSNR

User: "How can I find defects in PAUT data?"
Response:

No words. No explanations. No formatting. No symbols.
"#;

const LEGACY_COMMAND_EXTRACTION_EN: &str = r#"You ONLY extract a command name from user input.

RULES:
1. If the request matches one of the commands below, return ONLY that command name with no additional text.
2. If it does not match any command, return an empty string. Do not explain. Do not add formatting.

COMMAND LIST:
{commands}
"#;

const GENERAL_CONVERSATION_EN: &str = r#"You are an assistant for software that processes Phased Array Ultrasonic Testing (PAUT) data.

CAPABILITIES:
1. Explain ultrasonic testing principles, PAUT techniques and data interpretation
2. Guide users on how to use the PAUTReader software
3. Answer technical questions related to non-destructive testing (NDT)

AVAILABLE COMMANDS:
{commands}

RULES:
- Be concise and professional
- If asked about a topic outside PAUT/NDT, explain that you are specialized in ultrasonic testing
- Never generate programming code
"#;

const FILE_NAME_EXTRACTION_EN: &str = r#"Extract the file path or filename from the user's input. Return only the path or filename without any additional text or explanation.

If multiple files are mentioned, return the one that appears to be the main focus.
If no specific file is mentioned, return an empty string.

Examples:
Input: "Please open the file C:/Data/scan_001.fpd"
Output: C:/Data/scan_001.fpd

Input: "Load test_data.opd from the current folder"
Output: test_data.opd

Input: "Can you analyze this file?"
Output:
"#;

const FOLDER_EXTRACTION_EN: &str = r#"Extract the folder path from the user's input. Return only the path without any additional text or explanation.

If multiple folders are mentioned, return the one that appears to be the main focus.
If no specific folder is mentioned, return an empty string.

Examples:
Input: "Change directory to C:/Data/Scans"
Output: C:/Data/Scans

Input: "Analyze all files in the Test Results folder"
Output: Test Results

Input: "What's in the current directory?"
Output:
"#;

const COMMANDS_DESCRIPTION_KO: &str = r#"
"loadData": 데이터 파일을 분석을 위해 열거나 로드합니다.
"updatePlot": 현재 플롯/스캔 시각화를 새로 고칩니다.
"getFileInformation": 현재 열린 파일의 정보 창을 엽니다.
"getDirectory": 현재 작업 디렉토리를 표시합니다.
"doAnalysisSNR": SNR(신호 대 잡음비) 분석 창을 엽니다.
"startDefectDetection": 신경망으로 데이터에서 결함을 감지하고 C-스캔 플롯에 표시합니다.
"setNewDirectory": 현재 작업 디렉토리를 다른 폴더로 변경합니다.
"makeSingleFileOnly": 현재 열린 파일에 대한 보고서를 생성합니다.
"doFolderAnalysis": 지정된 폴더의 모든 파일을 분석하고 종합 보고서를 준비합니다.
"#;

const COMMAND_NAMES_EXTRACTION_KO: &str = r#"사용 가능한 명령:
{commands}

규칙:
1. 사용자의 요청이 하나 이상의 명령과 일치하면 쉼표로 구분된 명령 이름만 반환하세요.
2. 일치하는 명령이 없거나 정보를 묻는 질문이면 빈 문자열을 반환하세요.
3. 설명, 서식 또는 추가 텍스트를 포함하지 마세요.

예시:
사용자: "결함 감지를 실행하고 보고서를 작성해"
응답: startDefectDetection,makeSingleFileOnly
"#;
