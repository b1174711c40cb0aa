//! Argument resolution: fill in a command's file or folder argument
//!
//! Each argument type has a ladder of strategies, cheapest and most literal
//! first. Nothing here fails: when no strategy verifies a path, the best
//! literal is used and a warning is attached for the user.

use regex::Regex;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::command::catalog::{ArgumentTarget, CommandId};
use crate::command::executor::DirectoryReporter;
use crate::command::ladder::Ladder;
use crate::core::config::SearchConfig;
use crate::core::types::{ArgValue, Language};
use crate::llm::parser::parse_single_value;
use crate::llm::{CompletionService, PromptKind, PromptTable};
use crate::search::{most_recent_file, Locator, SearchScope};

/// Warning when a file argument could not be verified
pub const NO_FILE_WARNING: &str = "No valid file or folder found";

/// Warning when folder analysis has no folder at all
pub const NO_ANALYSIS_FOLDER_WARNING: &str =
    "No valid folder name found to make analysis. Working with current directory";

/// Warning when a directory change has no folder at all
pub const NO_TARGET_FOLDER_WARNING: &str = "No valid folder name found to update directory.";

static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("quoted"));

/// Tokens that look like `name.ext`, with or without a leading path
static FILE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\s"',;]+\.[A-Za-z0-9]+\b"#).expect("file token"));

/// "from X", "in the X", "at "X Y""
static FOLDER_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:from|in|at)\s+(?:the\s+)?(?:"([^"]+)"|([^\s,"]+))"#)
        .expect("folder mention")
});

/// "to X", "into X", "in the X"
static FOLDER_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:to|into|in|from|at)\s+(?:the\s+)?(?:"([^"]+)"|([^\s,"]+))"#)
        .expect("folder target")
});

/// Resolved arguments plus an optional non-fatal warning
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub args: Vec<ArgValue>,
    pub warning: Option<String>,
}

impl Resolution {
    fn verified(args: Vec<ArgValue>) -> Self {
        Self { args, warning: None }
    }

    fn unverified(args: Vec<ArgValue>, warning: impl Into<String>) -> Self {
        let warning = warning.into();
        tracing::warn!("{}", warning);
        Self {
            args,
            warning: Some(warning),
        }
    }
}

/// Resolves command arguments against the real filesystem
pub struct ArgumentResolver<'a> {
    llm: &'a dyn CompletionService,
    prompts: &'a PromptTable,
    directories: &'a dyn DirectoryReporter,
    config: &'a SearchConfig,
    locator: Locator,
}

impl<'a> ArgumentResolver<'a> {
    pub fn new(
        llm: &'a dyn CompletionService,
        prompts: &'a PromptTable,
        directories: &'a dyn DirectoryReporter,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            llm,
            prompts,
            directories,
            config,
            locator: Locator::new(config),
        }
    }

    /// Arguments for `command` taken from `text`
    ///
    /// The returned arguments always match the command's arity.
    pub fn resolve(&self, command: CommandId, text: &str, language: Language) -> Resolution {
        match command.argument_target() {
            ArgumentTarget::None => Resolution::verified(Vec::new()),
            ArgumentTarget::File => self.resolve_file(text, language),
            ArgumentTarget::Folder => self.resolve_folder(command, text, language),
        }
    }

    fn resolve_file(&self, text: &str, language: Language) -> Resolution {
        let current = self.directories.current_directory();
        let current = current.as_deref();

        let regex_name = self.file_token(text);
        let llm_name: OnceCell<Option<String>> = OnceCell::new();
        let extracted = || {
            llm_name
                .get_or_init(|| self.extract_value(PromptKind::FileNameExtraction, text, language))
                .clone()
        };
        let folder: OnceCell<Option<PathBuf>> = OnceCell::new();
        let mentioned_folder = || {
            folder
                .get_or_init(|| self.mentioned_folder(text, current))
                .clone()
        };

        let ladder = Ladder::new("resolve file")
            .then("quoted path", || {
                Ok(QUOTED
                    .captures_iter(text)
                    .map(|caps| caps[1].to_string())
                    .filter(|q| self.has_known_extension(q))
                    .find_map(|q| existing_file(&q, current)))
            })
            .then("filename in text", || {
                Ok(regex_name.as_deref().and_then(|name| existing_file(name, current)))
            })
            .then("extracted filename", || {
                Ok(extracted().and_then(|name| existing_file(&name, current)))
            })
            .then("fuzzy search", || {
                let Some(query) = extracted().or_else(|| regex_name.clone()) else {
                    return Ok(None);
                };
                let restrict = mentioned_folder();
                let scope = SearchScope::build(current, restrict.as_deref(), self.config);
                Ok(self
                    .locator
                    .find_file(basename(&query), &scope, &self.config.extensions))
            })
            .then("most recent in folder", || {
                if extracted().is_some() || regex_name.is_some() {
                    return Ok(None);
                }
                Ok(mentioned_folder()
                    .and_then(|dir| most_recent_file(&dir, &self.config.extensions)))
            });

        if let Some((_, path)) = ladder.run() {
            return Resolution::verified(vec![path_arg(&path)]);
        }

        let literal = extracted()
            .or_else(|| regex_name.clone())
            .or_else(|| mentioned_folder().map(|dir| path_arg_text(&dir)))
            .unwrap_or_default();
        Resolution::unverified(vec![ArgValue::Text(literal)], NO_FILE_WARNING)
    }

    fn resolve_folder(&self, command: CommandId, text: &str, language: Language) -> Resolution {
        let current = self.directories.current_directory();
        let current = current.as_deref();

        let llm_name: OnceCell<Option<String>> = OnceCell::new();
        let extracted = || {
            llm_name
                .get_or_init(|| self.extract_value(PromptKind::FolderExtraction, text, language))
                .clone()
        };
        let regex_name = folder_target(text);

        let ladder = Ladder::new("resolve folder")
            .then("quoted path", || {
                Ok(QUOTED
                    .captures_iter(text)
                    .find_map(|caps| existing_dir(&caps[1], current)))
            })
            .then("extracted folder", || {
                Ok(extracted().and_then(|name| existing_dir(&name, current)))
            })
            .then("folder in text", || {
                Ok(regex_name.as_deref().and_then(|name| existing_dir(name, current)))
            })
            .then("directory search", || {
                let Some(query) = extracted().or_else(|| regex_name.clone()) else {
                    return Ok(None);
                };
                let scope = SearchScope::build(current, None, self.config);
                Ok(self.locator.find_directory(basename(&query), &scope))
            });

        if let Some((_, dir)) = ladder.run() {
            return Resolution::verified(folder_args(command, path_arg(&dir)));
        }

        match extracted().or_else(|| regex_name.clone()) {
            Some(name) => Resolution::unverified(
                folder_args(command, ArgValue::Text(name.clone())),
                format!("Could not find the directory '{}'. Using the name as provided.", name),
            ),
            None if command == CommandId::DoFolderAnalysis => {
                let dir = current.map(path_arg_text).unwrap_or_default();
                Resolution::unverified(
                    folder_args(command, ArgValue::Text(dir)),
                    NO_ANALYSIS_FOLDER_WARNING,
                )
            }
            None => Resolution::unverified(
                folder_args(command, ArgValue::Text(String::new())),
                NO_TARGET_FOLDER_WARNING,
            ),
        }
    }

    fn extract_value(&self, kind: PromptKind, text: &str, language: Language) -> Option<String> {
        let prompt = self.prompts.get(language, kind);
        match self.llm.complete(prompt, text) {
            Ok(response) => parse_single_value(&response),
            Err(e) => {
                tracing::debug!("{:?} unavailable: {}", kind, e);
                None
            }
        }
    }

    fn file_token(&self, text: &str) -> Option<String> {
        FILE_TOKEN
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|token| self.has_known_extension(token))
            .map(str::to_string)
    }

    fn has_known_extension(&self, name: &str) -> bool {
        name.rsplit_once('.').is_some_and(|(_, ext)| {
            self.config
                .extensions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }

    /// Folder named after "from/in/at", resolved to a real directory
    fn mentioned_folder(&self, text: &str, current: Option<&Path>) -> Option<PathBuf> {
        let caps = FOLDER_MENTION.captures(text)?;
        let name = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
        if name.is_empty() || self.has_known_extension(name) {
            return None;
        }
        if let Some(dir) = existing_dir(name, current) {
            return Some(dir);
        }

        let scope = SearchScope::build(current, None, self.config);
        let found = self.locator.find_directory(basename(name), &scope);
        if found.is_none() {
            tracing::debug!("Mentioned folder '{}' not found", name);
        }
        found
    }
}

fn folder_target(text: &str) -> Option<String> {
    let caps = FOLDER_TARGET.captures(text)?;
    let name = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let name = name.trim().trim_end_matches(['.', '!', '?']);
    (!name.is_empty()).then(|| name.to_string())
}

fn folder_args(command: CommandId, folder: ArgValue) -> Vec<ArgValue> {
    match command {
        CommandId::SetNewDirectory => vec![folder, ArgValue::Flag(false), ArgValue::Text(String::new())],
        _ => vec![folder],
    }
}

/// Last path component of a name that may use either separator
fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).find(|s| !s.is_empty()).unwrap_or(name)
}

/// Where a name points on the application's side
///
/// Absolute names are taken as given. Relative names only ever resolve
/// under the application's current directory, never this process's own.
fn candidate(name: &str, current: Option<&Path>) -> Option<PathBuf> {
    let path = PathBuf::from(name.trim());
    if path.is_absolute() {
        Some(path)
    } else {
        current.map(|dir| dir.join(path))
    }
}

fn existing_file(name: &str, current: Option<&Path>) -> Option<PathBuf> {
    candidate(name, current).filter(|p| p.is_file())
}

fn existing_dir(name: &str, current: Option<&Path>) -> Option<PathBuf> {
    candidate(name, current).filter(|p| p.is_dir())
}

fn path_arg_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn path_arg(path: &Path) -> ArgValue {
    ArgValue::Text(path_arg_text(path))
}
