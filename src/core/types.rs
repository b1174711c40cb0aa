//! Core type definitions shared by the pipeline stages

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::command::catalog::{ArgKind, CommandId};
use crate::core::error::{PilotError, Result};

/// Unique identifier for a queued command, used to correlate log lines
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// A primitive argument value passed to the controlled application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Text(String),
    Flag(bool),
}

impl ArgValue {
    pub fn kind(&self) -> ArgKind {
        match self {
            ArgValue::Text(_) => ArgKind::Text,
            ArgValue::Flag(_) => ArgKind::Flag,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            ArgValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ArgValue::Flag(b) => Some(*b),
            ArgValue::Text(_) => None,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Flag(b)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Text(s) => write!(f, "{}", s),
            ArgValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// Language of a user turn
///
/// Detected per turn and passed explicitly to every prompt lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "ru")]
    Russian,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Korean, Language::Russian];

    /// Detect the language of free text by script
    ///
    /// Hangul syllables win over Cyrillic; anything else is English.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c)) {
            Language::Korean
        } else if text.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c)) {
            Language::Russian
        } else {
            Language::English
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Korean => "ko",
            Language::Russian => "ru",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code.trim()))
    }
}

/// A validated command ready for the execution queue
///
/// Construction checks the arguments against the command's declared arity,
/// so a `CommandRequest` that exists is always well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub id: RequestId,
    pub name: CommandId,
    pub args: Vec<ArgValue>,
    pub source_text: String,
}

impl CommandRequest {
    pub fn new(name: CommandId, args: Vec<ArgValue>, source_text: impl Into<String>) -> Result<Self> {
        let expected = name.arity();
        if expected.len() != args.len() {
            return Err(PilotError::InvalidArguments {
                command: name.to_string(),
                reason: format!("expected {} argument(s), got {}", expected.len(), args.len()),
            });
        }

        for (position, (kind, value)) in expected.iter().zip(&args).enumerate() {
            if value.kind() != *kind {
                return Err(PilotError::InvalidArguments {
                    command: name.to_string(),
                    reason: format!("argument {} should be {:?}, got {:?}", position, kind, value.kind()),
                });
            }
        }

        Ok(Self {
            id: RequestId::new(),
            name,
            args,
            source_text: source_text.into(),
        })
    }
}

/// Outcome of one executed command, delivered once and never retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub request_id: RequestId,
    pub command: CommandId,
    pub success: bool,
    pub status_message: String,
    pub response_text: String,
}
