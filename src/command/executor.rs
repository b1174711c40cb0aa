//! Command execution against the controlled application
//!
//! The pipeline only sees the [`CommandExecutor`] and [`DirectoryReporter`]
//! traits. [`HttpCommandExecutor`] implements both over the application's
//! HTTP API: each command is POSTed to `{base_url}/{commandId}`.

use reqwest::Client;
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::runtime::Handle;

use crate::command::catalog::CommandId;
use crate::core::error::{PilotError, Result};
use crate::core::types::ArgValue;

/// What the application said about one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorReply {
    /// Application-level success
    pub ok: bool,
    pub text: String,
}

impl ExecutorReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: text.into(),
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            ok: false,
            text: text.into(),
        }
    }
}

/// Runs one command; `Err` means the transport itself failed
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: CommandId, args: &[ArgValue]) -> Result<ExecutorReply>;
}

impl<F> CommandExecutor for F
where
    F: Fn(CommandId, &[ArgValue]) -> Result<ExecutorReply> + Send + Sync,
{
    fn execute(&self, command: CommandId, args: &[ArgValue]) -> Result<ExecutorReply> {
        self(command, args)
    }
}

/// Reports the application's current working directory
pub trait DirectoryReporter: Send + Sync {
    fn current_directory(&self) -> Option<PathBuf>;
}

impl<F> DirectoryReporter for F
where
    F: Fn() -> Option<PathBuf> + Send + Sync,
{
    fn current_directory(&self) -> Option<PathBuf> {
        self()
    }
}

/// A directory reporter with a fixed answer
#[derive(Debug, Clone, Default)]
pub struct FixedDirectory(pub Option<PathBuf>);

impl DirectoryReporter for FixedDirectory {
    fn current_directory(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// JSON body for a command
pub fn payload(command: CommandId, args: &[ArgValue]) -> Value {
    let text = |i: usize| args.get(i).and_then(ArgValue::as_text).unwrap_or_default();
    match command {
        CommandId::LoadData => json!({ "FilePath": text(0) }),
        CommandId::SetNewDirectory => json!({
            "TargetFolder": text(0),
            "isrootPathForSearchIsCurrentDir": args.get(1).and_then(ArgValue::as_flag).unwrap_or(false),
            "rootPathForFolderSearch": text(2),
        }),
        CommandId::DoFolderAnalysis => json!({ "FolderPath": text(0) }),
        _ => json!({}),
    }
}

/// Response text, preferring a JSON `Message` field over the raw body
pub fn reply_text(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("Message") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Ok(Value::String(s)) => s,
        _ => body.to_string(),
    }
}

/// Directory from a `getDirectory` body: `FolderName`, then `Message`,
/// then a bare JSON string
pub fn parse_directory(body: &str) -> Option<PathBuf> {
    let value: Value = serde_json::from_str(body).ok()?;
    let dir = match &value {
        Value::Object(map) => map
            .get("FolderName")
            .or_else(|| map.get("Message"))
            .and_then(Value::as_str),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    }?;
    let dir = dir.trim();
    (!dir.is_empty()).then(|| PathBuf::from(dir))
}

/// HTTP client for the controlled application
///
/// Async `reqwest` calls are driven through a tokio runtime handle, so the
/// blocking trait methods must be called from plain threads.
pub struct HttpCommandExecutor {
    client: Client,
    base_url: String,
    runtime: Handle,
}

impl HttpCommandExecutor {
    pub fn new(base_url: impl Into<String>, runtime: Handle) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            runtime,
        }
    }

    pub fn endpoint(&self, command: CommandId) -> String {
        format!("{}/{}", self.base_url, command.name())
    }

    async fn post(&self, command: CommandId, args: &[ArgValue]) -> Result<ExecutorReply> {
        let response = self
            .client
            .post(self.endpoint(command))
            .json(&payload(command, args))
            .send()
            .await
            .map_err(|e| PilotError::Executor(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PilotError::Executor(e.to_string()))?;

        if status.is_success() {
            Ok(ExecutorReply::ok(reply_text(&body)))
        } else {
            tracing::warn!("{} returned {}: {}", command, status.as_u16(), body);
            Ok(ExecutorReply::failed(format!(
                "Failed to execute command '{}'. Status code: {}",
                command,
                status.as_u16()
            )))
        }
    }

    async fn fetch_directory(&self) -> Result<Option<PathBuf>> {
        let response = self
            .client
            .get(self.endpoint(CommandId::GetDirectory))
            .send()
            .await
            .map_err(|e| PilotError::Executor(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PilotError::Executor(format!(
                "getDirectory returned {}",
                response.status().as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PilotError::Executor(e.to_string()))?;
        Ok(parse_directory(&body))
    }
}

impl CommandExecutor for HttpCommandExecutor {
    fn execute(&self, command: CommandId, args: &[ArgValue]) -> Result<ExecutorReply> {
        self.runtime.block_on(self.post(command, args))
    }
}

impl DirectoryReporter for HttpCommandExecutor {
    fn current_directory(&self) -> Option<PathBuf> {
        match self.runtime.block_on(self.fetch_directory()) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Could not get current directory from app: {}", e);
                None
            }
        }
    }
}
