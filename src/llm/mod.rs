//! LLM plumbing: completion client, prompt table, completion parsing

pub mod client;
pub mod parser;
pub mod prompts;

pub use client::{CompletionService, LlmClient, LlmService, OfflineCompletion};
pub use prompts::{PromptKind, PromptTable};
