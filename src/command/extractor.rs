//! Command extraction: free text -> ordered command list
//!
//! LLM first, deterministic keywords last. The result may be empty, which
//! the caller treats as chat.

use crate::command::catalog::CommandId;
use crate::command::keywords;
use crate::command::ladder::Ladder;
use crate::core::types::Language;
use crate::llm::parser::parse_command_list;
use crate::llm::{CompletionService, PromptKind, PromptTable};

/// Turns request text into known commands, in the order they should run
pub struct CommandExtractor<'a> {
    llm: &'a dyn CompletionService,
    prompts: &'a PromptTable,
}

impl<'a> CommandExtractor<'a> {
    pub fn new(llm: &'a dyn CompletionService, prompts: &'a PromptTable) -> Self {
        Self { llm, prompts }
    }

    /// Extract commands; order and duplicates are preserved
    pub fn extract(&self, text: &str, language: Language) -> Vec<CommandId> {
        let lower = text.to_lowercase();

        let ladder = Ladder::new("extract")
            .then("command list prompt", || {
                let prompt = self.prompts.get(language, PromptKind::CommandNamesExtraction);
                let parsed = parse_command_list(&self.llm.complete(prompt, text)?);
                Ok(non_empty(parsed.commands))
            })
            .then("single command prompt", || {
                let prompt = self.prompts.get(language, PromptKind::LegacyCommandExtraction);
                let parsed = parse_command_list(&self.llm.complete(prompt, text)?);
                Ok(parsed.commands.first().map(|cmd| vec![*cmd]))
            })
            .then("keyword matcher", || Ok(non_empty(keywords::keyword_commands(&lower))));

        match ladder.run() {
            Some((step, commands)) => {
                tracing::info!("Extracted {:?} via {}", commands, step);
                commands
            }
            None => {
                tracing::debug!("No commands found in {:?}", text);
                Vec::new()
            }
        }
    }
}

fn non_empty(commands: Vec<CommandId>) -> Option<Vec<CommandId>> {
    (!commands.is_empty()).then_some(commands)
}
