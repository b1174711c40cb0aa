//! Per-conversation turn processing
//!
//! A [`Session`] owns everything one conversation needs: the confirmation
//! slot, the command queue and its dispatcher. Each turn posts exactly one
//! assistant message on the event channel; command results follow later as
//! separate `Executed` events.

use regex::Regex;
use std::sync::{Arc, LazyLock, Mutex};
use std::thread::{self, JoinHandle};

use crate::command::catalog::CommandId;
use crate::command::classifier::{classify, Intent};
use crate::command::executor::{CommandExecutor, DirectoryReporter};
use crate::command::extractor::CommandExtractor;
use crate::command::keywords;
use crate::command::resolver::ArgumentResolver;
use crate::command::status::{status_message, suggestion_text, DECLINED};
use crate::core::config::PilotConfig;
use crate::core::error::Result;
use crate::core::types::{ArgValue, CommandRequest, Language};
use crate::llm::{CompletionService, PromptKind, PromptTable};
use crate::session::confirmation::{ConfirmationSlot, PendingConfirmation, ReplyOutcome};
use crate::session::dispatcher::{Dispatcher, DispatcherHandle};
use crate::session::events::{EventSink, UiEvent};
use crate::session::queue::CommandQueue;

/// Reply when the completion service cannot be reached
pub const APOLOGY: &str = "Sorry, I'm having trouble connecting to my knowledge base.";

/// Reply substituted for answers that contain code
pub const DOMAIN_ONLY: &str = "I am designed only for PAUT and ultrasonic testing-related tasks.";

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("code block"));

/// External services a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub llm: Arc<dyn CompletionService>,
    pub executor: Arc<dyn CommandExecutor>,
    pub directories: Arc<dyn DirectoryReporter>,
}

/// What one turn did
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank input, nothing posted
    Ignored,
    /// Commands were enqueued; `message` is the status posted for them
    Enqueued {
        commands: Vec<CommandId>,
        message: String,
    },
    /// A conversational reply, possibly ending in a yes/no offer
    Replied {
        message: String,
        suggested: Option<CommandId>,
    },
    /// The user turned down a pending offer
    Declined,
}

/// One conversation
pub struct Session {
    config: PilotConfig,
    prompts: PromptTable,
    services: Collaborators,
    confirmation: ConfirmationSlot,
    queue: Arc<CommandQueue>,
    dispatcher: DispatcherHandle,
    events: EventSink,
}

impl Session {
    /// Create a session and start its dispatcher
    pub fn start(
        config: PilotConfig,
        prompts: PromptTable,
        services: Collaborators,
        events: EventSink,
    ) -> Result<Self> {
        let queue = Arc::new(CommandQueue::new());
        let dispatcher = Dispatcher::new(
            Arc::clone(&queue),
            Arc::clone(&services.executor),
            events.clone(),
        )
        .spawn()?;

        Ok(Self {
            confirmation: ConfirmationSlot::new(&config.confirmation),
            config,
            prompts,
            services,
            queue,
            dispatcher,
            events,
        })
    }

    /// Process one user turn
    pub fn handle_turn(&mut self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }
        let language = self.language_of(text);

        match self.confirmation.reply(text) {
            ReplyOutcome::Confirmed(pending) => {
                return self.enqueue(vec![(pending.command, pending.args)], text);
            }
            ReplyOutcome::Declined => {
                self.events.post(UiEvent::Reply(DECLINED.into()));
                return TurnOutcome::Declined;
            }
            ReplyOutcome::Superseded | ReplyOutcome::NotPending => {}
        }

        let lower = text.to_lowercase();
        match classify(text) {
            Intent::Chat => self.reply(text, language, keywords::question_suggestion(&lower)),
            Intent::Ambiguous(command) => self.reply(text, language, Some(command)),
            Intent::Command => {
                let commands = self.extractor().extract(text, language);
                if commands.is_empty() {
                    return self.reply(text, language, keywords::question_suggestion(&lower));
                }

                let mut warnings = Vec::new();
                let items: Vec<_> = {
                    let resolver = self.resolver();
                    commands
                        .into_iter()
                        .map(|command| {
                            let resolution = resolver.resolve(command, text, language);
                            warnings.extend(resolution.warning);
                            (command, resolution.args)
                        })
                        .collect()
                };
                self.enqueue_with_warnings(items, text, warnings)
            }
        }
    }

    /// Answer conversationally, in `language`
    pub fn answer_chat(&self, text: &str, language: Language) -> String {
        let prompt = self.prompts.get(language, PromptKind::GeneralConversation);
        match self.services.llm.complete(prompt, text) {
            Ok(answer) if CODE_BLOCK.is_match(&answer) => {
                tracing::warn!("Discarding answer containing code");
                DOMAIN_ONLY.into()
            }
            Ok(answer) => answer.trim().to_string(),
            Err(e) => {
                tracing::warn!("Chat answer unavailable: {}", e);
                APOLOGY.into()
            }
        }
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.confirmation.pending()
    }

    pub fn queue(&self) -> &Arc<CommandQueue> {
        &self.queue
    }

    /// Block until every enqueued command has finished
    pub fn wait_idle(&self) {
        self.queue.wait_idle();
    }

    /// Stop dispatching; a command already running completes first
    pub fn stop(&mut self) {
        self.dispatcher.stop();
    }

    fn language_of(&self, text: &str) -> Language {
        match Language::detect(text) {
            Language::English => self.config.default_language,
            detected => detected,
        }
    }

    fn extractor(&self) -> CommandExtractor<'_> {
        CommandExtractor::new(self.services.llm.as_ref(), &self.prompts)
    }

    fn resolver(&self) -> ArgumentResolver<'_> {
        ArgumentResolver::new(
            self.services.llm.as_ref(),
            &self.prompts,
            self.services.directories.as_ref(),
            &self.config.search,
        )
    }

    fn reply(&mut self, text: &str, language: Language, suggest: Option<CommandId>) -> TurnOutcome {
        let mut message = self.answer_chat(text, language);

        if let Some(command) = suggest {
            let args = self.resolver().resolve(command, text, language).args;
            let suggestion = suggestion_text(command);
            message = format!("{}\n\n{}", message, suggestion);
            self.confirmation.suggest(PendingConfirmation {
                command,
                args,
                suggestion_text: suggestion,
            });
        }

        self.events.post(UiEvent::Reply(message.clone()));
        TurnOutcome::Replied {
            message,
            suggested: suggest,
        }
    }

    fn enqueue(&mut self, items: Vec<(CommandId, Vec<ArgValue>)>, text: &str) -> TurnOutcome {
        self.enqueue_with_warnings(items, text, Vec::new())
    }

    fn enqueue_with_warnings(
        &mut self,
        items: Vec<(CommandId, Vec<ArgValue>)>,
        text: &str,
        warnings: Vec<String>,
    ) -> TurnOutcome {
        let mut lines = Vec::new();
        let mut enqueued = Vec::new();

        for (command, args) in items {
            let request = match CommandRequest::new(command, args, text) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("Not enqueuing {}: {}", command, e);
                    lines.push(e.to_string());
                    continue;
                }
            };

            let status = status_message(command, &request.args);
            match self.queue.push(request) {
                Ok(()) => {
                    lines.push(status);
                    enqueued.push(command);
                }
                Err(e) => lines.push(e.to_string()),
            }
        }
        lines.extend(warnings);

        let message = lines.join("\n");
        self.events.post(UiEvent::Status(message.clone()));
        TurnOutcome::Enqueued {
            commands: enqueued,
            message,
        }
    }
}

/// Run a turn on its own thread
///
/// Turns for one session are serialized by the mutex, so the confirmation
/// slot only ever sees one turn at a time.
pub fn spawn_turn(session: &Arc<Mutex<Session>>, text: impl Into<String>) -> JoinHandle<TurnOutcome> {
    let session = Arc::clone(session);
    let text = text.into();
    thread::spawn(move || {
        let mut session = session.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        session.handle_turn(&text)
    })
}
