//! Conversation sessions: confirmation dialog, command queue, dispatch

pub mod confirmation;
pub mod conversation;
pub mod dispatcher;
pub mod events;
pub mod queue;

pub use confirmation::{ConfirmationSlot, PendingConfirmation, ReplyOutcome};
pub use conversation::{spawn_turn, Collaborators, Session, TurnOutcome, APOLOGY, DOMAIN_ONLY};
pub use dispatcher::{Dispatcher, DispatcherHandle};
pub use events::{channel, EventSink, UiEvent};
pub use queue::CommandQueue;
