//! Single-slot confirmation dialog
//!
//! At most one suggestion waits for a yes/no at any time. Whatever the user
//! says next, the slot is emptied: a yes hands the command back, a no is
//! acknowledged, anything else is processed as a fresh turn.

use crate::command::catalog::CommandId;
use crate::core::config::ConfirmationConfig;
use crate::core::types::ArgValue;

/// A suggested command waiting for the user's answer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    pub command: CommandId,
    pub args: Vec<ArgValue>,
    pub suggestion_text: String,
}

/// What a reply did to the slot
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// Nothing was pending; handle the text normally
    NotPending,
    /// Affirmative reply: run this
    Confirmed(PendingConfirmation),
    /// Negative reply: acknowledge, run nothing
    Declined,
    /// Some other input: pending state dropped, handle the text normally
    Superseded,
}

/// The per-session slot
#[derive(Debug, Clone, Default)]
pub struct ConfirmationSlot {
    pending: Option<PendingConfirmation>,
    affirmative: Vec<String>,
    negative: Vec<String>,
}

impl ConfirmationSlot {
    pub fn new(config: &ConfirmationConfig) -> Self {
        Self {
            pending: None,
            affirmative: config.affirmative.iter().map(|t| t.to_lowercase()).collect(),
            negative: config.negative.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// Offer a command, replacing any earlier offer
    pub fn suggest(&mut self, pending: PendingConfirmation) {
        if let Some(previous) = self.pending.replace(pending) {
            tracing::debug!("Suggestion for {} superseded", previous.command);
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Feed the user's next input to the slot
    pub fn reply(&mut self, text: &str) -> ReplyOutcome {
        let Some(pending) = self.pending.take() else {
            return ReplyOutcome::NotPending;
        };

        let token = text
            .trim()
            .trim_end_matches(['.', '!'])
            .trim()
            .to_lowercase();
        if self.affirmative.contains(&token) {
            tracing::info!("User confirmed {}", pending.command);
            ReplyOutcome::Confirmed(pending)
        } else if self.negative.contains(&token) {
            tracing::info!("User declined {}", pending.command);
            ReplyOutcome::Declined
        } else {
            tracing::debug!("Pending {} dropped by new input", pending.command);
            ReplyOutcome::Superseded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> ConfirmationSlot {
        ConfirmationSlot::new(&ConfirmationConfig::default())
    }

    fn defect_offer() -> PendingConfirmation {
        PendingConfirmation {
            command: CommandId::StartDefectDetection,
            args: Vec::new(),
            suggestion_text: "Would you like me to run defect detection on the current file?".into(),
        }
    }

    #[test]
    fn test_yes_confirms_and_clears() {
        let mut slot = slot();
        slot.suggest(defect_offer());
        assert_eq!(slot.reply("Yes"), ReplyOutcome::Confirmed(defect_offer()));
        assert!(slot.is_idle());
    }

    #[test]
    fn test_affirmative_tokens() {
        for token in ["yeah", "YEP", " sure ", "ok", "okay", "y", "yes!"] {
            let mut slot = slot();
            slot.suggest(defect_offer());
            assert!(matches!(slot.reply(token), ReplyOutcome::Confirmed(_)), "{}", token);
        }
    }

    #[test]
    fn test_no_declines() {
        let mut slot = slot();
        slot.suggest(defect_offer());
        assert_eq!(slot.reply("nope"), ReplyOutcome::Declined);
        assert!(slot.is_idle());
    }

    #[test]
    fn test_other_input_supersedes() {
        let mut slot = slot();
        slot.suggest(defect_offer());
        assert_eq!(slot.reply("yes please run it"), ReplyOutcome::Superseded);
        assert!(slot.is_idle());
    }

    #[test]
    fn test_reply_without_pending() {
        let mut slot = slot();
        assert_eq!(slot.reply("yes"), ReplyOutcome::NotPending);
        assert!(slot.is_idle());
    }

    #[test]
    fn test_new_suggestion_replaces_old() {
        let mut slot = slot();
        slot.suggest(defect_offer());
        slot.suggest(PendingConfirmation {
            command: CommandId::DoAnalysisSnr,
            args: Vec::new(),
            suggestion_text: String::new(),
        });
        assert_eq!(slot.pending().unwrap().command, CommandId::DoAnalysisSnr);
    }
}
