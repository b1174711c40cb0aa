//! Ordered fallback strategies
//!
//! Extraction and argument resolution both try a list of strategies in
//! order and stop at the first one that produces a value. A strategy that
//! errors is logged and skipped, never fatal.

use crate::core::error::Result;

type Attempt<'a, T> = Box<dyn Fn() -> Result<Option<T>> + 'a>;

/// A named, ordered list of strategies producing `T`
pub struct Ladder<'a, T> {
    label: &'static str,
    steps: Vec<(&'static str, Attempt<'a, T>)>,
}

impl<'a, T> Ladder<'a, T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            steps: Vec::new(),
        }
    }

    /// Append a strategy; earlier strategies take priority
    pub fn then(mut self, name: &'static str, step: impl Fn() -> Result<Option<T>> + 'a) -> Self {
        self.steps.push((name, Box::new(step)));
        self
    }

    /// Run strategies in order, returning the first value and the step name
    pub fn run(&self) -> Option<(&'static str, T)> {
        for (name, step) in &self.steps {
            match step() {
                Ok(Some(value)) => {
                    tracing::debug!("{}: '{}' succeeded", self.label, name);
                    return Some((*name, value));
                }
                Ok(None) => {
                    tracing::debug!("{}: '{}' produced nothing", self.label, name);
                }
                Err(e) => {
                    tracing::debug!("{}: '{}' failed: {}", self.label, name, e);
                }
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PilotError;
    use std::cell::Cell;

    #[test]
    fn test_first_success_wins() {
        let ladder = Ladder::new("test")
            .then("none", || Ok(None))
            .then("first", || Ok(Some(1)))
            .then("second", || Ok(Some(2)));
        assert_eq!(ladder.run(), Some(("first", 1)));
    }

    #[test]
    fn test_errors_are_skipped() {
        let ladder = Ladder::new("test")
            .then("broken", || Err(PilotError::Llm("offline".into())))
            .then("fallback", || Ok(Some("ok")));
        assert_eq!(ladder.run(), Some(("fallback", "ok")));
    }

    #[test]
    fn test_later_steps_not_run_after_success() {
        let calls = Cell::new(0);
        let ladder = Ladder::new("test")
            .then("hit", || Ok(Some(())))
            .then("never", || {
                calls.set(calls.get() + 1);
                Ok(Some(()))
            });
        assert!(ladder.run().is_some());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_exhausted_ladder() {
        let ladder: Ladder<'_, u8> = Ladder::new("test").then("none", || Ok(None));
        assert_eq!(ladder.run(), None);
        assert_eq!(ladder.len(), 1);
    }
}
