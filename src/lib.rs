//! Scan Pilot - natural language control for inspection data applications

pub mod command;
pub mod core;
pub mod llm;
pub mod search;
pub mod session;
