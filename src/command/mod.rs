//! Command pipeline
//!
//! text -> classify -> extract -> resolve arguments -> CommandRequest,
//! plus the executor seam and the user-facing status text.

pub mod catalog;
pub mod classifier;
pub mod executor;
pub mod extractor;
pub mod keywords;
pub mod ladder;
pub mod resolver;
pub mod status;

pub use catalog::{ArgKind, ArgumentTarget, CommandId};
pub use classifier::{classify, Intent};
pub use executor::{
    CommandExecutor, DirectoryReporter, ExecutorReply, FixedDirectory, HttpCommandExecutor,
};
pub use extractor::CommandExtractor;
pub use resolver::{ArgumentResolver, Resolution};
