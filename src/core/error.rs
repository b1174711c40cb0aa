use thiserror::Error;

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid arguments for {command}: {reason}")]
    InvalidArguments { command: String, reason: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command queue is closed")]
    QueueClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PilotError>;
