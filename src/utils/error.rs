use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("`{0}` is not installed or not on PATH")]
    ToolMissing(String),

    #[error("`{program}` timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("Command error: {0}")]
    Command(String),

    #[error("cannot write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReadyError>;
