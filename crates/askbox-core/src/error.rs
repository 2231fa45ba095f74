use thiserror::Error;

#[derive(Error, Debug)]
pub enum AskboxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Format rule error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AskboxError>;
