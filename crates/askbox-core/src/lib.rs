pub mod config;
pub mod conversation;
pub mod error;
pub mod format;

pub use config::AskboxConfig;
pub use conversation::{AskOutcome, Conversation, PendingQuestion, SubmitRejection};
pub use error::{AskboxError, Result};
pub use format::{Formatter, MessageBody};
