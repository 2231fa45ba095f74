pub mod client;
pub mod protocol;

pub use client::AskClient;
pub use protocol::{AskRequest, AskResponse};
