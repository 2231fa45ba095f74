//! Request and response bodies for the question endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
}

/// Reply from `POST /ask`. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

impl AskResponse {
    /// The answer text, or `None` if it is missing or blank.
    pub fn answer_text(&self) -> Option<&str> {
        self.answer.as_deref().filter(|a| !a.trim().is_empty())
    }
}
