//! HTTP client for the question endpoint.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::protocol::{AskRequest, AskResponse};

/// Client for `POST /ask`.
pub struct AskClient {
    client: Client,
    ask_url: String,
}

impl AskClient {
    pub fn new(ask_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, ask_url }
    }

    pub fn ask_url(&self) -> &str {
        &self.ask_url
    }

    /// Send one question. Non-2xx statuses, transport failures and bodies
    /// that are not a JSON object all come back as errors.
    #[instrument(skip(self, question), fields(url = %self.ask_url))]
    pub async fn ask(&self, question: &str) -> anyhow::Result<AskResponse> {
        let req = AskRequest { question };
        let resp = self.client.post(&self.ask_url).json(&req).send().await?;
        let answer: AskResponse = resp.error_for_status()?.json().await?;
        debug!(
            has_answer = answer.answer_text().is_some(),
            "Answer received"
        );
        Ok(answer)
    }
}
