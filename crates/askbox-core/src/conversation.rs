//! Conversation state: the entry list and the request lifecycle.
//!
//! `Conversation` does no I/O. `submit` records the user's question and a
//! placeholder and hands back what should be sent; `resolve` swaps the
//! placeholder for the answer or the error once the request completes.
//! Only one request may be pending at a time.

use chrono::{DateTime, Local};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::MessagesConfig;
use crate::format::{Formatter, MessageBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Message,
    /// Stands in for an answer that has not arrived yet.
    Placeholder,
    Error,
}

/// How an entry is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    /// The content verbatim. No formatting rule applies.
    Plain,
    Formatted(MessageBody),
}

#[derive(Debug, Clone)]
pub struct ConversationEntry {
    pub id: Uuid,
    pub role: Role,
    pub kind: EntryKind,
    pub content: String,
    pub rendering: Rendering,
    pub created_at: DateTime<Local>,
}

impl ConversationEntry {
    fn new(role: Role, kind: EntryKind, content: String, rendering: Rendering) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            kind,
            content,
            rendering,
            created_at: Local::now(),
        }
    }

    /// The node tree to draw for this entry.
    pub fn body(&self) -> MessageBody {
        match &self.rendering {
            Rendering::Plain => MessageBody::plain(&self.content),
            Rendering::Formatted(body) => body.clone(),
        }
    }
}

/// A question waiting to be sent. `id` names the placeholder that the
/// matching `resolve` call replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub id: Uuid,
    pub question: String,
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The backend replied. `None` when the reply carried no usable answer.
    Answered(Option<String>),
    /// The request failed. The string is diagnostic detail for the log only.
    Failed(String),
}

/// Why a submission produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    Empty,
    /// Another answer is still pending.
    Busy,
}

pub struct Conversation {
    entries: Vec<ConversationEntry>,
    pending: Option<Uuid>,
    formatter: Formatter,
    messages: MessagesConfig,
}

impl Conversation {
    pub fn new(formatter: Formatter, messages: MessagesConfig) -> Self {
        Self {
            entries: Vec::new(),
            pending: None,
            formatter,
            messages,
        }
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a user question and a placeholder for its answer.
    pub fn submit(&mut self, raw: &str) -> Result<PendingQuestion, SubmitRejection> {
        let question = raw.trim();
        if question.is_empty() {
            return Err(SubmitRejection::Empty);
        }
        if self.pending.is_some() {
            debug!("Submission refused: an answer is still pending");
            return Err(SubmitRejection::Busy);
        }

        self.entries.push(ConversationEntry::new(
            Role::User,
            EntryKind::Message,
            question.to_string(),
            Rendering::Plain,
        ));

        let placeholder = ConversationEntry::new(
            Role::Bot,
            EntryKind::Placeholder,
            self.messages.loading.clone(),
            Rendering::Plain,
        );
        let id = placeholder.id;
        self.entries.push(placeholder);
        self.pending = Some(id);

        debug!(%id, chars = question.chars().count(), "Question submitted");
        Ok(PendingQuestion {
            id,
            question: question.to_string(),
        })
    }

    /// Replace the placeholder `id` with the outcome of its request.
    /// Returns `false` if no such placeholder exists.
    pub fn resolve(&mut self, id: Uuid, outcome: AskOutcome) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| e.id == id && e.kind == EntryKind::Placeholder)
        else {
            warn!(%id, "Answer arrived for an unknown placeholder");
            return false;
        };
        self.entries.remove(index);
        if self.pending == Some(id) {
            self.pending = None;
        }

        let entry = match outcome {
            AskOutcome::Answered(answer) => {
                let text = answer
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| self.messages.fallback.clone());
                let body = self.formatter.render(&text);
                ConversationEntry::new(
                    Role::Bot,
                    EntryKind::Message,
                    text,
                    Rendering::Formatted(body),
                )
            }
            AskOutcome::Failed(detail) => {
                error!(%id, error = %detail, "Question request failed");
                ConversationEntry::new(
                    Role::Bot,
                    EntryKind::Error,
                    self.messages.error.clone(),
                    Rendering::Plain,
                )
            }
        };
        self.entries.push(entry);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Node;

    fn conversation() -> Conversation {
        Conversation::new(Formatter::default(), MessagesConfig::default())
    }

    #[test]
    fn submit_trims_and_adds_user_and_placeholder() {
        let mut conv = conversation();
        let pending = conv.submit("  **qual** o PPC?  ").unwrap();
        assert_eq!(pending.question, "**qual** o PPC?");

        let entries = conv.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].content, "**qual** o PPC?");
        assert_eq!(entries[0].rendering, Rendering::Plain);
        assert_eq!(
            entries[0].body().nodes,
            vec![Node::Text("**qual** o PPC?".into())]
        );
        assert_eq!(entries[1].kind, EntryKind::Placeholder);
        assert_eq!(entries[1].content, "Carregando resposta...");
        assert_eq!(entries[1].id, pending.id);
        assert!(conv.is_pending());
    }

    #[test]
    fn whitespace_only_submit_adds_nothing() {
        let mut conv = conversation();
        for input in ["", "   ", "\n\t "] {
            assert_eq!(conv.submit(input), Err(SubmitRejection::Empty));
        }
        assert!(conv.entries().is_empty());
        assert!(!conv.is_pending());
    }

    #[test]
    fn second_submit_while_pending_is_refused() {
        let mut conv = conversation();
        conv.submit("one").unwrap();
        assert_eq!(conv.submit("two"), Err(SubmitRejection::Busy));
        assert_eq!(conv.entries().len(), 2);
        let placeholders = conv
            .entries()
            .iter()
            .filter(|e| e.kind == EntryKind::Placeholder)
            .count();
        assert_eq!(placeholders, 1);
    }

    #[test]
    fn answer_replaces_placeholder_with_formatted_entry() {
        let mut conv = conversation();
        let pending = conv.submit("q").unwrap();
        assert!(conv.resolve(
            pending.id,
            AskOutcome::Answered(Some("**Sim**, veja www.ufrgs.br.".into()))
        ));

        let entries = conv.entries();
        assert_eq!(entries.len(), 2);
        let answer = &entries[1];
        assert_eq!(answer.role, Role::Bot);
        assert_eq!(answer.kind, EntryKind::Message);
        assert_eq!(answer.content, "**Sim**, veja www.ufrgs.br.");
        let Rendering::Formatted(body) = &answer.rendering else {
            panic!("answer should be formatted");
        };
        assert_eq!(body.links()[0].href, "https://www.ufrgs.br");
        assert!(!conv.is_pending());
    }

    #[test]
    fn missing_answer_shows_fallback() {
        let mut conv = conversation();
        let pending = conv.submit("q").unwrap();
        conv.resolve(pending.id, AskOutcome::Answered(None));
        assert_eq!(conv.entries()[1].content, "Não consegui responder.");
        assert_eq!(conv.entries()[1].body().visible_text(), "Não consegui responder.");
    }

    #[test]
    fn blank_answer_shows_fallback() {
        let mut conv = conversation();
        let pending = conv.submit("q").unwrap();
        conv.resolve(pending.id, AskOutcome::Answered(Some("  ".into())));
        assert_eq!(conv.entries()[1].content, "Não consegui responder.");
    }

    #[test]
    fn failure_leaves_exactly_one_error_entry() {
        let mut conv = conversation();
        let pending = conv.submit("q").unwrap();
        conv.resolve(pending.id, AskOutcome::Failed("connection refused".into()));

        let entries = conv.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].kind, EntryKind::Error);
        assert_eq!(entries[1].content, "Erro ao conectar ao servidor.");
        assert_eq!(entries[1].rendering, Rendering::Plain);
        assert!(entries.iter().all(|e| e.kind != EntryKind::Placeholder));
        assert!(!conv.is_pending());
    }

    #[test]
    fn widget_stays_usable_after_failure() {
        let mut conv = conversation();
        let first = conv.submit("q1").unwrap();
        conv.resolve(first.id, AskOutcome::Failed("timeout".into()));
        let second = conv.submit("q1").unwrap();
        conv.resolve(second.id, AskOutcome::Answered(Some("ok".into())));
        assert_eq!(conv.entries().len(), 4);
        assert_eq!(conv.entries()[3].content, "ok");
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut conv = conversation();
        conv.submit("q").unwrap();
        assert!(!conv.resolve(Uuid::new_v4(), AskOutcome::Answered(Some("x".into()))));
        assert_eq!(conv.entries().len(), 2);
        assert!(conv.is_pending());
    }

    #[test]
    fn custom_messages_are_used() {
        let messages = MessagesConfig {
            loading: "loading".into(),
            fallback: "no answer".into(),
            error: "offline".into(),
        };
        let mut conv = Conversation::new(Formatter::default(), messages);
        let pending = conv.submit("q").unwrap();
        assert_eq!(conv.entries()[1].content, "loading");
        conv.resolve(pending.id, AskOutcome::Failed("x".into()));
        assert_eq!(conv.entries()[1].content, "offline");
    }
}
