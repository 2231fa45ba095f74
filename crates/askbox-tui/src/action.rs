//! Action enum — the central message bus for the TUI.
//! All user interactions and async results flow through here.

use askbox_core::{AskOutcome, PendingQuestion};
use uuid::Uuid;

/// Every possible action that can occur in the application.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Global ──────────────────────────────────────────────
    /// Quit the application.
    Quit,
    /// Toggle help overlay.
    ToggleHelp,
    /// Display a status message in the status bar.
    SetStatus(String),
    /// Clear the status message.
    ClearStatus,
    /// A tick event for animations and polling.
    Tick,

    // ── Chat panel ──────────────────────────────────────────
    /// Open or close the chat panel.
    ToggleChat,
    /// Move focus into the input line (panel must be open).
    FocusInput,
    /// Leave the input line without closing the panel.
    Unfocus,
    /// A question was accepted and must be sent to the backend.
    Ask(PendingQuestion),
    /// The request for placeholder `id` finished.
    AnswerReceived { id: Uuid, outcome: AskOutcome },
    /// Select the next link in the conversation.
    NextLink,
    /// Open the selected link in the system browser.
    OpenLink,

    // ── Text Input ───────────────────────────────────────────
    /// A character was typed (only sent when in input mode).
    CharInput(char),
    /// Backspace pressed (only sent when in input mode).
    BackspaceInput,
    /// Delete word (Ctrl+W).
    DeleteWord,
    CursorLeft,
    CursorRight,
    /// Submit the typed question (Enter in editing mode).
    SubmitForm,
    /// Bulk paste from bracketed paste mode (terminal sends entire text at once).
    PasteBulk(String),

    // ── Scrolling / Mouse ───────────────────────────────────
    ScrollUp,
    ScrollDown,
    /// Left mouse button pressed at a terminal cell.
    Click { column: u16, row: u16 },
}

/// Whether the app is in a text-input mode where raw keys should
/// be forwarded to the active component instead of interpreted as
/// global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal mode — keys are global shortcuts.
    Normal,
    /// Text input mode — keys go to the focused text field.
    Editing,
}
