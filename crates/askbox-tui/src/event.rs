//! Terminal event handling — captures keyboard, mouse, and resize events
//! from crossterm and dispatches them as Actions.
//!
//! The handler operates in two modes:
//! - Normal: keys are mapped to global shortcuts (quit, toggle chat, scroll).
//! - Editing: keys are forwarded as raw CharInput/BackspaceInput so the
//!   chat input line can receive typed characters.
//!
//! The current InputMode is shared between the App and EventHandler via
//! an Arc<AtomicU8>.

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::{Stream, StreamExt};
use std::io;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

use crate::action::{Action, InputMode};

/// Encode InputMode as u8 for atomic sharing.
const MODE_NORMAL: u8 = 0;
const MODE_EDITING: u8 = 1;

/// Shared flag the App sets so the EventHandler knows which keymap to use.
pub type InputModeFlag = Arc<AtomicU8>;

pub fn new_input_mode_flag() -> InputModeFlag {
    Arc::new(AtomicU8::new(MODE_NORMAL))
}

pub fn set_input_mode(flag: &InputModeFlag, mode: InputMode) {
    let val = match mode {
        InputMode::Normal => MODE_NORMAL,
        InputMode::Editing => MODE_EDITING,
    };
    flag.store(val, Ordering::Relaxed);
}

fn get_input_mode(flag: &InputModeFlag) -> InputMode {
    match flag.load(Ordering::Relaxed) {
        MODE_EDITING => InputMode::Editing,
        _ => InputMode::Normal,
    }
}

/// Event loop that reads terminal events and sends Actions.
pub struct EventHandler {
    tx: mpsc::UnboundedSender<Action>,
    tick_rate: Duration,
    mode_flag: InputModeFlag,
}

impl EventHandler {
    pub fn new(
        tx: mpsc::UnboundedSender<Action>,
        tick_rate: Duration,
        mode_flag: InputModeFlag,
    ) -> Self {
        Self {
            tx,
            tick_rate,
            mode_flag,
        }
    }

    /// Run the event loop. This blocks and should be spawned in a task.
    ///
    /// A single `EventStream` owns the terminal reader for the whole run, so
    /// an event read from the terminal is always delivered.
    pub async fn run(&self) {
        self.run_with(EventStream::new()).await;
    }

    async fn run_with<S>(&self, mut events: S)
    where
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        let mut interval = tokio::time::interval(self.tick_rate);

        loop {
            let action = tokio::select! {
                _ = interval.tick() => Some(Action::Tick),
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => self.map_event(event),
                    Some(Err(e)) => {
                        warn!("Terminal event error: {}", e);
                        None
                    }
                    None => break,
                },
            };

            if let Some(action) = action {
                if self.tx.send(action).is_err() {
                    break;
                }
            }
        }
    }

    fn map_event(&self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.map_key(key),
            Event::Mouse(mouse) => map_mouse(mouse),
            Event::Paste(text) => Some(Action::PasteBulk(text)),
            Event::Resize(_, _) => Some(Action::Tick),
            _ => None,
        }
    }

    fn map_key(&self, key: KeyEvent) -> Option<Action> {
        // Ctrl+C always quits regardless of mode.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match get_input_mode(&self.mode_flag) {
            InputMode::Editing => map_key_editing(key),
            InputMode::Normal => map_key_normal(key),
        }
    }
}

/// Key mapping when the input line is focused. Most keys become character
/// input; only a few are reserved for navigation.
fn map_key_editing(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('w') => Some(Action::DeleteWord),
            KeyCode::Char('o') => Some(Action::OpenLink),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(Action::Unfocus),
        KeyCode::Enter => Some(Action::SubmitForm),
        KeyCode::Tab => Some(Action::NextLink),
        KeyCode::Up => Some(Action::ScrollUp),
        KeyCode::Down => Some(Action::ScrollDown),
        KeyCode::Left => Some(Action::CursorLeft),
        KeyCode::Right => Some(Action::CursorRight),
        KeyCode::Backspace => Some(Action::BackspaceInput),
        KeyCode::Char(c) => Some(Action::CharInput(c)),
        _ => None,
    }
}

/// Key mapping in normal mode — global shortcuts.
fn map_key_normal(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('c') => Some(Action::ToggleChat),
        KeyCode::Char('i') | KeyCode::Enter => Some(Action::FocusInput),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::Tab | KeyCode::Char('l') => Some(Action::NextLink),
        KeyCode::Char('o') => Some(Action::OpenLink),
        KeyCode::Esc => Some(Action::ClearStatus),
        _ => None,
    }
}

fn map_mouse(mouse: MouseEvent) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::Click {
            column: mouse.column,
            row: mouse.row,
        }),
        MouseEventKind::ScrollUp => Some(Action::ScrollUp),
        MouseEventKind::ScrollDown => Some(Action::ScrollDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(mode: InputMode) -> EventHandler {
        let (tx, _rx) = mpsc::unbounded_channel();
        let flag = new_input_mode_flag();
        set_input_mode(&flag, mode);
        EventHandler::new(tx, Duration::from_millis(100), flag)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn letters_are_shortcuts_in_normal_mode() {
        let h = handler(InputMode::Normal);
        assert!(matches!(h.map_event(key(KeyCode::Char('c'))), Some(Action::ToggleChat)));
        assert!(matches!(h.map_event(key(KeyCode::Char('q'))), Some(Action::Quit)));
        assert!(matches!(h.map_event(key(KeyCode::Char('o'))), Some(Action::OpenLink)));
    }

    #[test]
    fn letters_are_text_in_editing_mode() {
        let h = handler(InputMode::Editing);
        assert!(matches!(
            h.map_event(key(KeyCode::Char('q'))),
            Some(Action::CharInput('q'))
        ));
        assert!(matches!(h.map_event(key(KeyCode::Enter)), Some(Action::SubmitForm)));
        assert!(matches!(h.map_event(key(KeyCode::Esc)), Some(Action::Unfocus)));
    }

    #[test]
    fn ctrl_c_quits_in_both_modes() {
        for mode in [InputMode::Normal, InputMode::Editing] {
            let h = handler(mode);
            let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
            assert!(matches!(h.map_event(event), Some(Action::Quit)));
        }
    }

    #[test]
    fn mode_flag_switches_keymap() {
        let h = handler(InputMode::Normal);
        set_input_mode(&h.mode_flag, InputMode::Editing);
        assert!(matches!(
            h.map_event(key(KeyCode::Char('c'))),
            Some(Action::CharInput('c'))
        ));
    }

    #[test]
    fn left_click_carries_position() {
        let h = handler(InputMode::Normal);
        let event = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert!(matches!(
            h.map_event(event),
            Some(Action::Click { column: 7, row: 3 })
        ));
    }

    #[test]
    fn paste_is_forwarded() {
        let h = handler(InputMode::Editing);
        assert!(matches!(
            h.map_event(Event::Paste("abc".into())),
            Some(Action::PasteBulk(text)) if text == "abc"
        ));
    }

    #[tokio::test]
    async fn every_typed_character_is_delivered() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let flag = new_input_mode_flag();
        set_input_mode(&flag, InputMode::Editing);
        // A tick rate this short makes ticks race every event.
        let h = EventHandler::new(tx, Duration::from_millis(1), flag);

        let typed = "qual o prazo?";
        let events = futures::stream::iter(
            typed
                .chars()
                .map(|c| Ok(key(KeyCode::Char(c))))
                .collect::<Vec<io::Result<Event>>>(),
        );
        // The stream ends after the last key, which ends the loop.
        h.run_with(events).await;

        let mut received = String::new();
        while let Ok(action) = rx.try_recv() {
            if let Action::CharInput(c) = action {
                received.push(c);
            }
        }
        assert_eq!(received, typed);
    }

    #[tokio::test]
    async fn stream_errors_are_skipped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let h = EventHandler::new(tx, Duration::from_secs(60), new_input_mode_flag());
        let events = futures::stream::iter(vec![
            Err(io::Error::other("tty gone")),
            Ok(key(KeyCode::Char('c'))),
        ]);
        h.run_with(events).await;

        let actions: Vec<Action> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(actions.iter().any(|a| matches!(a, Action::ToggleChat)));
    }
}
