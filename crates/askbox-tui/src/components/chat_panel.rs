//! The chat panel: message list, input line and send button.
//!
//! Features:
//! - Opens and closes from the launcher; opening focuses the input line
//! - Enter or a click on the send button submits the typed question
//! - The message list sticks to the bottom whenever an entry is added
//! - Tab cycles through links in the conversation, Ctrl+O / `o` opens one
//! - The send button is disabled while an answer is pending

use std::cell::Cell;

use askbox_core::conversation::SubmitRejection;
use askbox_core::format::LinkSpan;
use askbox_core::Conversation;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::action::Action;
use crate::components::message_view::{sanitize, LineBuilder};
use crate::components::Component;
use crate::theme::Theme;

/// Width of the send button, borders included.
const SEND_BUTTON_WIDTH: u16 = 10;

pub struct ChatPanelComponent {
    /// Whether the panel is visible.
    pub open: bool,
    /// Whether the input line has focus.
    focused: bool,
    /// Current input text (single line).
    input: String,
    /// Cursor position (byte offset) within the input.
    cursor: usize,
    conversation: Conversation,
    /// Lines scrolled up from the bottom of the message list.
    scroll_back: u16,
    /// Index of the selected link, counted over the whole conversation.
    selected_link: Option<usize>,

    // ── Layout recorded at render time ──────────────────────
    panel_area: Cell<Rect>,
    input_area: Cell<Rect>,
    send_area: Cell<Rect>,
    /// Largest useful `scroll_back` for the last rendered size.
    max_scroll: Cell<u16>,
}

impl ChatPanelComponent {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            open: false,
            focused: false,
            input: String::new(),
            cursor: 0,
            conversation,
            scroll_back: 0,
            selected_link: None,
            panel_area: Cell::new(Rect::default()),
            input_area: Cell::new(Rect::default()),
            send_area: Cell::new(Rect::default()),
            max_scroll: Cell::new(0),
        }
    }

    /// Whether this component wants to capture raw key input.
    pub fn wants_input(&self) -> bool {
        self.open && self.focused
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether `column,row` falls inside the panel as last drawn.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.open && self.panel_area.get().contains(Position::new(column, row))
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
        self.focused = self.open;
        if self.open {
            self.scroll_to_bottom();
        }
    }

    /// All links in the conversation, in drawing order.
    pub fn links(&self) -> Vec<LinkSpan> {
        self.conversation
            .entries()
            .iter()
            .flat_map(|e| e.body().links().into_iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// The link picked with Tab, if any.
    pub fn selected_link(&self) -> Option<LinkSpan> {
        let index = self.selected_link?;
        self.links().into_iter().nth(index)
    }

    fn select_next_link(&mut self) -> Option<Action> {
        let count = self.links().len();
        if count == 0 {
            self.selected_link = None;
            return Some(Action::SetStatus("Nenhum link na conversa".to_string()));
        }
        let next = match self.selected_link {
            Some(i) if i + 1 < count => i + 1,
            _ => 0,
        };
        self.selected_link = Some(next);
        self.selected_link()
            .map(|link| Action::SetStatus(format!("Link {}/{}: {}", next + 1, count, link.href)))
    }

    fn submit(&mut self) -> Option<Action> {
        match self.conversation.submit(&self.input) {
            Ok(pending) => {
                self.input.clear();
                self.cursor = 0;
                self.focused = true;
                self.scroll_to_bottom();
                Some(Action::Ask(pending))
            }
            Err(SubmitRejection::Empty) => None,
            Err(SubmitRejection::Busy) => Some(Action::SetStatus(
                "Aguardando a resposta anterior".to_string(),
            )),
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }

    fn clamp_cursor(&mut self) {
        if self.cursor > self.input.len() {
            self.cursor = self.input.len();
        }
    }

    fn insert_str(&mut self, s: &str) {
        self.clamp_cursor();
        // The input is a single line.
        let cleaned: String = s
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .filter(|c| !c.is_control())
            .collect();
        self.input.insert_str(self.cursor, &cleaned);
        self.cursor += cleaned.len();
    }

    fn delete_char(&mut self) {
        self.clamp_cursor();
        if let Some((prev, _)) = self.input[..self.cursor].char_indices().next_back() {
            self.input.remove(prev);
            self.cursor = prev;
        }
    }

    /// Delete the word before the cursor (Ctrl+W).
    fn delete_word(&mut self) {
        self.clamp_cursor();
        let before = &self.input[..self.cursor];
        let trimmed = before.trim_end_matches(' ');
        let start = trimmed.rfind(' ').map(|i| i + 1).unwrap_or(0);
        self.input.drain(start..self.cursor);
        self.cursor = start;
    }

    fn cursor_left(&mut self) {
        self.clamp_cursor();
        if let Some((prev, _)) = self.input[..self.cursor].char_indices().next_back() {
            self.cursor = prev;
        }
    }

    fn cursor_right(&mut self) {
        self.clamp_cursor();
        if let Some(c) = self.input[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) -> Option<Action> {
        if !self.open {
            return None;
        }
        let at = Position::new(column, row);
        if self.send_area.get().contains(at) {
            self.focused = true;
            return self.submit();
        }
        if self.input_area.get().contains(at) {
            self.focused = true;
        }
        None
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect) {
        let entries = self.conversation.entries();
        let lines = if entries.is_empty() {
            vec![
                Line::from(""),
                Line::from(Span::styled(" Faça uma pergunta para começar.", Theme::dim())),
            ]
        } else {
            let mut builder = LineBuilder::new(self.selected_link);
            for entry in entries {
                builder.push_entry(entry);
            }
            builder.finish()
        };

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        let total = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
        let max = total.saturating_sub(area.height);
        self.max_scroll.set(max);
        let offset = max - self.scroll_back.min(max);

        frame.render_widget(paragraph.scroll((offset, 0)), area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Pergunta ")
            .title_style(if self.focused {
                Theme::title()
            } else {
                Theme::muted()
            })
            .borders(Borders::ALL)
            .border_style(if self.focused {
                Theme::border_focused()
            } else {
                Theme::border()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Keep the cursor visible by showing the tail of long input.
        let width = usize::from(inner.width.max(1));
        let before_cursor = self.input[..self.cursor.min(self.input.len())].chars().count();
        let skip = (before_cursor + 1).saturating_sub(width);
        let visible: String = self.input.chars().skip(skip).take(width).collect();
        frame.render_widget(
            Paragraph::new(Span::styled(sanitize(&visible), Theme::normal())),
            inner,
        );

        if self.focused {
            let col = u16::try_from(before_cursor - skip).unwrap_or(0);
            frame.set_cursor_position(Position::new(inner.x + col, inner.y));
        }
    }

    fn render_send(&self, frame: &mut Frame, area: Rect) {
        let enabled = !self.conversation.is_pending();
        let style = if enabled {
            Theme::button()
        } else {
            Theme::button_disabled()
        };
        let button = Paragraph::new(Span::styled("Enviar", style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(if enabled { Theme::border_focused() } else { Theme::border() }),
            );
        frame.render_widget(button, area);
    }
}

impl Component for ChatPanelComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ToggleChat => {
                self.toggle_open();
                None
            }
            Action::FocusInput if self.open => {
                self.focused = true;
                None
            }
            Action::Unfocus => {
                self.focused = false;
                None
            }
            Action::AnswerReceived { id, outcome } => {
                if self.conversation.resolve(*id, outcome.clone()) {
                    self.scroll_to_bottom();
                }
                None
            }
            Action::Click { column, row } => self.handle_click(*column, *row),
            Action::ScrollUp if self.open => {
                self.scroll_back = self.scroll_back.saturating_add(1).min(self.max_scroll.get());
                None
            }
            Action::ScrollDown if self.open => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
                None
            }
            Action::NextLink if self.open => self.select_next_link(),
            _ if !self.wants_input() => None,

            // ── Input line (focused only) ───────────────────────
            Action::SubmitForm => self.submit(),
            Action::CharInput(c) => {
                self.insert_str(c.encode_utf8(&mut [0; 4]));
                None
            }
            Action::PasteBulk(text) => {
                self.insert_str(text);
                None
            }
            Action::BackspaceInput => {
                self.delete_char();
                None
            }
            Action::DeleteWord => {
                self.delete_word();
                None
            }
            Action::CursorLeft => {
                self.cursor_left();
                None
            }
            Action::CursorRight => {
                self.cursor_right();
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        self.panel_area.set(area);
        if !self.open {
            return;
        }
        frame.render_widget(Clear, area);

        let title = if self.conversation.is_pending() {
            " Chat · aguardando resposta "
        } else {
            " Chat "
        };
        let block = Block::default()
            .title(title)
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_style(if self.focused {
                Theme::border_focused()
            } else {
                Theme::border()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [messages, input_row] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(inner);
        let [input, send] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(SEND_BUTTON_WIDTH)])
                .areas(input_row);

        self.input_area.set(input);
        self.send_area.set(send);

        self.render_messages(frame, messages);
        self.render_input(frame, input);
        self.render_send(frame, send);
    }
}
