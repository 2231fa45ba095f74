//! Turns conversation entries into ratatui lines.
//!
//! Every piece of text goes through `Span`, which draws characters and never
//! interprets markup. Control characters are replaced before they reach the
//! terminal so an answer cannot smuggle escape sequences.

use askbox_core::conversation::{ConversationEntry, EntryKind, Role};
use askbox_core::format::{MessageBody, Node};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Shown in place of a control character.
const REPLACEMENT: char = '\u{FFFD}';

/// Accumulates lines for a run of entries. Links are numbered in the order
/// they are drawn so the selection can be matched against them.
pub struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    next_link: usize,
    selected_link: Option<usize>,
    /// Nothing has been drawn since the last header.
    fresh: bool,
}

impl LineBuilder {
    pub fn new(selected_link: Option<usize>) -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            next_link: 0,
            selected_link,
            fresh: true,
        }
    }

    /// Draw one entry: a header line, the body, then a blank separator.
    pub fn push_entry(&mut self, entry: &ConversationEntry) {
        let who = match entry.role {
            Role::User => "Você",
            Role::Bot => "Assistente",
        };
        self.lines.push(Line::from(vec![
            Span::styled(who, Theme::header()),
            Span::styled(
                format!(" · {}", entry.created_at.format("%H:%M")),
                Theme::dim(),
            ),
        ]));
        self.fresh = true;

        let base = match (entry.role, entry.kind) {
            (Role::User, _) => Theme::user_message(),
            (_, EntryKind::Placeholder) => Theme::placeholder(),
            (_, EntryKind::Error) => Theme::error_message(),
            (Role::Bot, EntryKind::Message) => Theme::normal(),
        };
        self.push_body(&entry.body(), base);
        self.break_line();
        self.lines.push(Line::default());
    }

    pub fn push_body(&mut self, body: &MessageBody, base: Style) {
        self.push_nodes(&body.nodes, base);
    }

    fn push_nodes(&mut self, nodes: &[Node], style: Style) {
        for node in nodes {
            match node {
                Node::Text(text) => self.push_span(text, style),
                Node::Strong(children) => {
                    self.push_nodes(children, style.add_modifier(Modifier::BOLD));
                }
                Node::Link(link) => {
                    let link_style = if self.selected_link == Some(self.next_link) {
                        Theme::link_selected()
                    } else {
                        Theme::link()
                    };
                    self.next_link += 1;
                    self.push_span(&link.cleaned, style.patch(link_style));
                }
                // A break before any text would only add an empty line.
                Node::LineBreak if self.fresh => {}
                Node::LineBreak => self.break_line(),
                Node::Bullet(glyph) => {
                    self.push_span(&format!("{glyph} "), Theme::bullet());
                }
            }
        }
    }

    fn push_span(&mut self, text: &str, style: Style) {
        self.fresh = false;
        self.current.push(Span::styled(sanitize(text), style));
    }

    fn break_line(&mut self) {
        self.fresh = false;
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    pub fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() {
            self.break_line();
        }
        self.lines
    }
}

/// Replace control characters; tabs become a single space.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if c.is_control() => REPLACEMENT,
            c => c,
        })
        .collect()
}
