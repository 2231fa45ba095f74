//! Status bar at the bottom of the TUI.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct StatusBarComponent {
    /// Current status message.
    pub message: String,
    /// Whether the chat panel is open.
    pub chat_open: bool,
    /// Whether an answer is pending.
    pub pending: bool,
    /// Advances on every tick while an answer is pending.
    spinner_frame: usize,
}

impl StatusBarComponent {
    pub fn new(server: &str) -> Self {
        Self {
            message: format!("Pressione c para conversar com {server}"),
            chat_open: false,
            pending: false,
            spinner_frame: 0,
        }
    }

    /// Short state name for the pill badge.
    fn badge(&self) -> String {
        if self.pending {
            format!("{} Aguardando", SPINNER[self.spinner_frame % SPINNER.len()])
        } else if self.chat_open {
            "Chat".to_string()
        } else {
            "Inativo".to_string()
        }
    }
}

impl Component for StatusBarComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::SetStatus(msg) => {
                self.message = msg.clone();
                None
            }
            Action::ClearStatus => {
                self.message.clear();
                None
            }
            Action::Tick if self.pending => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;

        // Right side: compact key hints
        let hints = "q·?·c·Tab·o";
        let hints_len = hints.chars().count() + 1; // +1 for trailing space

        let badge = self.badge();
        let badge_len = badge.chars().count() + 2; // spaces around badge

        // Truncate message to remaining space
        let msg_budget = width
            .saturating_sub(badge_len)
            .saturating_sub(hints_len)
            .saturating_sub(4); // separators and spacing

        let msg_len = self.message.chars().count();
        let msg = if msg_len > msg_budget {
            if msg_budget > 3 {
                let head: String = self.message.chars().take(msg_budget - 3).collect();
                format!("{head}...")
            } else {
                String::new()
            }
        } else {
            self.message.clone()
        };

        // Pad to push hints to the right edge
        let used = badge_len + 2 + msg.chars().count();
        let pad = width.saturating_sub(used + hints_len);

        let line = Line::from(vec![
            Span::styled(format!(" {badge} "), Theme::muted()),
            Span::styled("  ", Theme::dim()),
            Span::styled(msg, Theme::status_bar()),
            Span::raw(" ".repeat(pad)),
            Span::styled(hints, Theme::key_hint()),
            Span::raw(" "),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_actions_update_message() {
        let mut bar = StatusBarComponent::new("http://127.0.0.1:5000");
        bar.handle_action(&Action::SetStatus("Não há links".into()));
        assert_eq!(bar.message, "Não há links");
        bar.handle_action(&Action::ClearStatus);
        assert!(bar.message.is_empty());
    }

    #[test]
    fn badge_reflects_state() {
        let mut bar = StatusBarComponent::new("x");
        assert_eq!(bar.badge(), "Inativo");
        bar.chat_open = true;
        assert_eq!(bar.badge(), "Chat");
        bar.pending = true;
        let first = bar.badge();
        bar.handle_action(&Action::Tick);
        assert_ne!(bar.badge(), first);
        assert!(first.ends_with("Aguardando"));
    }
}
