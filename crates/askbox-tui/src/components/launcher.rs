//! Launcher button that opens and closes the chat panel.

use std::cell::Cell;

use ratatui::layout::{Alignment, Position, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct LauncherComponent {
    /// Mirrors the panel's visibility so the label can flip.
    pub chat_open: bool,
    area: Cell<Rect>,
}

impl LauncherComponent {
    pub fn new() -> Self {
        Self {
            chat_open: false,
            area: Cell::new(Rect::default()),
        }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area.get().contains(Position::new(column, row))
    }
}

impl Component for LauncherComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::Click { column, row } if self.contains(*column, *row) => {
                Some(Action::ToggleChat)
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        self.area.set(area);
        let label = if self.chat_open { "✕ Fechar" } else { "💬 Chat" };
        let button = Paragraph::new(Span::styled(label, Theme::button()))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border_focused()),
            );
        frame.render_widget(button, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn click_inside_toggles_chat() {
        let launcher = LauncherComponent::new();
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        terminal
            .draw(|frame| launcher.render(frame, Rect::new(10, 5, 12, 3)))
            .unwrap();

        let mut launcher = launcher;
        assert!(matches!(
            launcher.handle_action(&Action::Click { column: 12, row: 6 }),
            Some(Action::ToggleChat)
        ));
        assert!(launcher
            .handle_action(&Action::Click { column: 2, row: 1 })
            .is_none());
    }
}
