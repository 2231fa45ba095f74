//! Help overlay — keybinding reference.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct HelpComponent {
    pub visible: bool,
}

impl HelpComponent {
    pub fn new() -> Self {
        Self { visible: false }
    }

    fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
        let vertical = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .flex(Flex::Center)
        .split(area);

        let horizontal = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .flex(Flex::Center)
        .split(vertical[1]);

        horizontal[1]
    }
}

impl Component for HelpComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ToggleHelp => {
                self.visible = !self.visible;
                None
            }
            Action::Tick | Action::AnswerReceived { .. } | Action::SetStatus(_) => None,
            _ if self.visible => {
                // Any key closes help.
                self.visible = false;
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let dialog = Self::centered_rect(area, 55, 20);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Ajuda · Atalhos ")
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_style(Theme::border_focused());

        let help_text = vec![
            Line::from(""),
            key_line("q / Ctrl+C", "Sair"),
            key_line("?", "Mostrar / ocultar esta ajuda"),
            key_line("c / clique no botão", "Abrir / fechar o chat"),
            key_line("i / Enter", "Focar a linha de pergunta"),
            key_line("↑ / ↓ / j / k", "Rolar mensagens"),
            key_line("Tab / l", "Selecionar próximo link"),
            key_line("o", "Abrir link selecionado"),
            Line::from(""),
            Line::from(Span::styled("── Digitando ──", Theme::header())),
            Line::from(""),
            key_line("Enter / clique Enviar", "Enviar a pergunta"),
            key_line("Esc", "Sair da linha de pergunta"),
            key_line("Ctrl+W", "Apagar palavra anterior"),
            key_line("Ctrl+O", "Abrir link selecionado"),
            key_line("Tab", "Selecionar próximo link"),
        ];

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, dialog);
    }
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<22}", key), Theme::selected()),
        Span::styled(desc, Theme::normal()),
    ])
}
