//! Main application state and render loop.

use crossterm::{
    cursor::Show,
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use askbox_client::AskClient;
use askbox_core::{AskOutcome, AskboxConfig, Conversation, Formatter, PendingQuestion};

use crate::action::{Action, InputMode};
use crate::components::chat_panel::ChatPanelComponent;
use crate::components::help::HelpComponent;
use crate::components::launcher::LauncherComponent;
use crate::components::status_bar::StatusBarComponent;
use crate::components::Component;
use crate::event::{self, EventHandler, InputModeFlag};
use crate::theme::Theme;

const LAUNCHER_WIDTH: u16 = 14;
const LAUNCHER_HEIGHT: u16 = 3;
const PANEL_MAX_WIDTH: u16 = 64;
const PANEL_MAX_HEIGHT: u16 = 26;

/// Main application state.
pub struct App {
    /// Whether the app should exit.
    should_quit: bool,
    /// Shared flag to tell the EventHandler which key-mapping to use.
    input_mode_flag: InputModeFlag,
    /// HTTP client for the question endpoint (shared across async tasks).
    client: Arc<AskClient>,

    // Components
    chat: ChatPanelComponent,
    launcher: LauncherComponent,
    status_bar: StatusBarComponent,
    help: HelpComponent,
}

impl App {
    pub fn new(config: &AskboxConfig) -> anyhow::Result<Self> {
        let formatter = Formatter::new(config.format.clone())?;
        let conversation = Conversation::new(formatter, config.messages.clone());
        let client = Arc::new(AskClient::new(
            config.server.ask_url(),
            config.server.timeout(),
        ));

        Ok(Self {
            should_quit: false,
            input_mode_flag: event::new_input_mode_flag(),
            status_bar: StatusBarComponent::new(client.ask_url()),
            client,
            chat: ChatPanelComponent::new(conversation),
            launcher: LauncherComponent::new(),
            help: HelpComponent::new(),
        })
    }

    /// Start with the chat panel already open.
    pub fn open_chat(&mut self) {
        if !self.chat.open {
            self.chat.toggle_open();
            self.sync_panel_state();
        }
    }

    /// Run the TUI application.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let _session = TerminalSession::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        // Create the action channel.
        let (tx, rx) = mpsc::unbounded_channel::<Action>();

        // Start the event handler with the shared input mode flag.
        let event_tx = tx.clone();
        let mode_flag = self.input_mode_flag.clone();
        let event_handler = EventHandler::new(event_tx, Duration::from_millis(100), mode_flag);
        tokio::spawn(async move {
            event_handler.run().await;
        });

        self.sync_input_mode();
        info!(url = %self.client.ask_url(), "Chat widget ready");

        self.main_loop(&mut terminal, rx, &tx).await?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Draw, wait for the next action, dispatch it. Returns on quit or when
    /// every sender is gone.
    async fn main_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        mut rx: mpsc::UnboundedReceiver<Action>,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> anyhow::Result<()> {
        loop {
            terminal.draw(|frame| {
                self.render(frame);
            })?;

            let Some(action) = rx.recv().await else {
                return Ok(());
            };
            self.handle_action(&action, tx);
            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Determine and set the correct input mode. Called after every action.
    fn sync_input_mode(&self) {
        event::set_input_mode(&self.input_mode_flag, self.current_input_mode());
    }

    fn current_input_mode(&self) -> InputMode {
        // Help overlay keeps normal mode so any key can close it.
        if self.help.visible {
            return InputMode::Normal;
        }
        if self.chat.wants_input() {
            InputMode::Editing
        } else {
            InputMode::Normal
        }
    }

    /// Copy panel state into the components that mirror it.
    fn sync_panel_state(&mut self) {
        self.launcher.chat_open = self.chat.open;
        self.status_bar.chat_open = self.chat.open;
        self.status_bar.pending = self.chat.conversation().is_pending();
    }

    /// Dispatch an action to all relevant components.
    fn handle_action(&mut self, action: &Action, tx: &mpsc::UnboundedSender<Action>) {
        // While help is shown, input only closes it.
        if self.help.visible && is_user_input(action) {
            self.help.handle_action(action);
            if matches!(action, Action::Quit) {
                self.should_quit = true;
            }
            self.sync_input_mode();
            return;
        }

        // Global actions first.
        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::Ask(pending) => {
                self.spawn_ask(pending.clone(), tx.clone());
            }
            Action::OpenLink => {
                self.spawn_open_link(tx.clone());
            }
            _ => {}
        }

        let result = match action {
            Action::Click { column, row } if self.launcher.contains(*column, *row) => {
                self.launcher.handle_action(action)
            }
            // A click anywhere else releases the input line.
            Action::Click { column, row } if !self.chat.contains(*column, *row) => {
                self.chat.handle_action(&Action::Unfocus)
            }
            _ => self.chat.handle_action(action),
        };

        self.help.handle_action(action);
        self.status_bar.handle_action(action);

        self.sync_panel_state();
        self.sync_input_mode();

        // Handle chained actions from components.
        if let Some(chained) = result {
            self.handle_action(&chained, tx);
        }
    }

    // ── Async task spawners ─────────────────────────────────────

    /// Spawn a task that sends the question and reports back with
    /// `AnswerReceived`. Errors never leave the task.
    fn spawn_ask(&self, pending: PendingQuestion, tx: mpsc::UnboundedSender<Action>) {
        let client = self.client.clone();
        let _ = tx.send(Action::SetStatus("Aguardando resposta...".to_string()));

        tokio::spawn(async move {
            let outcome = match client.ask(&pending.question).await {
                Ok(resp) => {
                    info!(id = %pending.id, "Answer received");
                    AskOutcome::Answered(resp.answer_text().map(str::to_string))
                }
                Err(e) => AskOutcome::Failed(format!("{e:#}")),
            };
            let status = match outcome {
                AskOutcome::Answered(_) => "Resposta recebida",
                AskOutcome::Failed(_) => "Falha na requisição, veja o log",
            };
            let _ = tx.send(Action::AnswerReceived {
                id: pending.id,
                outcome,
            });
            let _ = tx.send(Action::SetStatus(status.to_string()));
        });
    }

    /// Open the selected link in the system browser. The browser runs as its
    /// own process, so the page gets a fresh context and no referrer.
    fn spawn_open_link(&self, tx: mpsc::UnboundedSender<Action>) {
        let Some(link) = self.chat.selected_link() else {
            let _ = tx.send(Action::SetStatus(
                "Selecione um link com Tab primeiro".to_string(),
            ));
            return;
        };

        tokio::task::spawn_blocking(move || match open::that(&link.href) {
            Ok(()) => {
                info!(href = %link.href, "Opened link");
                let _ = tx.send(Action::SetStatus(format!("Aberto: {}", link.href)));
            }
            Err(e) => {
                warn!(href = %link.href, "Failed to open link: {}", e);
                let _ = tx.send(Action::SetStatus(format!(
                    "Não foi possível abrir o link: {e}"
                )));
            }
        });
    }

    // ── Rendering ───────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let [main, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

        self.render_backdrop(frame, main);

        let (launcher_area, panel_area) = widget_areas(main);
        self.chat.render(frame, panel_area);
        self.launcher.render(frame, launcher_area);
        self.status_bar.render(frame, status);
        self.help.render(frame, frame.area());
    }

    fn render_backdrop(&self, frame: &mut Frame, area: Rect) {
        let [center] = Layout::vertical([Constraint::Length(4)])
            .flex(Flex::Center)
            .areas(area);
        let text = vec![
            Line::from(Span::styled("askbox", Theme::title())),
            Line::from(""),
            Line::from(Span::styled(
                "Pressione c ou clique no botão para abrir o chat",
                Theme::muted(),
            )),
            Line::from(Span::styled(self.client.ask_url().to_string(), Theme::dim())),
        ];
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), center);
    }
}

/// Raw mode and the alternate screen for the lifetime of the value. Dropping
/// it restores the terminal, on error and panic paths as well.
struct TerminalSession;

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let session = Self;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to leave raw mode: {}", e);
        }
        if let Err(e) = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste,
            Show
        ) {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Launcher in the bottom-right corner of `main`, panel stacked above it.
fn widget_areas(main: Rect) -> (Rect, Rect) {
    let launcher_width = LAUNCHER_WIDTH.min(main.width);
    let launcher_height = LAUNCHER_HEIGHT.min(main.height);
    let launcher = Rect::new(
        main.right().saturating_sub(launcher_width + 1).max(main.x),
        main.bottom().saturating_sub(launcher_height),
        launcher_width,
        launcher_height,
    );

    let panel_width = PANEL_MAX_WIDTH.min(main.width.saturating_sub(2));
    let panel_height = PANEL_MAX_HEIGHT.min(launcher.y.saturating_sub(main.y));
    let panel = Rect::new(
        main.right().saturating_sub(panel_width + 1).max(main.x),
        launcher.y.saturating_sub(panel_height),
        panel_width,
        panel_height,
    );

    (launcher.intersection(main), panel.intersection(main))
}

/// Actions that come from the keyboard or mouse rather than from tasks.
fn is_user_input(action: &Action) -> bool {
    !matches!(
        action,
        Action::Tick
            | Action::SetStatus(_)
            | Action::ClearStatus
            | Action::Ask(_)
            | Action::AnswerReceived { .. }
    )
}
