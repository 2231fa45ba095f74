use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use askbox_core::AskboxConfig;

/// askbox — a terminal chat widget for a question/answer endpoint.
///
/// Opens a small chat panel, sends each question as `POST /ask` and shows the
/// answer with bold text, bullet lists and clickable links.
#[derive(Parser, Debug)]
#[command(name = "askbox", version, about)]
struct Cli {
    /// Base URL of the backend (overrides the config file).
    #[arg(short, long)]
    server: Option<String>,

    /// Path to a config file (defaults to ~/.config/askbox/config.toml).
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Start with the chat panel open.
    #[arg(long)]
    open: bool,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Log to a file to avoid corrupting the TUI output. If the log file
    // can't be opened, silently discard logs rather than polluting the
    // alternate screen buffer.
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("askbox");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_path = log_dir.join("askbox.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
                )
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            // Fallback: discard all logs to avoid TUI corruption.
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .with_writer(std::io::sink)
                .init();
        }
    }

    // Load config.
    let loaded = match cli.config {
        Some(ref path) => AskboxConfig::load_from(path),
        None => AskboxConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        AskboxConfig::default()
    });
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    tracing::info!("Starting askbox v{}", env!("CARGO_PKG_VERSION"));

    let mut app = askbox_tui::App::new(&config)?;
    if cli.open {
        app.open_chat();
    }

    app.run().await?;

    tracing::info!("askbox exited cleanly");
    Ok(())
}
