use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use clap::{Parser, Subcommand};
use docchat_core::{Config, HttpBackend};

mod app;
mod cli;
mod handler;
mod logging;
mod tui;
mod ui;

#[cfg(test)]
mod test_support;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "docchat", version)]
#[command(about = "Upload a PDF and ask questions about it")]
struct Cli {
    /// Document server URL
    #[arg(long, env = "DOCCHAT_SERVER", global = true)]
    server: Option<String>,

    /// Request timeout in seconds (0 for none)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat screen (default)
    Tui {
        /// Pre-fill the file field
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Upload a document and exit
    Upload {
        path: PathBuf,
    },
    /// Ask a single question about the uploaded document
    Ask {
        question: String,
    },
    /// Ask questions line by line until 'q'
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let server_url = config.server_url(cli.server.as_deref());
    let backend = HttpBackend::with_timeout(&server_url, config.timeout(cli.timeout))?;

    match cli.command.unwrap_or(Commands::Tui { file: None }) {
        Commands::Tui { file } => {
            let _guard = logging::init_file()?;
            tracing::info!(server = %server_url, "starting chat screen");
            run_tui(backend, file).await
        }
        Commands::Upload { path } => {
            logging::init_stderr()?;
            cli::upload(&backend, &path).await
        }
        Commands::Ask { question } => {
            logging::init_stderr()?;
            cli::ask(&backend, &question).await
        }
        Commands::Repl => {
            logging::init_stderr()?;
            cli::repl(&backend).await
        }
    }
}

async fn run_tui(backend: HttpBackend, file: Option<PathBuf>) -> Result<()> {
    let server_url = backend.base_url().to_string();
    let mut app = App::new(Arc::new(backend), server_url);
    if let Some(path) = file {
        app.set_file_input(path.display().to_string());
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(tui::TICK_RATE);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
