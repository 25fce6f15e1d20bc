use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fitshare_media::create_uploader;
use fitshare_service::BlockingHttpService;
use fitshare_tui::app::App;
use fitshare_tui::config::ClientConfig;
use fitshare_tui::state::{Action, Store};
use fitshare_tui::sync::FeedSync;
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = ClientConfig::parse();
    init_logging(&config)?;

    let token = config.token_source();
    let service = BlockingHttpService::with_token_source(&config.api_url, token.clone())
        .with_uploader(create_uploader(&config.media_config(), token));

    let store = Store::new();
    match config.user() {
        Some(user) => {
            tracing::info!(uid = %user.uid, "signed in");
            store.dispatch(Action::SignedIn(user));
        }
        None => tracing::info!("no user configured, feed is read-only"),
    }

    let sync = FeedSync::new(Arc::new(service), store, config.sync_policy);
    run_tui(sync)
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(config: &ClientConfig) -> Result<()> {
    let path = config.log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fitshare=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui(sync: FeedSync) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, sync);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, sync: FeedSync) -> Result<()> {
    let mut app = App::new(sync);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Event::Key(key) = event::read()? {
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless a wizard has focus
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
