mod app;
mod event;
mod ui;

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use stankade::config::ArcadeConfig;

use app::App;
use event::{Event, EventHandler};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// The terminal belongs to the UI, so log lines go to a file instead.
fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config = ArcadeConfig::load()?;
    if let Err(err) = init_tracing(&config.log_file) {
        eprintln!("logging disabled: {err:#}");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let result = run(&mut terminal, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "arcade stopped");
    }
    result
}

fn run(terminal: &mut Term, config: ArcadeConfig) -> Result<()> {
    let size = terminal.size()?;
    let events = EventHandler::new(config.frame_interval_ms);
    let mut app = App::new(config, (size.width, size.height));
    tracing::info!("arcade started");

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, &app))?;

        match events.next()? {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.on_key(key)?,
            Event::Mouse(mouse) => app.on_mouse(mouse),
            Event::Resize(w, h) => app.on_resize(w, h),
        }
    }
    Ok(())
}
