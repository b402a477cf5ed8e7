// ============================================================================
// FLUENCYFLOW - Vocabulary grid viewer for language learners
// ============================================================================
//
// MODULE STRUCTURE:
// 1. storage    - Durable key/value persistence (JSON file)
// 2. dataset    - Word list loading (CSV with header row)
// 3. columns    - Per-language column mapping and visibility toggles
// 4. selection  - Known words and exports
// 5. pager      - Visible index and page cursor
// 6. session    - Per-language study state, persisted after every change
// 7. layout     - Responsive column count and cell contents
// 8. theme      - Built-in palettes
// 9. app        - UI state, keyboard and mouse handling
// 10. ui        - All rendering
// ============================================================================

mod app;
mod clipboard;
mod columns;
mod dataset;
mod layout;
mod logging;
mod pager;
mod selection;
mod session;
mod storage;
mod theme;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use app::{App, AppConfig};
use columns::LANGUAGES;
use storage::{FileStore, KeyValueStore, MemoryStore};

#[derive(Parser, Debug)]
#[command(name = "fluencyflow", about = "Mark the words you know, one page at a time")]
struct Args {
    /// Skip the language screen and open this language
    #[arg(short, long)]
    language: Option<String>,
    /// Directory holding `<language>.csv` word lists
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,
    /// Storage file for progress and settings
    #[arg(long)]
    store: Option<PathBuf>,
    /// Use the touch-device column thresholds
    #[arg(long, default_value = "false")]
    touch: bool,
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Print the available languages and exit
    #[arg(long, default_value = "false")]
    list: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.list {
        println!("Available languages: {}", LANGUAGES.join(", "));
        return Ok(());
    }

    match storage::get_data_dir() {
        Ok(app_dir) => {
            if let Err(e) = logging::init_logging(&app_dir, &args.log_level) {
                eprintln!("warning: {e:#}");
            }
        }
        Err(e) => eprintln!("warning: {e:#}; logging disabled"),
    }

    let store: Box<dyn KeyValueStore> = match open_store(args.store.as_deref()) {
        Ok(store) => {
            info!(store = %store.path().display(), data_dir = %args.data_dir.display(), "starting");
            Box::new(store)
        }
        Err(e) => {
            // Progress will not outlive this run.
            warn!("{e:#}; keeping progress in memory");
            Box::new(MemoryStore::new())
        }
    };

    let config = AppConfig {
        data_dir: args.data_dir.clone(),
        touch: args.touch,
    };
    let mut app = App::new(config, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, event::EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.refresh_viewport();
    if let Some(language) = args.language.as_deref() {
        if !LANGUAGES.contains(&language) {
            warn!(language, "unrecognized language, columns will be empty");
        }
        app.start_session(language);
    }

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        event::DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    res
}

/// `--store` wins; otherwise the store lives in the application data directory.
fn open_store(path: Option<&Path>) -> Result<FileStore> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => storage::default_store_path()?,
    };
    FileStore::open(&path).with_context(|| format!("opening store {}", path.display()))
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app::handle_key(app, key)? {
                        break;
                    }
                }
                Event::Mouse(mouse) => app::handle_mouse(app, mouse),
                Event::Resize(_, _) => app.refresh_viewport(),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    info!("exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_store_path_needs_no_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress").join("storage.json");
        let store = open_store(Some(&path)).unwrap();
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn unusable_store_path_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as the store file.
        assert!(open_store(Some(dir.path())).is_err());
    }
}
