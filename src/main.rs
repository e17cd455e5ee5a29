//! keypair: TUI editor for ordered key/value pair lists.

mod app;
mod component;
mod document;
mod editor;
mod pairs;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;
use tracing::warn;

use app::App;
use component::EditorProps;
use document::Document;

/// keypair: TUI editor for ordered key/value pair lists
#[derive(Parser, Debug)]
#[command(name = "keypair", version, about)]
struct Cli {
    /// Path to the pairs JSON file (overrides default)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Start with the editor disabled (clears the list)
    #[arg(long)]
    disabled: bool,

    /// Compact row layout
    #[arg(long)]
    edit_node: bool,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the list as a JSON object on exit
    #[arg(long)]
    print_object: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref log_file) = cli.log_file {
        init_tracing(log_file)?;
    }

    let path = match cli.file {
        Some(p) => p,
        None => Document::default_path()?,
    };

    let (document, value) = Document::load(&path)?;
    let props = EditorProps {
        disabled: cli.disabled,
        edit_node: cli.edit_node,
        duplicate_key: false,
    };
    let mut app = App::new(document, value, props);

    // Set up terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result?;

    if cli.print_object {
        let object = serde_json::Value::Object(app.value.to_object());
        println!(
            "{}",
            serde_json::to_string_pretty(&object).context("serializing object")?
        );
    }

    Ok(())
}

/// The TUI owns stdout, so logs only go to a file.
fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Clear status message on any key press
            app.status_message = None;

            if !handle_host_key(terminal, app, key)? {
                app.handle_editor_key(key);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Handles keys owned by the host. Returns false to pass the key to the editor.
fn handle_host_key(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    key: KeyEvent,
) -> Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('s') if ctrl => app.save(),
        KeyCode::Char('d') if ctrl => app.toggle_disabled(),
        KeyCode::Char('e') if ctrl => run_editor(terminal, app)?,
        _ => return Ok(false),
    }
    Ok(true)
}

/// Suspends the TUI, runs `$EDITOR` on the list, and applies the result.
fn run_editor(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Suspend TUI
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    let result = editor::edit_list_in_editor(&app.value);

    // Restore TUI
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    terminal.clear()?;

    match result {
        Ok(edited) => app.apply_editor_result(edited),
        Err(e) => {
            warn!(error = %e, "external editor failed");
            app.status_message = Some(format!("Editor error: {e:#}"));
        }
    }

    Ok(())
}
