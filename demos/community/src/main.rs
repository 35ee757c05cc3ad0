//! Community - terminal demo for the agora store
//!
//! Browses the seeded catalog, likes posts, RSVPs to events, joins groups
//! and follows authors. Every change is saved to the configured storage
//! and shows up again on the next run.
//!
//! Keys: tab/h/l switch tabs, j/k move, enter toggles, f follows, c cycles
//! the chapter filter, R resets, q quits

mod action;
mod input;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use agora::{seed, AppAction, AppStore, DynRepository, Store, StoreConfig};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::action::UiAction;
use crate::ui::UiState;

/// Community TUI - agora store demo
#[derive(Parser, Debug)]
#[command(name = "community")]
#[command(about = "Browse a community catalog backed by the agora store")]
struct Args {
    /// Keep state in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Directory holding the state document (overrides AGORA_STORAGE_DIR)
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Key the state document is stored under (overrides AGORA_STORAGE_KEY)
    #[arg(long)]
    storage_key: Option<String>,

    /// Load the demo catalog even if the stored state already has entities
    #[arg(long)]
    seed: bool,

    /// Raw action to dispatch before starting, e.g. '{"type":"PING"}'
    #[arg(long = "dispatch", value_name = "JSON")]
    dispatch: Vec<String>,

    /// Print the state document and exit instead of starting the TUI
    #[arg(long)]
    print: bool,

    /// Tracing output file (RUST_LOG controls the filter)
    #[arg(long, default_value = "community.log")]
    log_file: PathBuf,
}

impl Args {
    fn config(&self) -> io::Result<StoreConfig> {
        let mut config = StoreConfig::from_env().map_err(invalid_input)?;
        if let Some(dir) = &self.storage_dir {
            config.storage_dir = dir.clone();
        }
        if let Some(key) = &self.storage_key {
            config.storage_key = key.clone();
        }
        if self.ephemeral {
            config.persist = false;
        }
        config.validate().map_err(invalid_input)?;
        Ok(config)
    }
}

fn invalid_input(err: agora::StoreError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn init_tracing(log_file: &std::path::Path) -> WorkerGuard {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let name = log_file
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("community.log"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();
    guard
}

/// Fill an empty store with the demo catalog
fn seed_store(store: &mut AppStore<DynRepository>, force: bool) {
    let state = store.state();
    let empty = state.groups.is_empty() && state.events.is_empty() && state.posts.is_empty();
    if !empty && !force {
        return;
    }
    info!("seeding demo catalog");
    if force {
        store.reset();
    }
    store.set_user(Some(seed::demo_user()));
    seed::groups().into_iter().for_each(|g| store.add_group(g));
    seed::events().into_iter().for_each(|e| store.add_event(e));
    seed::posts().into_iter().for_each(|p| store.add_post(p));
    seed::notifications()
        .into_iter()
        .for_each(|n| store.add_notification(n));
}

fn dispatch_raw(store: &mut AppStore<DynRepository>, raw: &[String]) -> io::Result<()> {
    for json in raw {
        let action = AppAction::from_json(json).map_err(invalid_input)?;
        let outcome = store.dispatch(action);
        if !outcome.is_handled() {
            warn!(action = %json, "dispatched action was not handled");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(&args.log_file);

    let config = args.config()?;
    let mut store = AppStore::open(&config).map_err(invalid_input)?;
    seed_store(&mut store, args.seed);
    dispatch_raw(&mut store, &args.dispatch)?;

    if args.print {
        let json = store.state().to_json().map_err(invalid_input)?;
        println!("{}", json);
        return Ok(());
    }

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, store).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut store: AppStore<DynRepository>,
) -> io::Result<()> {
    let mut ui_store = Store::new(UiState::default(), ui::reducer);
    let mut updates = store.subscribe();

    let (key_tx, mut key_rx) = mpsc::unbounded_channel();
    let cancel_token = CancellationToken::new();
    let _handle = input::spawn_key_poller(
        key_tx,
        Duration::from_millis(10),
        Duration::from_millis(16),
        cancel_token.clone(),
    );

    let mut should_render = true;

    loop {
        if should_render {
            terminal.draw(|frame| ui::render(frame, ui_store.state(), &store))?;
            should_render = false;
        }

        tokio::select! {
            Some(key) = key_rx.recv() => {
                let Some(action) = ui::map_key(key) else {
                    continue;
                };
                if matches!(action, UiAction::Quit) {
                    break;
                }
                if action.touches_store() {
                    ui::apply_to_store(&action, ui_store.state(), &mut store);
                }
                should_render |= ui_store.dispatch(action);
            }
            Ok(()) = updates.changed() => {
                let snapshot = updates.borrow_and_update().clone();
                debug!(version = snapshot.version, touched = ?snapshot.touched, "store updated");
                should_render = true;
            }
            else => break,
        }
    }

    cancel_token.cancel();
    info!(
        version = store.version(),
        persist_failures = store.persist_failures(),
        "exiting"
    );
    Ok(())
}
