//! The board component
//!
//! A closed feedback loop with no persisted state: session changes trigger
//! loads, loads populate the view-state, the renderer draws it, user
//! actions issue mutations, and every successful mutation triggers a fresh
//! full load.

mod app;
mod events;
mod loader;
mod runner;
pub mod state;
mod views;
mod watcher;

pub use app::App;
pub use events::{Event, EventHandler};
pub use loader::{BoardMessage, LoadOutcome, LoadSnapshot, Loader, MutationOp};
pub use runner::{BoardRunner, apply_load_outcome, apply_mutation_result};
pub use state::{BoardState, Focus, PendingAction};

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use plansvc::ProviderSlot;

use crate::config::BoardConfig;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for board mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the board against the given provider slot
pub async fn run(slot: ProviderSlot, config: &BoardConfig) -> Result<()> {
    let terminal = init()?;

    // Guard so the terminal is restored even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let mut runner = BoardRunner::new(terminal, slot, config);
    runner.run().await
}
