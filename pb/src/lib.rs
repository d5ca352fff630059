//! Planboard - terminal task board for a remote planning service
//!
//! Planboard renders the signed-in user's plans and tasks in the terminal
//! and lets them add, complete, and delete tasks. There is no local
//! persistence: every mutation is followed by a full reload from the
//! service, so the screen always shows the service's view of the world.
//!
//! # Modules
//!
//! - [`board`] - View-state, data loader, pure renderer, and event loop
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod board;
pub mod cli;
pub mod config;

pub use board::{App, BoardMessage, BoardState, LoadOutcome, Loader, PendingAction};
pub use config::{BoardConfig, Config};
