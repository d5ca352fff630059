//! Planning-service client library
//!
//! Everything the board component needs to talk to a remote task-planning
//! service: the domain types (plans, tasks, assignments), the [`PlannerClient`]
//! trait with an HTTP implementation, typed errors, and the session/identity
//! primitives the board subscribes to.
//!
//! # Modules
//!
//! - [`types`] - Plan, Task, Assignment, NewTask
//! - [`client`] - The `PlannerClient` trait (plus a mock for tests)
//! - [`http`] - reqwest-backed implementation and its config
//! - [`error`] - `PlannerError` taxonomy
//! - [`session`] - Session state, provider slot, change subscriptions

pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use client::PlannerClient;
pub use error::PlannerError;
pub use http::{HttpPlannerClient, ServiceConfig};
pub use session::{ProviderSlot, Session, SessionState};
pub use types::{Assignment, NewTask, Plan, Task};
