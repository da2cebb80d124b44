//! HTTP control API
//!
//! Exposes the monitoring session over HTTP for the presentation layer:
//! start/stop, status and transcript snapshots, and the report action.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
