use crate::session::MonitorSession;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single monitoring session this service instance manages
    pub session: Arc<MonitorSession>,
}

impl AppState {
    pub fn new(session: Arc<MonitorSession>) -> Self {
        Self { session }
    }
}
