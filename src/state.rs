use std::sync::Arc;
use std::time::Instant;

use crate::store::CharacterStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CharacterStore>,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: CharacterStore) -> Self {
        Self {
            store: Arc::new(store),
            started_at: Instant::now(),
        }
    }

    /// Seconds since this state was created, for the health endpoint.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
