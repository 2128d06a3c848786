//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::error::ServiceError;
use crate::services::{EventAccess, PasswordHashing, SessionIssuer};
use event_tracker_core::clock::Clock;
use event_tracker_core::ports::DatabaseService;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionIssuer>,
    pub events: Arc<EventAccess>,
}

impl AppState {
    /// Wires the services together, taking the hashing cost from the config.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        let hashing =
            PasswordHashing::from_costs(config.argon2_memory_kib, config.argon2_iterations)?;
        Self::with_hashing(config, db, clock, hashing)
    }

    pub fn with_hashing(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        clock: Arc<dyn Clock>,
        hashing: PasswordHashing,
    ) -> Result<Self, ServiceError> {
        let sessions = SessionIssuer::new(
            db.clone(),
            clock.clone(),
            hashing,
            &config.session_secret,
        )?;
        let events = EventAccess::new(db, clock);
        Ok(Self {
            config,
            sessions: Arc::new(sessions),
            events: Arc::new(events),
        })
    }
}
