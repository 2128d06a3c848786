//! crates/event_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of a specific storage engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Event, EventFilter, NewEvent, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the backing store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for users and events.
///
/// Implementations enforce email uniqueness and public identifier uniqueness
/// themselves and report violations as `PortError::Conflict`.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Credential Store ---
    async fn create_user_with_email(&self, email: &str, hashed_password: &str)
        -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    // --- Event Store ---
    async fn create_event(&self, event: NewEvent) -> PortResult<Event>;

    async fn get_event_by_id(&self, event_id: i64) -> PortResult<Event>;

    /// Events owned by `user_id` inside `filter` relative to `now`, ascending
    /// by `date_time`, ties in insertion order.
    async fn list_events_by_user(
        &self,
        user_id: Uuid,
        filter: EventFilter,
        now: DateTime<Utc>,
    ) -> PortResult<Vec<Event>>;

    async fn delete_event(&self, event_id: i64) -> PortResult<()>;

    async fn get_event_by_public_id(&self, public_id: &str) -> PortResult<Event>;

    /// Every event carrying a public identifier, ascending by `date_time`.
    async fn list_public_events(&self) -> PortResult<Vec<Event>>;
}
