//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. It applies the
//! same uniqueness and ordering rules as the Postgres schema and backs local
//! runs (`DATABASE_URL=memory://`) and the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use event_tracker_core::clock::{Clock, SystemClock};
use event_tracker_core::domain::{Event, EventFilter, NewEvent, User, UserCredentials};
use event_tracker_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    /// Keyed by id, so iteration follows insertion order.
    events: BTreeMap<i64, Event>,
    next_event_id: i64,
}

/// A `DatabaseService` kept entirely in memory.
#[derive(Clone)]
pub struct MemoryDb {
    tables: Arc<RwLock<Tables>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryDb {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryDb {
    /// `clock` stamps `created_at` on new events.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                next_event_id: 1,
                ..Tables::default()
            })),
            clock,
        }
    }
}

/// Stable sort keeps insertion order among events at the same instant.
fn sorted_by_date_time(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| e.date_time);
    events
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(PortError::Conflict("users_email_key".to_string()));
        }
        let credentials = UserCredentials {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        let user = credentials.to_user();
        tables.users.push(credentials);
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound("User with that email".to_string()))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(UserCredentials::to_user)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn create_event(&self, event: NewEvent) -> PortResult<Event> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == event.user_id) {
            return Err(PortError::Unexpected(format!(
                "events_user_id_fkey: user {} does not exist",
                event.user_id
            )));
        }
        if let Some(public_id) = &event.public_id {
            if tables
                .events
                .values()
                .any(|e| e.public_id.as_deref() == Some(public_id.as_str()))
            {
                return Err(PortError::Conflict("events_public_id_key".to_string()));
            }
        }

        let id = tables.next_event_id;
        tables.next_event_id += 1;
        let stored = Event {
            id,
            user_id: event.user_id,
            title: event.title,
            date_time: event.date_time,
            location: event.location,
            description: event.description,
            public_id: event.public_id,
            created_at: self.clock.now(),
        };
        tables.events.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_event_by_id(&self, event_id: i64) -> PortResult<Event> {
        let tables = self.tables.read().await;
        tables
            .events
            .get(&event_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Event {} not found", event_id)))
    }

    async fn list_events_by_user(
        &self,
        user_id: Uuid,
        filter: EventFilter,
        now: DateTime<Utc>,
    ) -> PortResult<Vec<Event>> {
        let tables = self.tables.read().await;
        let owned = tables
            .events
            .values()
            .filter(|e| e.is_owned_by(user_id) && filter.admits(e.date_time, now))
            .cloned()
            .collect();
        Ok(sorted_by_date_time(owned))
    }

    async fn delete_event(&self, event_id: i64) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .events
            .remove(&event_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Event {} not found", event_id)))
    }

    async fn get_event_by_public_id(&self, public_id: &str) -> PortResult<Event> {
        let tables = self.tables.read().await;
        tables
            .events
            .values()
            .find(|e| e.public_id.as_deref() == Some(public_id))
            .cloned()
            .ok_or_else(|| PortError::NotFound("Public event not found".to_string()))
    }

    async fn list_public_events(&self) -> PortResult<Vec<Event>> {
        let tables = self.tables.read().await;
        let shared = tables.events.values().filter(|e| e.is_public()).cloned().collect();
        Ok(sorted_by_date_time(shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_event(
        user_id: Uuid,
        title: &str,
        date_time: DateTime<Utc>,
        public_id: Option<&str>,
    ) -> NewEvent {
        NewEvent {
            user_id,
            title: title.to_string(),
            date_time,
            location: String::new(),
            description: String::new(),
            public_id: public_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let db = MemoryDb::default();
        db.create_user_with_email("a@x.com", "hash").await.unwrap();
        let second = db.create_user_with_email("a@x.com", "other").await;
        assert!(matches!(second, Err(PortError::Conflict(_))));

        // Emails are case-sensitive natural keys.
        assert!(db.create_user_with_email("A@x.com", "hash").await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_public_id_is_a_conflict() {
        let db = MemoryDb::default();
        let user = db.create_user_with_email("a@x.com", "hash").await.unwrap();
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();

        db.create_event(new_event(user.id, "one", at, Some("abc"))).await.unwrap();
        let clash = db.create_event(new_event(user.id, "two", at, Some("abc"))).await;
        assert!(matches!(clash, Err(PortError::Conflict(_))));

        // Any number of private events is fine.
        db.create_event(new_event(user.id, "three", at, None)).await.unwrap();
        db.create_event(new_event(user.id, "four", at, None)).await.unwrap();
    }

    #[tokio::test]
    async fn listing_orders_by_date_time_then_insertion() {
        let db = MemoryDb::default();
        let user = db.create_user_with_email("a@x.com", "hash").await.unwrap();
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();

        db.create_event(new_event(user.id, "late", at + Duration::hours(2), None)).await.unwrap();
        db.create_event(new_event(user.id, "tie-first", at, None)).await.unwrap();
        db.create_event(new_event(user.id, "tie-second", at, None)).await.unwrap();

        let titles: Vec<String> = db
            .list_events_by_user(user.id, EventFilter::All, at)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["tie-first", "tie-second", "late"]);
    }

    #[tokio::test]
    async fn delete_of_missing_event_is_not_found() {
        let db = MemoryDb::default();
        assert!(matches!(db.delete_event(42).await, Err(PortError::NotFound(_))));
    }
}
