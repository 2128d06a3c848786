//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use event_tracker_core::domain::{Event, EventFilter, NewEvent, User, UserCredentials};
use event_tracker_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const EVENT_COLUMNS: &str =
    "id, user_id, title, date_time, location, description, public_id, created_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            email: self.email,
            hashed_password: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct EventRecord {
    id: i64,
    user_id: Uuid,
    title: String,
    date_time: DateTime<Utc>,
    location: String,
    description: String,
    public_id: Option<String>,
    created_at: DateTime<Utc>,
}
impl EventRecord {
    fn to_domain(self) -> Event {
        Event {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            date_time: self.date_time,
            location: self.location,
            description: self.description,
            public_id: self.public_id,
            created_at: self.created_at,
        }
    }
}

/// Maps a write failure, surfacing uniqueness violations as conflicts.
fn map_write_error(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => PortError::Conflict(
            db_err.constraint().unwrap_or("unique constraint").to_string(),
        ),
        _ => PortError::Unexpected(e.to_string()),
    }
}

fn map_read_error(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_error(e, "User with that email".to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT id, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_read_error(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_event(&self, event: NewEvent) -> PortResult<Event> {
        let sql = format!(
            "INSERT INTO events (user_id, title, date_time, location, description, public_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            EVENT_COLUMNS
        );
        let record = sqlx::query_as::<_, EventRecord>(&sql)
            .bind(event.user_id)
            .bind(&event.title)
            .bind(event.date_time)
            .bind(&event.location)
            .bind(&event.description)
            .bind(event.public_id.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(record.to_domain())
    }

    async fn get_event_by_id(&self, event_id: i64) -> PortResult<Event> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let record = sqlx::query_as::<_, EventRecord>(&sql)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_read_error(e, format!("Event {} not found", event_id)))?;
        Ok(record.to_domain())
    }

    async fn list_events_by_user(
        &self,
        user_id: Uuid,
        filter: EventFilter,
        now: DateTime<Utc>,
    ) -> PortResult<Vec<Event>> {
        let window = match filter {
            EventFilter::Upcoming => "AND date_time >= $2",
            EventFilter::Past => "AND date_time < $2",
            EventFilter::All => "",
        };
        let sql = format!(
            "SELECT {} FROM events WHERE user_id = $1 {} ORDER BY date_time ASC, id ASC",
            EVENT_COLUMNS, window
        );

        let mut query = sqlx::query_as::<_, EventRecord>(&sql).bind(user_id);
        if filter != EventFilter::All {
            query = query.bind(now);
        }
        let records = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_event(&self, event_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Event {} not found", event_id)));
        }
        Ok(())
    }

    async fn get_event_by_public_id(&self, public_id: &str) -> PortResult<Event> {
        let sql = format!("SELECT {} FROM events WHERE public_id = $1", EVENT_COLUMNS);
        let record = sqlx::query_as::<_, EventRecord>(&sql)
            .bind(public_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_read_error(e, "Public event not found".to_string()))?;
        Ok(record.to_domain())
    }

    async fn list_public_events(&self) -> PortResult<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events WHERE public_id IS NOT NULL ORDER BY date_time ASC, id ASC",
            EVENT_COLUMNS
        );
        let records = sqlx::query_as::<_, EventRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
