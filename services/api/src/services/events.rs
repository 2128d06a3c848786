//! services/api/src/services/events.rs
//!
//! The Event Access Layer: ownership checks on the private path and the
//! published-only projection on the public path.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use event_tracker_core::clock::Clock;
use event_tracker_core::domain::{Event, EventFilter, NewEvent, PublicEventView, User};
use event_tracker_core::ports::{DatabaseService, PortError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::services::public_id::{random_source, PublicIdSource};

/// Attempts at finding a free public identifier before giving up.
const PUBLIC_ID_ATTEMPTS: usize = 3;

/// Unvalidated input for a new event, as it arrives from a client.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub title: Option<String>,
    pub date_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub share_public: bool,
}

pub struct EventAccess {
    db: Arc<dyn DatabaseService>,
    clock: Arc<dyn Clock>,
    public_ids: PublicIdSource,
}

impl EventAccess {
    pub fn new(db: Arc<dyn DatabaseService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            public_ids: random_source(),
        }
    }

    /// Replaces the public identifier generator.
    pub fn with_public_ids(mut self, source: PublicIdSource) -> Self {
        self.public_ids = source;
        self
    }

    pub async fn create(&self, owner: &User, draft: EventDraft) -> Result<Event, ServiceError> {
        let fields = (draft.title, draft.date_time, draft.location);
        let (title, raw_date_time, location) = match fields {
            (Some(title), Some(date_time), Some(location))
                if !title.trim().is_empty() && !date_time.trim().is_empty() =>
            {
                (title, date_time, location)
            }
            _ => {
                warn!(user_id = %owner.id, "CreateEvent validation failed: missing fields");
                return Err(ServiceError::Validation("Missing required fields".to_string()));
            }
        };

        let date_time = parse_date_time(&raw_date_time).ok_or_else(|| {
            warn!(
                user_id = %owner.id,
                date_time = %raw_date_time,
                "CreateEvent validation failed: invalid date"
            );
            ServiceError::Validation("Invalid dateTime".to_string())
        })?;

        let mut new_event = NewEvent {
            user_id: owner.id,
            title,
            date_time,
            location,
            description: draft.description.unwrap_or_default(),
            public_id: None,
        };

        if !draft.share_public {
            let event = self.db.create_event(new_event).await?;
            info!(user_id = %owner.id, event_id = event.id, "Event created");
            return Ok(event);
        }

        for attempt in 1..=PUBLIC_ID_ATTEMPTS {
            new_event.public_id = Some((self.public_ids)());
            match self.db.create_event(new_event.clone()).await {
                Ok(event) => {
                    info!(
                        user_id = %owner.id,
                        event_id = event.id,
                        public_id = event.public_id.as_deref().unwrap_or_default(),
                        "Event created"
                    );
                    return Ok(event);
                }
                Err(PortError::Conflict(_)) => {
                    warn!(user_id = %owner.id, attempt, "Public id collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ServiceError::Internal(format!(
            "No free public id after {} attempts",
            PUBLIC_ID_ATTEMPTS
        )))
    }

    pub async fn list(
        &self,
        owner: &User,
        filter: EventFilter,
    ) -> Result<Vec<Event>, ServiceError> {
        let events = self
            .db
            .list_events_by_user(owner.id, filter, self.clock.now())
            .await?;
        info!(
            user_id = %owner.id,
            filter = filter.as_str(),
            count = events.len(),
            "ListEvents response"
        );
        Ok(events)
    }

    /// Existence is checked before ownership, so a stranger's id is `Forbidden`, not `NotFound`.
    pub async fn get(&self, owner: &User, event_id: i64) -> Result<Event, ServiceError> {
        let event = self.db.get_event_by_id(event_id).await?;
        if !event.is_owned_by(owner.id) {
            warn!(user_id = %owner.id, event_id, "Access to another user's event refused");
            return Err(ServiceError::Forbidden);
        }
        Ok(event)
    }

    pub async fn delete(&self, owner: &User, event_id: i64) -> Result<(), ServiceError> {
        self.get(owner, event_id).await?;
        self.db.delete_event(event_id).await?;
        info!(user_id = %owner.id, event_id, "DeleteEvent success");
        Ok(())
    }

    pub async fn get_public(&self, public_id: &str) -> Result<PublicEventView, ServiceError> {
        let event = self.db.get_event_by_public_id(public_id).await?;
        info!(public_id = %public_id, event_id = event.id, "GetPublicEvent success");
        PublicEventView::project(event).ok_or(ServiceError::NotFound)
    }

    pub async fn list_public(&self) -> Result<Vec<PublicEventView>, ServiceError> {
        let events = self.db.list_public_events().await?;
        let views: Vec<PublicEventView> =
            events.into_iter().filter_map(PublicEventView::project).collect();
        info!(count = views.len(), "GetPublicEvents success");
        Ok(views)
    }
}

/// Accepts RFC 3339, ISO 8601 with minute precision and a zone (`Z` or `±HH:MM`),
/// a naive `YYYY-MM-DDTHH:MM[:SS[.frac]]` read as UTC, or a bare date at midnight UTC.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    let zoned = match raw.strip_suffix(['Z', 'z']) {
        Some(local) => format!("{}+00:00", local),
        None => raw.to_string(),
    };
    for format in [
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ] {
        if let Ok(instant) = DateTime::parse_from_str(&zoned, format) {
            return Some(instant.with_timezone(&Utc));
        }
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
