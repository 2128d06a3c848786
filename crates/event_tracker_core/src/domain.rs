//! crates/event_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

impl UserCredentials {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// A calendar event owned by exactly one user.
///
/// `public_id` is the only key of the unauthenticated read path. An event is
/// publicly visible if and only if it carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub public_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn is_public(&self) -> bool {
        self.public_id.is_some()
    }
}

/// What the unauthenticated read path may see of an event.
///
/// Carries no owner reference and no internal id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicEventView {
    pub public_id: String,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl PublicEventView {
    /// `None` for events that were never published.
    pub fn project(event: Event) -> Option<Self> {
        let public_id = event.public_id?;
        Some(Self {
            public_id,
            title: event.title,
            date_time: event.date_time,
            location: event.location,
            description: event.description,
            created_at: event.created_at,
        })
    }
}

/// An event that has been validated but not yet persisted.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub user_id: Uuid,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub description: String,
    pub public_id: Option<String>,
}

/// Time window applied when an owner lists their events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// `date_time >= now`
    Upcoming,
    /// `date_time < now`
    Past,
    #[default]
    All,
}

impl EventFilter {
    /// Parses the `filter` query value. Anything unrecognised means no restriction.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("upcoming") => EventFilter::Upcoming,
            Some(v) if v.eq_ignore_ascii_case("past") => EventFilter::Past,
            _ => EventFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventFilter::Upcoming => "upcoming",
            EventFilter::Past => "past",
            EventFilter::All => "all",
        }
    }

    /// Whether an event scheduled at `date_time` falls inside the window relative to `now`.
    pub fn admits(&self, date_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            EventFilter::Upcoming => date_time >= now,
            EventFilter::Past => date_time < now,
            EventFilter::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn private_events_have_no_public_projection() {
        let at = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
        let mut event = Event {
            id: 7,
            user_id: Uuid::new_v4(),
            title: "Standup".to_string(),
            date_time: at,
            location: "Room 1".to_string(),
            description: String::new(),
            public_id: None,
            created_at: at,
        };
        assert!(PublicEventView::project(event.clone()).is_none());

        event.public_id = Some("Xy3_k9-aQw2B".to_string());
        let view = PublicEventView::project(event).unwrap();
        assert_eq!(view.public_id, "Xy3_k9-aQw2B");
        assert_eq!(view.title, "Standup");
        assert_eq!(view.location, "Room 1");
    }

    #[test]
    fn filter_parse_falls_back_to_all() {
        assert_eq!(EventFilter::parse(Some("upcoming")), EventFilter::Upcoming);
        assert_eq!(EventFilter::parse(Some("PAST")), EventFilter::Past);
        assert_eq!(EventFilter::parse(Some("all")), EventFilter::All);
        assert_eq!(EventFilter::parse(Some("tomorrow")), EventFilter::All);
        assert_eq!(EventFilter::parse(None), EventFilter::All);
    }

    #[test]
    fn upcoming_and_past_partition_around_now() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        for offset in [-3600, -1, 0, 1, 3600] {
            let at = now + Duration::seconds(offset);
            let upcoming = EventFilter::Upcoming.admits(at, now);
            let past = EventFilter::Past.admits(at, now);
            assert!(upcoming ^ past, "offset {offset} must land in exactly one window");
            assert!(EventFilter::All.admits(at, now));
        }
        assert!(EventFilter::Upcoming.admits(now, now));
    }
}
