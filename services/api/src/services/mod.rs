//! services/api/src/services/mod.rs
//!
//! The authentication and event visibility rules, independent of HTTP.

pub mod events;
pub mod password;
pub mod public_id;
pub mod session;
pub mod token;

pub use events::{EventAccess, EventDraft};
pub use password::PasswordHashing;
pub use session::{IssuedSession, SessionIssuer, SESSION_TTL_DAYS};
