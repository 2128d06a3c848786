pub mod clock;
pub mod domain;
pub mod ports;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{Event, EventFilter, NewEvent, PublicEventView, User, UserCredentials};
pub use ports::{DatabaseService, PortError, PortResult};
