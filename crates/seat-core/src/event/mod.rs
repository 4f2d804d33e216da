pub mod store;
pub mod types;

pub use store::{EventLog, InMemoryEventLog, SharedEventLog};
pub use types::{event_codes, SessionEvent, SessionEventKind};
