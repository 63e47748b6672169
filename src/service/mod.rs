//! Business services wired on top of the database actor and the Zoho client.

pub mod attendees;
pub mod bootstrap;
pub mod checkin;
pub mod posts;
pub mod relations;
pub mod tickets;

pub use attendees::{ATTENDEES_META_KEY, AttendeeLog};
pub use bootstrap::Services;
pub use checkin::{CheckinFields, CheckinHandler, CheckinOutcome, CrmSync};
pub use posts::{PostDirectory, PostRef};
pub use relations::{LinkOutcome, RelationKind, RelationOrchestrator, UnlinkOutcome};
pub use tickets::{TicketGenerator, TicketReceipt};
