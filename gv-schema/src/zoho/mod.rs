mod contact;
mod envelope;
mod event;

pub use contact::{ContactFields, ContactRecord, LeadFields, ZohoLookup};
pub use envelope::{ZohoActionDetails, ZohoActionResult, ZohoData};
pub use event::{EventAttendanceUpdate, EventRecord, ParticipantEntry};
