pub mod attendee;
pub mod lax;
pub mod webhook;
pub mod zoho;

pub use attendee::AttendeeRecord;
pub use webhook::{CheckinQuery, RegistrationRequest, RelationLinkPayload, SqlUnlinkPayload};
pub use zoho::{
    ContactFields, ContactRecord, EventAttendanceUpdate, EventRecord, LeadFields, ParticipantEntry,
    ZohoActionResult, ZohoData, ZohoLookup,
};
