mod checkin;
mod registration;
mod relation;

pub use checkin::CheckinQuery;
pub use registration::RegistrationRequest;
pub use relation::{RelationLinkPayload, SqlUnlinkPayload};
