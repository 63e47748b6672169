mod gv;
mod oauth;

pub use gv::{ErrorEnvelope, GvError};
pub use oauth::OauthError;
