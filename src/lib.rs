pub mod config;
pub mod db;
pub mod error;
pub mod server;
pub mod service;
pub mod zoho;

pub(crate) mod oauth_utils;
pub(crate) mod utils;

pub use error::GvError;
pub use oauth_utils::{OauthTokenResponse, ZohoTokenFields};
