pub(crate) mod html;
pub(crate) mod logging;
pub(crate) mod sanitize;
