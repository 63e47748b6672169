pub mod guards;
pub mod router;
pub mod routes;

pub use router::{GvState, gv_router};
