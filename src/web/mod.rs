pub mod handlers;
pub mod routes;

pub use routes::{identity_router, ledger_router};
