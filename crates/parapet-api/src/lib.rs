//! HTTP surface for the Parapet policy analyzer

pub mod routes;
pub mod server;

pub use server::{create_router, ApiServer, AppState};
