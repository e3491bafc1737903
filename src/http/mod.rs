// ============================================================================
// HTTP Module - JSON lookup API served by actix-web
// ============================================================================

mod errors;
mod handlers;
mod server;

pub use errors::ApiError;
pub use handlers::{app, routes, ApiState, NameEntry, NamesPage};
pub use server::HttpListener;
