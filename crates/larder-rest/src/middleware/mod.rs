//! HTTP middleware.

mod auth;
mod cache;
mod logging;

pub use auth::*;
pub use cache::*;
pub use logging::*;
