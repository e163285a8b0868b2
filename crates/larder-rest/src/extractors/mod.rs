//! Custom Axum extractors.

mod current_user;
mod pagination;
mod path;
mod validated;

pub use current_user::*;
pub use pagination::*;
pub use path::*;
pub use validated::*;
