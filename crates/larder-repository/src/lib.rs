//! # Larder Repository
//!
//! Repository traits and their PostgreSQL implementations. Queries are
//! checked at runtime (`query_as` into `FromRow` row structs) so the crate
//! builds without a live database.

mod pool;
pub mod postgres;
mod traits;

pub use pool::*;
pub use postgres::*;
pub use traits::*;
