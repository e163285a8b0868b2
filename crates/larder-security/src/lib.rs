//! # Larder Security
//!
//! Validation of bearer tokens issued by the external identity provider and
//! the per-request identity derived from them.

pub mod jwt;
mod principal;

pub use jwt::*;
pub use principal::*;
