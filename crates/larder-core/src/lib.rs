//! # Larder Core
//!
//! Core types, domain entities, and error definitions shared by every layer
//! of the Larder backend.

pub mod domain;
pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use validation::*;

// Re-export shaku so service traits can be bound as injectable interfaces
pub use shaku::Interface;
