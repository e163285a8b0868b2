//! # Larder REST
//!
//! HTTP surface of the Larder backend: Axum controllers for foods, pantries,
//! shopping lists, meals, groups and the current user, the per-route response
//! cache adapters, and the OpenAPI document.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;

pub use router::*;
pub use state::*;
