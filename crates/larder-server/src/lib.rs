//! # Larder Server
//!
//! Composition root and process startup for the Larder API.

pub mod di;
pub mod startup;
