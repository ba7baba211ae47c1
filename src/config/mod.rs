//! Configuration module for codec defaults
//!
//! Provides types and loading for `bitsy.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
