//! Configuration module for cldctx
//!
//! Provides types, discovery and loading for `cld.toml` project
//! configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
