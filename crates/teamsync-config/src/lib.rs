//! # Teamsync Config
//!
//! Environment-driven configuration for teamsync.
//!
//! This crate reads the six required settings from the process environment
//! (optionally seeded from a dotenv file), validates them, and produces an
//! immutable [`Config`] that is built once and passed by reference.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
