//! # Teamsync Common
//!
//! Shared types, utilities, and common functionality for teamsync.
//!
//! This crate provides the roster record type and the naming and
//! formatting rules used by every other crate in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use types::*;
pub use utils::*;
