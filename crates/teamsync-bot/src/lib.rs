//! # Teamsync Bot
//!
//! One-shot Discord provisioner for private team channels.
//!
//! The binary connects, waits for the gateway cache to be ready, resolves the
//! configured guild, runs a single sequential provisioning pass over the
//! roster, and closes the session.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod discord;
pub mod error;
pub mod members;
pub mod overwrites;
pub mod platform;
pub mod provisioner;
pub mod roles;

#[cfg(test)]
mod fake;

pub use bot::*;
pub use error::*;
pub use platform::*;
pub use provisioner::*;
