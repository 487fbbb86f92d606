//! # Teamsync Roster
//!
//! Streaming reader for the team roster CSV.
//!
//! The first row is a header and is discarded. Every following row is
//! `team name, member, member, ...`; rows that lose their team name or all of
//! their members after trimming are yielded as [`RosterRow::Skipped`] rather
//! than failing the read.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod reader;

pub use error::*;
pub use reader::*;
