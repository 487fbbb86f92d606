//! Test utilities and shared test helpers for teamsync.
//!
//! This module provides logging setup, roster fixtures, and property-testing
//! strategies that can be used across all crates in the workspace.

use std::io::Write;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Write `contents` to a temporary `.csv` file that is removed on drop.
pub fn write_roster(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temporary roster file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary roster file");
    file.flush().expect("Failed to flush temporary roster file");
    file
}

/// Roster file fixtures.
pub mod roster_fixtures {
    /// A roster covering valid, multi-word, skipped and padded rows.
    pub fn mixed_roster_csv() -> &'static str {
        concat!(
            "Team Name,Member 1,Member 2,Member 3\n",
            "Alpha,alice,bob,\n",
            "Beta Team, carol ,,\n",
            ",frank,,\n",
            "Gamma,dave,eve,george\n",
            "Empty,,,\n",
        )
    }

    /// A roster with only a header row.
    pub fn header_only_csv() -> &'static str {
        "Team Name,Member 1\n"
    }
}

/// Property-based testing utilities using proptest.
pub mod property_testing {
    use proptest::prelude::*;

    /// Strategy for team names made of words separated by single spaces.
    pub fn team_name_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(r"[A-Za-z0-9]{1,10}", 1..4).prop_map(|words| words.join(" "))
    }

    /// Strategy for member name lists, including blank entries.
    pub fn member_names_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop_oneof![r"[a-z0-9_.]{2,16}", Just(String::new())], 0..6)
    }
}
