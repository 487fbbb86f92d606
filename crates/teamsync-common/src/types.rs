//! Common type definitions for roster-driven team provisioning.

use crate::utils::channel_name_for;
use std::fmt;

/// One team parsed from a roster row.
///
/// Both the team name and every member name are trimmed, and a record is only
/// ever constructed with a non-empty team name and at least one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    team_name: String,
    member_names: Vec<String>,
}

impl TeamRecord {
    /// Builds a record from raw fields, trimming everything and dropping blank
    /// member names. Returns `None` when the team name is blank or no member
    /// names survive.
    pub fn new<S, I>(team_name: &str, member_names: I) -> Option<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let team_name = team_name.trim();
        let member_names: Vec<String> = member_names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        if team_name.is_empty() || member_names.is_empty() {
            return None;
        }

        Some(Self {
            team_name: team_name.to_string(),
            member_names,
        })
    }

    /// The trimmed team name as written in the roster.
    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    /// Member names in roster order.
    pub fn member_names(&self) -> &[String] {
        &self.member_names
    }

    /// The private channel name for this team.
    pub fn channel_name(&self) -> ChannelName {
        ChannelName(channel_name_for(&self.team_name))
    }
}

/// A derived team channel name such as `team-beta-team`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName(String);

impl ChannelName {
    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
