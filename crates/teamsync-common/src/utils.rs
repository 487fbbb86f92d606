//! Naming and message formatting helpers.

/// Prefix shared by every team channel.
pub const CHANNEL_PREFIX: &str = "team-";

/// Derives a channel name: lowercase the team name, replace each space with a
/// hyphen and prepend `team-`.
pub fn channel_name_for(team_name: &str) -> String {
    format!("{CHANNEL_PREFIX}{}", team_name.to_lowercase().replace(' ', "-"))
}

/// Formats a user mention for a raw user id.
pub fn mention(user_id: u64) -> String {
    format!("<@{user_id}>")
}

/// Joins mentions for the given user ids with `", "`.
pub fn join_mentions<I>(user_ids: I) -> String
where
    I: IntoIterator<Item = u64>,
{
    user_ids.into_iter().map(mention).collect::<Vec<_>>().join(", ")
}

/// Joins plain names with `", "` for log lines.
pub fn format_name_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Welcome message posted into a freshly created team channel.
pub fn new_channel_welcome(team_name: &str, member_ids: &[u64]) -> String {
    format!(
        "👋 Welcome, **Team {team_name}**! This is your private team channel.\nMembers: {}",
        join_mentions(member_ids.iter().copied())
    )
}

/// Welcome message posted into an existing channel for newly added members.
pub fn added_members_welcome(member_ids: &[u64]) -> String {
    format!(
        "👋 Welcome {}! You've been added to the team channel.",
        join_mentions(member_ids.iter().copied())
    )
}
