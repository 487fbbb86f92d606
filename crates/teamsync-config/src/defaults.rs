//! Environment variable names and default locations.

/// Bot token.
pub const ENV_TOKEN: &str = "DISCORD_TOKEN";
/// Integer id of the guild to provision.
pub const ENV_GUILD_ID: &str = "GUILD_ID";
/// Display name of the category that holds team channels.
pub const ENV_CATEGORY_NAME: &str = "CATEGORY_NAME";
/// Path of the roster CSV file.
pub const ENV_ROSTER_FILE: &str = "CSV_FILE";
/// Name of the role granted to every rostered member.
pub const ENV_PARTICIPANT_ROLE: &str = "PARTICIPANT_ROLE_NAME";
/// Name of the role that can see every team channel.
pub const ENV_GLOBAL_ACCESS_ROLE: &str = "GLOBAL_TEAM_ACCESS_ROLE_NAME";

/// Every required variable, in the order diagnostics list them.
pub const REQUIRED_VARS: [&str; 6] = [
    ENV_TOKEN,
    ENV_GUILD_ID,
    ENV_CATEGORY_NAME,
    ENV_ROSTER_FILE,
    ENV_PARTICIPANT_ROLE,
    ENV_GLOBAL_ACCESS_ROLE,
];

/// Dotenv file read when no explicit path is given.
pub const DEFAULT_ENV_FILE: &str = ".env";
