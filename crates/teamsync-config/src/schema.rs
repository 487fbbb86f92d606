//! Configuration schema.

use std::fmt;
use std::num::NonZeroU64;
use std::path::PathBuf;

/// Immutable run configuration.
///
/// Built once at process entry by [`crate::ConfigLoader`] and shared by
/// reference with every component that needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Discord bot token.
    pub token: String,
    /// Guild to provision.
    pub guild_id: NonZeroU64,
    /// Category that holds the team channels.
    pub category_name: String,
    /// Roster CSV path.
    pub roster_path: PathBuf,
    /// Role granted to every resolved roster member.
    pub participant_role_name: String,
    /// Role with read and send access to every team channel.
    pub global_access_role_name: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("category_name", &self.category_name)
            .field("roster_path", &self.roster_path)
            .field("participant_role_name", &self.participant_role_name)
            .field("global_access_role_name", &self.global_access_role_name)
            .finish()
    }
}
