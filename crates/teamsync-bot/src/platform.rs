//! The guild operations the provisioner depends on.
//!
//! [`GuildApi`] is the seam between provisioning logic and the Discord client.
//! Synchronous methods read the client's live cache; async methods are the
//! network calls. [`crate::discord::SerenityGuild`] is the production
//! implementation.

use crate::error::ApiError;
use crate::overwrites::Overwrite;
use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, RoleId, UserId};

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    /// Role id.
    pub id: RoleId,
    /// Display name, used as the lookup key.
    pub name: String,
}

/// A channel category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Category channel id.
    pub id: ChannelId,
    /// Display name.
    pub name: String,
}

/// A text channel and its current overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel id.
    pub id: ChannelId,
    /// Channel name.
    pub name: String,
    /// Channel-specific permission overwrites.
    pub overwrites: Vec<Overwrite>,
}

/// A snapshot of a guild member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// User id.
    pub id: UserId,
    /// `name#discriminator`, or the bare username for accounts without one.
    pub tag: String,
    /// Account username.
    pub username: String,
    /// Nickname, global name or username, in that order of preference.
    pub display_name: String,
    /// Roles the member currently has.
    pub roles: Vec<RoleId>,
}

impl MemberInfo {
    /// A member whose tag, username and display name are all `name`.
    pub fn named(id: UserId, name: &str) -> Self {
        Self {
            id,
            tag: name.to_string(),
            username: name.to_string(),
            display_name: name.to_string(),
            roles: Vec::new(),
        }
    }
}

/// Parameters for creating a team text channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    /// Channel name.
    pub name: String,
    /// Parent category.
    pub category: ChannelId,
    /// Complete overwrite set.
    pub overwrites: Vec<Overwrite>,
    /// Audit-log reason.
    pub reason: String,
}

/// Guild operations used during provisioning.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuildApi: Send + Sync {
    /// The guild being provisioned.
    fn guild_id(&self) -> GuildId;

    /// The bot's own user id.
    fn bot_user_id(&self) -> UserId;

    /// Roles currently known for the guild.
    fn roles(&self) -> Vec<RoleInfo>;

    /// Creates a role with the given name.
    async fn create_role(&self, name: &str, reason: &str) -> Result<RoleInfo, ApiError>;

    /// Channel categories currently known for the guild.
    fn categories(&self) -> Vec<CategoryInfo>;

    /// Text channels whose parent is `category`.
    fn text_channels_in(&self, category: ChannelId) -> Vec<ChannelInfo>;

    /// Creates a text channel with its full overwrite set in one call.
    async fn create_text_channel(&self, channel: NewChannel) -> Result<ChannelInfo, ApiError>;

    /// Replaces every overwrite on `channel`.
    async fn set_overwrites(
        &self,
        channel: ChannelId,
        overwrites: Vec<Overwrite>,
    ) -> Result<(), ApiError>;

    /// Current guild members.
    async fn members(&self) -> Result<Vec<MemberInfo>, ApiError>;

    /// Grants `role` to `member`.
    async fn add_role(&self, member: UserId, role: RoleId, reason: &str) -> Result<(), ApiError>;

    /// Posts a plain-text message.
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), ApiError>;
}

/// The `@everyone` role shares its id with the guild.
pub fn everyone_role(guild_id: GuildId) -> RoleId {
    RoleId::new(guild_id.get())
}
