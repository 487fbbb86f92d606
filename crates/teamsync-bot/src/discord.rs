//! Serenity-backed implementation of [`GuildApi`].

use crate::error::ApiError;
use crate::overwrites::Overwrite;
use crate::platform::{CategoryInfo, ChannelInfo, GuildApi, MemberInfo, NewChannel, RoleInfo};
use async_trait::async_trait;
use serenity::all::{
    Cache, ChannelId, ChannelType, Context, CreateChannel, EditChannel, EditRole, GuildChannel,
    GuildId, Http, Member, PermissionOverwrite, RoleId, UserId,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Page size for REST member listing.
const MEMBER_PAGE_SIZE: u64 = 1000;

/// A guild reached through a ready serenity session.
///
/// Reads go to the gateway cache; cache guards are always released before the
/// next `.await`. A REST member listing, needed only when the member cache is
/// incomplete, is fetched once per session.
pub struct SerenityGuild {
    http: Arc<Http>,
    cache: Arc<Cache>,
    guild_id: GuildId,
    bot_user_id: UserId,
    fetched_members: OnceCell<Vec<MemberInfo>>,
}

impl SerenityGuild {
    /// Looks up the guild in the session cache. Returns the adapter and the
    /// guild's name, or `None` when the bot cannot see the guild.
    pub fn from_cache(ctx: &Context, guild_id: GuildId) -> Option<(Self, String)> {
        let name = ctx.cache.guild(guild_id)?.name.clone();
        let bot_user_id = ctx.cache.current_user().id;

        Some((
            Self {
                http: Arc::clone(&ctx.http),
                cache: Arc::clone(&ctx.cache),
                guild_id,
                bot_user_id,
                fetched_members: OnceCell::new(),
            },
            name,
        ))
    }

    fn cached_members(&self) -> Option<(Vec<MemberInfo>, u64)> {
        let guild = self.cache.guild(self.guild_id)?;
        let members = guild.members.values().map(member_info).collect();
        Some((members, guild.member_count))
    }

    async fn fetch_members(&self) -> Result<Vec<MemberInfo>, ApiError> {
        let mut members = Vec::new();
        let mut after = None;

        loop {
            let page = self
                .http
                .get_guild_members(self.guild_id, Some(MEMBER_PAGE_SIZE), after)
                .await?;
            let full_page = page.len() as u64 == MEMBER_PAGE_SIZE;
            after = page.last().map(|m| m.user.id.get());
            members.extend(page.iter().map(member_info));

            if !full_page {
                break;
            }
        }

        Ok(members)
    }
}

/// Whether the cached member list covers the whole guild.
fn member_cache_complete(cached: usize, member_count: u64) -> bool {
    cached as u64 >= member_count
}

/// Orders guild entities the way Discord lists them: by position, then id.
fn in_position_order<T>(mut items: Vec<(u16, u64, T)>) -> Vec<T> {
    items.sort_by_key(|(position, id, _)| (*position, *id));
    items.into_iter().map(|(_, _, item)| item).collect()
}

fn member_info(member: &Member) -> MemberInfo {
    MemberInfo {
        id: member.user.id,
        tag: member.user.tag(),
        username: member.user.name.clone(),
        display_name: member.display_name().to_string(),
        roles: member.roles.clone(),
    }
}

fn channel_info(channel: &GuildChannel) -> ChannelInfo {
    ChannelInfo {
        id: channel.id,
        name: channel.name.clone(),
        overwrites: channel
            .permission_overwrites
            .iter()
            .filter_map(Overwrite::from_serenity)
            .collect(),
    }
}

fn to_serenity(overwrites: Vec<Overwrite>) -> Vec<PermissionOverwrite> {
    overwrites.into_iter().map(PermissionOverwrite::from).collect()
}

#[async_trait]
impl GuildApi for SerenityGuild {
    fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    fn bot_user_id(&self) -> UserId {
        self.bot_user_id
    }

    fn roles(&self) -> Vec<RoleInfo> {
        let roles: Vec<_> = self
            .cache
            .guild(self.guild_id)
            .map(|guild| {
                guild
                    .roles
                    .values()
                    .map(|role| {
                        let info = RoleInfo {
                            id: role.id,
                            name: role.name.clone(),
                        };
                        (role.position, role.id.get(), info)
                    })
                    .collect()
            })
            .unwrap_or_default();
        in_position_order(roles)
    }

    async fn create_role(&self, name: &str, reason: &str) -> Result<RoleInfo, ApiError> {
        let role = self
            .guild_id
            .create_role(&*self.http, EditRole::new().name(name).audit_log_reason(reason))
            .await?;

        Ok(RoleInfo {
            id: role.id,
            name: role.name,
        })
    }

    fn categories(&self) -> Vec<CategoryInfo> {
        let categories: Vec<_> = self
            .cache
            .guild(self.guild_id)
            .map(|guild| {
                guild
                    .channels
                    .values()
                    .filter(|c| c.kind == ChannelType::Category)
                    .map(|c| {
                        let info = CategoryInfo {
                            id: c.id,
                            name: c.name.clone(),
                        };
                        (c.position, c.id.get(), info)
                    })
                    .collect()
            })
            .unwrap_or_default();
        in_position_order(categories)
    }

    fn text_channels_in(&self, category: ChannelId) -> Vec<ChannelInfo> {
        self.cache
            .guild(self.guild_id)
            .map(|guild| {
                guild
                    .channels
                    .values()
                    .filter(|c| c.kind == ChannelType::Text && c.parent_id == Some(category))
                    .map(channel_info)
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn create_text_channel(&self, channel: NewChannel) -> Result<ChannelInfo, ApiError> {
        let builder = CreateChannel::new(channel.name)
            .kind(ChannelType::Text)
            .category(channel.category)
            .permissions(to_serenity(channel.overwrites))
            .audit_log_reason(&channel.reason);

        let created = self.guild_id.create_channel(&*self.http, builder).await?;
        Ok(channel_info(&created))
    }

    async fn set_overwrites(
        &self,
        channel: ChannelId,
        overwrites: Vec<Overwrite>,
    ) -> Result<(), ApiError> {
        channel
            .edit(&*self.http, EditChannel::new().permissions(to_serenity(overwrites)))
            .await?;
        Ok(())
    }

    async fn members(&self) -> Result<Vec<MemberInfo>, ApiError> {
        let (cached, member_count) = self
            .cached_members()
            .ok_or_else(|| ApiError::Other(format!("guild {} is no longer cached", self.guild_id)))?;

        if member_cache_complete(cached.len(), member_count) {
            return Ok(cached);
        }

        debug!(
            cached = cached.len(),
            member_count, "Member cache incomplete, listing members over REST"
        );
        self.fetched_members
            .get_or_try_init(|| self.fetch_members())
            .await
            .cloned()
    }

    async fn add_role(&self, member: UserId, role: RoleId, reason: &str) -> Result<(), ApiError> {
        self.http
            .add_member_role(self.guild_id, member, role, Some(reason))
            .await?;
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), ApiError> {
        channel.say(&*self.http, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_cache_completeness() {
        assert!(member_cache_complete(3, 3));
        assert!(member_cache_complete(0, 0));
        assert!(!member_cache_complete(250, 1_200));
    }

    #[test]
    fn test_entities_sorted_by_position_then_id() {
        let ordered = in_position_order(vec![
            (2, 10, "moderators"),
            (1, 30, "participant (newer)"),
            (0, 1, "@everyone"),
            (1, 20, "participant"),
        ]);
        assert_eq!(
            ordered,
            vec!["@everyone", "participant", "participant (newer)", "moderators"]
        );
    }
}
