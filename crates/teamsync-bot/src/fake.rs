//! In-memory guild that records every network call.

use crate::error::ApiError;
use crate::overwrites::Overwrite;
use crate::platform::{CategoryInfo, ChannelInfo, GuildApi, MemberInfo, NewChannel, RoleInfo};
use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, RoleId, UserId};
use std::collections::HashSet;
use std::sync::Mutex;

pub const GUILD_ID: u64 = 1_000;
pub const BOT_ID: u64 = 999;

/// A recorded network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateRole(String),
    CreateChannel(NewChannel),
    SetOverwrites(ChannelId, Vec<Overwrite>),
    ListMembers,
    AddRole(UserId, RoleId),
    SendMessage(ChannelId, String),
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateRole,
    CreateChannel,
    SetOverwrites,
    ListMembers,
    AddRole,
    SendMessage,
}

#[derive(Default)]
struct State {
    roles: Vec<RoleInfo>,
    categories: Vec<CategoryInfo>,
    channels: Vec<(ChannelId, ChannelInfo)>,
    members: Vec<MemberInfo>,
    forbidden: HashSet<Op>,
    failing: HashSet<Op>,
    calls: Vec<Call>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check(&self, op: Op) -> Result<(), ApiError> {
        if self.forbidden.contains(&op) {
            return Err(ApiError::Forbidden(format!("{op:?} forbidden")));
        }
        if self.failing.contains(&op) {
            return Err(ApiError::Other(format!("{op:?} failed")));
        }
        Ok(())
    }
}

pub struct FakeGuild {
    state: Mutex<State>,
}

impl FakeGuild {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 10_000,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn with_role(&self, name: &str) -> RoleId {
        let mut state = self.state();
        let id = RoleId::new(state.next_id());
        state.roles.push(RoleInfo {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn with_category(&self, name: &str) -> ChannelId {
        let mut state = self.state();
        let id = ChannelId::new(state.next_id());
        state.categories.push(CategoryInfo {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn with_channel(&self, category: ChannelId, name: &str, overwrites: Vec<Overwrite>) -> ChannelId {
        let mut state = self.state();
        let id = ChannelId::new(state.next_id());
        state.channels.push((
            category,
            ChannelInfo {
                id,
                name: name.to_string(),
                overwrites,
            },
        ));
        id
    }

    pub fn with_member(&self, id: u64, name: &str) -> UserId {
        let user = UserId::new(id);
        self.state().members.push(MemberInfo::named(user, name));
        user
    }

    pub fn with_member_roles(&self, id: u64, name: &str, roles: Vec<RoleId>) -> UserId {
        let user = UserId::new(id);
        let mut member = MemberInfo::named(user, name);
        member.roles = roles;
        self.state().members.push(member);
        user
    }

    pub fn forbid(&self, op: Op) {
        self.state().forbidden.insert(op);
    }

    pub fn fail(&self, op: Op) {
        self.state().failing.insert(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Calls other than member listing, which is a cache read in practice.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::ListMembers))
            .collect()
    }

    pub fn created_roles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateRole(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<(ChannelId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendMessage(channel, content) => Some((channel, content)),
                _ => None,
            })
            .collect()
    }

    pub fn role_grants(&self) -> Vec<(UserId, RoleId)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddRole(user, role) => Some((user, role)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl GuildApi for FakeGuild {
    fn guild_id(&self) -> GuildId {
        GuildId::new(GUILD_ID)
    }

    fn bot_user_id(&self) -> UserId {
        UserId::new(BOT_ID)
    }

    fn roles(&self) -> Vec<RoleInfo> {
        self.state().roles.clone()
    }

    async fn create_role(&self, name: &str, _reason: &str) -> Result<RoleInfo, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::CreateRole(name.to_string()));
        state.check(Op::CreateRole)?;

        let role = RoleInfo {
            id: RoleId::new(state.next_id()),
            name: name.to_string(),
        };
        state.roles.push(role.clone());
        Ok(role)
    }

    fn categories(&self) -> Vec<CategoryInfo> {
        self.state().categories.clone()
    }

    fn text_channels_in(&self, category: ChannelId) -> Vec<ChannelInfo> {
        self.state()
            .channels
            .iter()
            .filter(|(parent, _)| *parent == category)
            .map(|(_, channel)| channel.clone())
            .collect()
    }

    async fn create_text_channel(&self, channel: NewChannel) -> Result<ChannelInfo, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::CreateChannel(channel.clone()));
        state.check(Op::CreateChannel)?;

        let created = ChannelInfo {
            id: ChannelId::new(state.next_id()),
            name: channel.name,
            overwrites: channel.overwrites,
        };
        state.channels.push((channel.category, created.clone()));
        Ok(created)
    }

    async fn set_overwrites(
        &self,
        channel: ChannelId,
        overwrites: Vec<Overwrite>,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        state
            .calls
            .push(Call::SetOverwrites(channel, overwrites.clone()));
        state.check(Op::SetOverwrites)?;

        if let Some((_, existing)) = state.channels.iter_mut().find(|(_, c)| c.id == channel) {
            existing.overwrites = overwrites;
        }
        Ok(())
    }

    async fn members(&self) -> Result<Vec<MemberInfo>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::ListMembers);
        state.check(Op::ListMembers)?;
        Ok(state.members.clone())
    }

    async fn add_role(&self, member: UserId, role: RoleId, _reason: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(Call::AddRole(member, role));
        state.check(Op::AddRole)?;

        if let Some(m) = state.members.iter_mut().find(|m| m.id == member) {
            m.roles.push(role);
        }
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        state
            .calls
            .push(Call::SendMessage(channel, content.to_string()));
        state.check(Op::SendMessage)
    }
}
