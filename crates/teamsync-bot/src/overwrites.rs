//! Channel permission overwrites.
//!
//! A team channel's overwrite set is rebuilt from scratch on every run and
//! applied wholesale, so the set built here is the complete access list for
//! the channel.

use crate::platform::MemberInfo;
use serenity::all::{PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId};
use std::collections::BTreeMap;

/// Permissions granted to everyone who belongs in a team channel.
pub const MEMBER_ACCESS: Permissions = Permissions::VIEW_CHANNEL.union(Permissions::SEND_MESSAGES);

/// Who an overwrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverwriteTarget {
    /// A guild role, including `@everyone`.
    Role(RoleId),
    /// A single guild member.
    Member(UserId),
}

/// One channel permission overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overwrite {
    /// Role or member the overwrite targets.
    pub target: OverwriteTarget,
    /// Explicitly allowed permissions.
    pub allow: Permissions,
    /// Explicitly denied permissions.
    pub deny: Permissions,
}

impl Overwrite {
    /// Whether this overwrite explicitly allows viewing the channel.
    pub fn grants_read(&self) -> bool {
        self.allow.contains(Permissions::VIEW_CHANNEL)
    }

    /// Converts a serenity overwrite. Unknown target kinds yield `None`.
    pub fn from_serenity(overwrite: &PermissionOverwrite) -> Option<Self> {
        let target = match overwrite.kind {
            PermissionOverwriteType::Role(id) => OverwriteTarget::Role(id),
            PermissionOverwriteType::Member(id) => OverwriteTarget::Member(id),
            _ => return None,
        };

        Some(Self {
            target,
            allow: overwrite.allow,
            deny: overwrite.deny,
        })
    }
}

impl From<Overwrite> for PermissionOverwrite {
    fn from(overwrite: Overwrite) -> Self {
        let kind = match overwrite.target {
            OverwriteTarget::Role(id) => PermissionOverwriteType::Role(id),
            OverwriteTarget::Member(id) => PermissionOverwriteType::Member(id),
        };

        Self {
            allow: overwrite.allow,
            deny: overwrite.deny,
            kind,
        }
    }
}

/// Builds the authoritative overwrite set for a team channel:
/// `@everyone` cannot read, while the bot, the global-access role and every
/// team member can read and send.
///
/// The result is keyed by target, so input order does not matter and a
/// member listed twice (or the bot appearing as a member) yields one entry.
pub fn build_overwrites(
    everyone: RoleId,
    bot: UserId,
    global_access: RoleId,
    members: &[MemberInfo],
) -> Vec<Overwrite> {
    let mut set: BTreeMap<OverwriteTarget, (Permissions, Permissions)> = BTreeMap::new();

    set.insert(
        OverwriteTarget::Role(everyone),
        (Permissions::empty(), Permissions::VIEW_CHANNEL),
    );
    set.insert(OverwriteTarget::Member(bot), (MEMBER_ACCESS, Permissions::empty()));
    set.insert(
        OverwriteTarget::Role(global_access),
        (MEMBER_ACCESS, Permissions::empty()),
    );
    for member in members {
        set.insert(
            OverwriteTarget::Member(member.id),
            (MEMBER_ACCESS, Permissions::empty()),
        );
    }

    set.into_iter()
        .map(|(target, (allow, deny))| Overwrite {
            target,
            allow,
            deny,
        })
        .collect()
}

/// Members whose member-specific overwrite on the channel does not already
/// allow reading. Role-derived access is not considered.
pub fn newly_added<'m>(existing: &[Overwrite], members: &'m [MemberInfo]) -> Vec<&'m MemberInfo> {
    members
        .iter()
        .filter(|member| {
            !existing
                .iter()
                .any(|o| o.target == OverwriteTarget::Member(member.id) && o.grants_read())
        })
        .collect()
}
