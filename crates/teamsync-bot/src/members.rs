//! Matching roster names to guild members.

use crate::platform::MemberInfo;
use serenity::all::UserId;
use std::collections::HashSet;

/// One way of comparing a roster name against a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// `name#discriminator` (or bare username when there is no discriminator).
    Tag,
    /// Account username.
    Username,
    /// Nickname, global name or username.
    DisplayName,
}

/// Strategies in the order they are tried. Each one is tried across the whole
/// member list before the next is considered.
pub const MATCH_ORDER: [MatchStrategy; 3] = [
    MatchStrategy::Tag,
    MatchStrategy::Username,
    MatchStrategy::DisplayName,
];

impl MatchStrategy {
    fn field(self, member: &MemberInfo) -> &str {
        match self {
            Self::Tag => &member.tag,
            Self::Username => &member.username,
            Self::DisplayName => &member.display_name,
        }
    }

    /// Case-sensitive exact comparison.
    pub fn matches(self, member: &MemberInfo, name: &str) -> bool {
        self.field(member) == name
    }
}

/// Finds the member for a roster name, or `None`.
pub fn find_member<'m>(members: &'m [MemberInfo], name: &str) -> Option<&'m MemberInfo> {
    MATCH_ORDER
        .iter()
        .find_map(|strategy| members.iter().find(|m| strategy.matches(m, name)))
}

/// Outcome of resolving a team's roster names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Matched members, in roster order, without duplicates.
    pub resolved: Vec<MemberInfo>,
    /// Names that matched nobody, in roster order.
    pub unresolved: Vec<String>,
}

/// Resolves every name against `members`.
pub fn resolve_members<S: AsRef<str>>(members: &[MemberInfo], names: &[S]) -> Resolution {
    let mut seen: HashSet<UserId> = HashSet::new();
    let mut resolution = Resolution::default();

    for name in names {
        let name = name.as_ref().trim();
        match find_member(members, name) {
            Some(member) => {
                if seen.insert(member.id) {
                    resolution.resolved.push(member.clone());
                }
            }
            None => resolution.unresolved.push(name.to_string()),
        }
    }

    resolution
}
