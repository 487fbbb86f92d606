//! Integration tests for the teamsync-bot crate's public building blocks.

use proptest::prelude::*;
use serenity::all::{GuildId, Permissions, RoleId, UserId};
use teamsync_bot::members::resolve_members;
use teamsync_bot::overwrites::{build_overwrites, newly_added, OverwriteTarget, MEMBER_ACCESS};
use teamsync_bot::{everyone_role, ApiError, MemberInfo};

const GUILD: u64 = 500;
const BOT: u64 = 501;
const GLOBAL: u64 = 502;

fn members(ids: &[u64]) -> Vec<MemberInfo> {
    ids.iter()
        .map(|&id| MemberInfo::named(UserId::new(id), &format!("user{id}")))
        .collect()
}

fn team_overwrites(ids: &[u64]) -> Vec<teamsync_bot::overwrites::Overwrite> {
    build_overwrites(
        everyone_role(GuildId::new(GUILD)),
        UserId::new(BOT),
        RoleId::new(GLOBAL),
        &members(ids),
    )
}

#[test]
fn test_everyone_is_denied_and_members_can_read() {
    let overwrites = team_overwrites(&[1, 2]);
    assert_eq!(overwrites.len(), 5);

    let everyone = overwrites
        .iter()
        .find(|o| o.target == OverwriteTarget::Role(RoleId::new(GUILD)))
        .unwrap();
    assert_eq!(everyone.deny, Permissions::VIEW_CHANNEL);
    assert!(!everyone.grants_read());

    for target in [
        OverwriteTarget::Member(UserId::new(BOT)),
        OverwriteTarget::Role(RoleId::new(GLOBAL)),
        OverwriteTarget::Member(UserId::new(1)),
        OverwriteTarget::Member(UserId::new(2)),
    ] {
        let overwrite = overwrites.iter().find(|o| o.target == target).unwrap();
        assert_eq!(overwrite.allow, MEMBER_ACCESS);
        assert!(overwrite.deny.is_empty());
    }
}

#[test]
fn test_only_members_without_read_access_are_new() {
    let existing = team_overwrites(&[1]);
    let current = members(&[1, 2, 3]);

    let added: Vec<u64> = newly_added(&existing, &current)
        .iter()
        .map(|m| m.id.get())
        .collect();
    assert_eq!(added, vec![2, 3]);
}

#[test]
fn test_resolution_keeps_roster_order() {
    let guild_members = members(&[1, 2, 3]);
    let resolution = resolve_members(&guild_members, &["user3", "ghost", "user1"]);

    let ids: Vec<u64> = resolution.resolved.iter().map(|m| m.id.get()).collect();
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(resolution.unresolved, vec!["ghost".to_string()]);
}

#[test]
fn test_api_error_forbidden_classification() {
    assert!(ApiError::Forbidden("Manage Channels".to_string()).is_forbidden());
    assert!(!ApiError::Other("timeout".to_string()).is_forbidden());
}

proptest! {
    #[test]
    fn test_overwrites_cover_exactly_the_team(ids in prop::collection::vec(1u64..400, 0..12)) {
        let overwrites = team_overwrites(&ids);

        let mut expected: Vec<u64> = ids.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(overwrites.len(), expected.len() + 3);

        for id in &expected {
            let target = OverwriteTarget::Member(UserId::new(*id));
            prop_assert!(overwrites.iter().any(|o| o.target == target && o.grants_read()));
        }
    }

    #[test]
    fn test_overwrites_ignore_member_order(ids in prop::collection::vec(1u64..400, 0..12)) {
        let mut reversed = ids.clone();
        reversed.reverse();
        prop_assert_eq!(team_overwrites(&ids), team_overwrites(&reversed));
    }
}
