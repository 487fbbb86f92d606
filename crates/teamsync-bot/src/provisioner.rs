//! The provisioning pass: roles, roster, and one private channel per team.
//!
//! Teams are processed strictly in file order, one network call at a time.
//! Failures are scoped as narrowly as possible: a bad row skips the row, a
//! failed channel skips the team, and only a forbidden channel creation stops
//! the remaining teams. Nothing is rolled back.

use crate::error::ApiError;
use crate::members::{resolve_members, Resolution};
use crate::overwrites::{build_overwrites, newly_added, Overwrite};
use crate::platform::{everyone_role, ChannelInfo, GuildApi, MemberInfo, NewChannel, RoleInfo};
use crate::roles::ensure_role;
use serenity::all::{ChannelId, UserId};
use std::collections::HashSet;
use std::path::PathBuf;
use teamsync_common::{added_members_welcome, format_name_list, new_channel_welcome, ChannelName, TeamRecord};
use teamsync_config::Config;
use teamsync_roster::{RosterError, RosterReader, RosterRow};
use tracing::{error, info, info_span, warn, Instrument};

const PARTICIPANT_ROLE_REASON: &str = "Creating role for participants";
const GLOBAL_ROLE_REASON: &str = "Creating role for global team channel access";
const GRANT_REASON: &str = "Assigned participant role";

/// Why a run stopped before processing every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Abort {
    /// The configured category does not exist.
    CategoryMissing(String),
    /// A required role could not be found or created.
    RoleUnavailable,
    /// The roster file does not exist.
    RosterMissing(PathBuf),
    /// The roster could not be opened or a row could not be read.
    RosterUnreadable(String),
    /// Channel creation is forbidden in the category.
    ChannelCreationForbidden,
}

/// Result of granting the participant role to one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// The role was granted.
    Granted,
    /// The member already had the role.
    AlreadyHeld,
    /// The bot may not grant roles to this member.
    Forbidden,
    /// The grant failed for another reason.
    Failed(String),
}

/// Terminal state of one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamOutcome {
    /// The member list could not be read.
    MemberLookupFailed(String),
    /// None of the roster names matched a member.
    NoMembers,
    /// The channel was created.
    Created {
        /// New channel id.
        channel: ChannelId,
        /// Whether the welcome message was posted.
        welcomed: bool,
    },
    /// The bot may not create channels in the category.
    CreationForbidden,
    /// Channel creation failed for another reason.
    CreationFailed(String),
    /// The existing channel's overwrites were replaced.
    Synced {
        /// Existing channel id.
        channel: ChannelId,
        /// Members that did not have read access before.
        newly_added: Vec<UserId>,
        /// Whether a welcome message was posted.
        welcomed: bool,
    },
    /// The bot may not edit the channel's overwrites.
    SyncForbidden,
    /// Editing overwrites failed for another reason.
    SyncFailed(String),
}

/// What happened to one roster team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamReport {
    /// Team name from the roster.
    pub team_name: String,
    /// Derived channel name.
    pub channel_name: ChannelName,
    /// Roster names that matched nobody.
    pub unresolved: Vec<String>,
    /// Participant-role grants attempted for this team.
    pub grants: Vec<(UserId, GrantOutcome)>,
    /// Terminal state.
    pub outcome: TeamOutcome,
}

/// Summary of a provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// One entry per valid roster row that was processed.
    pub teams: Vec<TeamReport>,
    /// Lines of rows skipped for a blank team name or no members.
    pub skipped_rows: Vec<u64>,
    /// Set when the run stopped early.
    pub abort: Option<Abort>,
}

impl ProvisionReport {
    fn aborted(abort: Abort) -> Self {
        Self {
            abort: Some(abort),
            ..Self::default()
        }
    }
}

/// Roles and category every team channel depends on.
struct Targets {
    category: ChannelId,
    participant: RoleInfo,
    global_access: RoleInfo,
}

/// Runs one provisioning pass against a guild.
pub struct TeamProvisioner<'a, G: GuildApi + ?Sized> {
    api: &'a G,
    config: &'a Config,
    processed: HashSet<UserId>,
}

impl<'a, G: GuildApi + ?Sized> TeamProvisioner<'a, G> {
    /// Creates a provisioner for a single run.
    pub fn new(api: &'a G, config: &'a Config) -> Self {
        Self {
            api,
            config,
            processed: HashSet::new(),
        }
    }

    /// Members that have had a role grant attempted during this run.
    pub const fn processed_members(&self) -> &HashSet<UserId> {
        &self.processed
    }

    /// Runs the whole pass: category, roles, then every roster row.
    pub async fn run(&mut self) -> ProvisionReport {
        info!("--- Starting team setup ---");

        let targets = match self.resolve_targets().await {
            Ok(targets) => targets,
            Err(abort) => return ProvisionReport::aborted(abort),
        };

        let config = self.config;
        let path = &config.roster_path;
        info!(
            "Processing teams from '{}' in category '{}'",
            path.display(),
            config.category_name
        );

        let rows = match RosterReader::open(path) {
            Ok(rows) => rows,
            Err(RosterError::NotFound { path }) => {
                error!("The roster file '{}' was not found", path.display());
                return ProvisionReport::aborted(Abort::RosterMissing(path));
            }
            Err(e) => {
                error!("Unexpected error while opening the roster: {e}");
                return ProvisionReport::aborted(Abort::RosterUnreadable(e.to_string()));
            }
        };

        let report = self.provision_rows(&targets, rows).await;
        info!("--- Team setup and role assignment complete ---");
        report
    }

    async fn resolve_targets(&self) -> Result<Targets, Abort> {
        let category_name = &self.config.category_name;
        let Some(category) = self
            .api
            .categories()
            .into_iter()
            .find(|c| &c.name == category_name)
        else {
            error!("Category '{category_name}' not found. Please create it first.");
            return Err(Abort::CategoryMissing(category_name.clone()));
        };

        let participant = ensure_role(
            self.api,
            &self.config.participant_role_name,
            PARTICIPANT_ROLE_REASON,
        )
        .await;
        let global_access = ensure_role(
            self.api,
            &self.config.global_access_role_name,
            GLOBAL_ROLE_REASON,
        )
        .await;

        match (participant, global_access) {
            (Some(participant), Some(global_access)) => Ok(Targets {
                category: category.id,
                participant,
                global_access,
            }),
            _ => Err(Abort::RoleUnavailable),
        }
    }

    /// Processes roster rows in order until they run out or the run aborts.
    async fn provision_rows<I>(&mut self, targets: &Targets, rows: I) -> ProvisionReport
    where
        I: IntoIterator<Item = Result<RosterRow, RosterError>>,
    {
        let mut report = ProvisionReport::default();

        for row in rows {
            let record = match row {
                Ok(RosterRow::Team { record, .. }) => record,
                Ok(RosterRow::Skipped { line, fields }) => {
                    warn!(line, "Skipping invalid row: {fields:?}");
                    report.skipped_rows.push(line);
                    continue;
                }
                Err(e) => {
                    error!("Unexpected error during roster processing: {e}");
                    report.abort = Some(Abort::RosterUnreadable(e.to_string()));
                    break;
                }
            };

            let span = info_span!("team", team = %record.team_name());
            let team = self.provision_team(targets, &record).instrument(span).await;
            let fatal = matches!(team.outcome, TeamOutcome::CreationForbidden);
            report.teams.push(team);

            if fatal {
                report.abort = Some(Abort::ChannelCreationForbidden);
                break;
            }
        }

        report
    }

    async fn provision_team(&mut self, targets: &Targets, record: &TeamRecord) -> TeamReport {
        let channel_name = record.channel_name();
        info!("--- Processing Team: {} (Channel: #{channel_name}) ---", record.team_name());

        let mut report = TeamReport {
            team_name: record.team_name().to_string(),
            channel_name: channel_name.clone(),
            unresolved: Vec::new(),
            grants: Vec::new(),
            outcome: TeamOutcome::NoMembers,
        };

        let members = match self.api.members().await {
            Ok(members) => members,
            Err(e) => {
                error!("Could not list guild members: {e}");
                report.outcome = TeamOutcome::MemberLookupFailed(e.to_string());
                return report;
            }
        };

        let Resolution {
            resolved,
            unresolved,
        } = resolve_members(&members, record.member_names());

        report.grants = self.grant_participant_role(&resolved, &targets.participant).await;

        if !unresolved.is_empty() {
            warn!(
                "Could not find users: {}. Ensure they are on the server.",
                format_name_list(unresolved.as_slice())
            );
        }
        report.unresolved = unresolved;

        if resolved.is_empty() {
            error!("No valid members found. Skipping channel setup for this team.");
            return report;
        }

        let overwrites = build_overwrites(
            everyone_role(self.api.guild_id()),
            self.api.bot_user_id(),
            targets.global_access.id,
            &resolved,
        );

        let existing = self
            .api
            .text_channels_in(targets.category)
            .into_iter()
            .find(|c| c.name == channel_name.as_str());

        report.outcome = match existing {
            None => {
                self.create_channel(targets, record, &channel_name, overwrites, &resolved)
                    .await
            }
            Some(channel) => self.sync_channel(&channel, overwrites, &resolved).await,
        };
        report
    }

    /// Grants the participant role to members not yet seen in this run.
    ///
    /// A member is marked as processed whatever the outcome, so each member
    /// gets at most one grant attempt per run.
    async fn grant_participant_role(
        &mut self,
        members: &[MemberInfo],
        role: &RoleInfo,
    ) -> Vec<(UserId, GrantOutcome)> {
        let mut grants = Vec::new();

        for member in members {
            if !self.processed.insert(member.id) {
                continue;
            }

            let outcome = if member.roles.contains(&role.id) {
                GrantOutcome::AlreadyHeld
            } else {
                match self.api.add_role(member.id, role.id, GRANT_REASON).await {
                    Ok(()) => {
                        info!(
                            "Assigned '{}' role to {} ({})",
                            role.name, member.display_name, member.tag
                        );
                        GrantOutcome::Granted
                    }
                    Err(ApiError::Forbidden(_)) => {
                        warn!("No permission to assign roles to {}", member.display_name);
                        GrantOutcome::Forbidden
                    }
                    Err(e) => {
                        warn!("Failed to assign role to {}: {e}", member.display_name);
                        GrantOutcome::Failed(e.to_string())
                    }
                }
            };
            grants.push((member.id, outcome));
        }

        grants
    }

    async fn create_channel(
        &self,
        targets: &Targets,
        record: &TeamRecord,
        channel_name: &ChannelName,
        overwrites: Vec<Overwrite>,
        members: &[MemberInfo],
    ) -> TeamOutcome {
        info!("Channel does not exist. Creating #{channel_name}...");

        let request = NewChannel {
            name: channel_name.to_string(),
            category: targets.category,
            overwrites,
            reason: format!("Creating channel for team {}", record.team_name()),
        };

        match self.api.create_text_channel(request).await {
            Ok(channel) => {
                info!("Successfully created channel #{}", channel.name);
                let ids: Vec<u64> = members.iter().map(|m| m.id.get()).collect();
                let welcomed = self
                    .send_welcome(channel.id, &new_channel_welcome(record.team_name(), &ids))
                    .await;
                TeamOutcome::Created {
                    channel: channel.id,
                    welcomed,
                }
            }
            Err(ApiError::Forbidden(e)) => {
                error!(
                    "No permission to create channels in '{}': {e}",
                    self.config.category_name
                );
                TeamOutcome::CreationForbidden
            }
            Err(e) => {
                error!(
                    "Unexpected error creating channel for team '{}': {e}",
                    record.team_name()
                );
                TeamOutcome::CreationFailed(e.to_string())
            }
        }
    }

    async fn sync_channel(
        &self,
        channel: &ChannelInfo,
        overwrites: Vec<Overwrite>,
        members: &[MemberInfo],
    ) -> TeamOutcome {
        info!("Channel #{} already exists. Syncing permissions...", channel.name);

        // Must be computed before the overwrites are replaced.
        let added: Vec<UserId> = newly_added(&channel.overwrites, members)
            .iter()
            .map(|m| m.id)
            .collect();

        match self.api.set_overwrites(channel.id, overwrites).await {
            Ok(()) => {
                info!("Successfully synced permissions for #{}", channel.name);
                let welcomed = if added.is_empty() {
                    info!("No new members detected for this team.");
                    false
                } else {
                    info!(
                        "Detected {} new member(s). Sending welcome message.",
                        added.len()
                    );
                    let ids: Vec<u64> = added.iter().map(|id| id.get()).collect();
                    self.send_welcome(channel.id, &added_members_welcome(&ids))
                        .await
                };
                TeamOutcome::Synced {
                    channel: channel.id,
                    newly_added: added,
                    welcomed,
                }
            }
            Err(ApiError::Forbidden(e)) => {
                warn!("No permission to update permissions for #{}: {e}", channel.name);
                TeamOutcome::SyncForbidden
            }
            Err(e) => {
                error!("An error occurred updating permissions for #{}: {e}", channel.name);
                TeamOutcome::SyncFailed(e.to_string())
            }
        }
    }

    async fn send_welcome(&self, channel: ChannelId, content: &str) -> bool {
        match self.api.send_message(channel, content).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not send welcome message: {e}");
                false
            }
        }
    }
}
