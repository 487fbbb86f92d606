//! Lookup-or-create for the two long-lived roles.
//!
//! There is no guard against another actor creating the same role between the
//! lookup and the create; only one provisioner is expected per guild.

use crate::platform::{GuildApi, RoleInfo};
use tracing::{debug, error, info};

/// Returns the role named `name`, creating it when absent.
///
/// Returns `None` when the role cannot be created. Callers must stop if a
/// required role is unavailable.
pub async fn ensure_role<G>(api: &G, name: &str, reason: &str) -> Option<RoleInfo>
where
    G: GuildApi + ?Sized,
{
    if let Some(role) = api.roles().into_iter().find(|role| role.name == name) {
        debug!(role = %role.name, id = %role.id, "Found existing role");
        return Some(role);
    }

    info!("Role '{name}' not found. Creating it...");
    match api.create_role(name, reason).await {
        Ok(role) => {
            info!(id = %role.id, "Created new role: '{name}'");
            Some(role)
        }
        Err(e) if e.is_forbidden() => {
            error!("No permission to create roles. Grant the bot 'Manage Roles': {e}");
            None
        }
        Err(e) => {
            error!("Unexpected error while creating role '{name}': {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::fake::FakeGuild;
    use crate::platform::MockGuildApi;
    use serenity::all::RoleId;

    #[tokio::test]
    async fn test_existing_role_is_not_recreated() {
        let mut api = MockGuildApi::new();
        api.expect_roles().returning(|| {
            vec![RoleInfo {
                id: RoleId::new(7),
                name: "Participant".to_string(),
            }]
        });
        api.expect_create_role().times(0);

        let role = ensure_role(&api, "Participant", "test").await.unwrap();
        assert_eq!(role.id, RoleId::new(7));
    }

    #[tokio::test]
    async fn test_forbidden_creation_returns_none() {
        let mut api = MockGuildApi::new();
        api.expect_roles().returning(Vec::new);
        api.expect_create_role()
            .times(1)
            .returning(|_, _| Err(ApiError::Forbidden("Manage Roles".to_string())));

        assert!(ensure_role(&api, "Mentor", "test").await.is_none());
    }

    #[tokio::test]
    async fn test_other_creation_failure_returns_none() {
        let mut api = MockGuildApi::new();
        api.expect_roles().returning(Vec::new);
        api.expect_create_role()
            .times(1)
            .returning(|_, _| Err(ApiError::Other("timeout".to_string())));

        assert!(ensure_role(&api, "Mentor", "test").await.is_none());
    }

    #[tokio::test]
    async fn test_ensure_role_is_idempotent() {
        let guild = FakeGuild::new();

        let first = ensure_role(&guild, "Participant", "test").await.unwrap();
        let second = ensure_role(&guild, "Participant", "test").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(guild.created_roles(), vec!["Participant".to_string()]);
    }
}
