//! Session lifecycle: login, readiness, one provisioning pass, teardown.

use crate::discord::SerenityGuild;
use crate::error::{BotError, BotResult};
use crate::provisioner::{ProvisionReport, TeamProvisioner};
use futures::FutureExt;
use serenity::all::{Client, Context, EventHandler, GatewayIntents, GuildId, Ready};
use serenity::async_trait;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use teamsync_config::Config;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinError;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// How a session ended once it was ready.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The provisioning pass ran to completion or stopped on its own.
    Completed(ProvisionReport),
    /// The configured guild is not visible to the bot.
    GuildNotFound(GuildId),
    /// The provisioning pass panicked.
    Panicked,
}

/// How long to wait for every guild to arrive after login before
/// provisioning with whatever the cache holds.
pub const CACHE_READY_TIMEOUT: Duration = Duration::from_secs(10);

type ContextSlot = Mutex<Option<oneshot::Sender<Context>>>;

/// Hands the login and cache-ready contexts to the waiting session.
struct ReadyHandler {
    ready_tx: ContextSlot,
    cache_tx: ContextSlot,
}

impl ReadyHandler {
    fn new(ready_tx: oneshot::Sender<Context>, cache_tx: oneshot::Sender<Context>) -> Self {
        Self {
            ready_tx: Mutex::new(Some(ready_tx)),
            cache_tx: Mutex::new(Some(cache_tx)),
        }
    }
}

async fn signal(slot: &ContextSlot, ctx: Context) {
    if let Some(tx) = slot.lock().await.take() {
        // The receiver is gone only when the session already gave up.
        let _ = tx.send(ctx);
    }
}

#[async_trait]
impl EventHandler for ReadyHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {} ({})", ready.user.tag(), ready.user.id);

        // cache_ready never fires for a bot in no guilds.
        if ready.guilds.is_empty() {
            self.cache_tx.lock().await.take();
        }
        signal(&self.ready_tx, ctx).await;
    }

    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        debug!(guilds = guilds.len(), "Gateway cache ready");
        signal(&self.cache_tx, ctx).await;
    }
}

/// Waits for login, then for the cache to fill, falling back to the login
/// context when the cache is not ready within `limit`.
///
/// Returns `None` when login never happened.
async fn wait_until_ready<T>(
    ready: oneshot::Receiver<T>,
    cache_ready: oneshot::Receiver<T>,
    limit: Duration,
) -> Option<T> {
    let login = ready.await.ok()?;

    match timeout(limit, cache_ready).await {
        Ok(Ok(ctx)) => Some(ctx),
        Ok(Err(_)) => Some(login),
        Err(_) => {
            warn!(
                "Not every guild became available within {}s. Continuing with the cached guilds.",
                limit.as_secs()
            );
            Some(login)
        }
    }
}

/// One-shot provisioning session.
pub struct TeamSyncBot {
    config: Arc<Config>,
}

impl TeamSyncBot {
    /// Creates a new session for `config`.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Connects, runs one provisioning pass, and closes the session.
    ///
    /// The session is shut down exactly once on every path after login.
    pub async fn run(&self) -> BotResult<SessionOutcome> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (cache_tx, cache_rx) = oneshot::channel();
        let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;

        let mut client = Client::builder(&self.config.token, intents)
            .event_handler(ReadyHandler::new(ready_tx, cache_tx))
            .await
            .map_err(BotError::from_client)?;

        let shard_manager = Arc::clone(&client.shard_manager);
        let mut gateway = tokio::spawn(async move { client.start().await });

        let ready = tokio::select! {
            biased;
            joined = &mut gateway => Err(gateway_stopped(joined)),
            ctx = wait_until_ready(ready_rx, cache_rx, CACHE_READY_TIMEOUT) => match ctx {
                Some(ctx) => Ok(ctx),
                None => Err(gateway_stopped((&mut gateway).await)),
            },
        };

        let ctx = match ready {
            Ok(ctx) => ctx,
            Err(e) => {
                shard_manager.shutdown_all().await;
                return Err(e);
            }
        };

        let outcome = self.provision(&ctx).await;

        info!("Closing the Discord session");
        shard_manager.shutdown_all().await;
        match gateway.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Gateway reported an error during shutdown: {e}"),
            Err(e) => warn!("Gateway task did not finish cleanly: {e}"),
        }

        Ok(outcome)
    }

    async fn provision(&self, ctx: &Context) -> SessionOutcome {
        let guild_id = GuildId::new(self.config.guild_id.get());
        let Some((guild, name)) = SerenityGuild::from_cache(ctx, guild_id) else {
            error!(
                "Server with ID {guild_id} not found. Check GUILD_ID and make sure the bot has been invited to the server."
            );
            return SessionOutcome::GuildNotFound(guild_id);
        };
        info!("Successfully connected to server: {name}");

        let mut provisioner = TeamProvisioner::new(&guild, &self.config);
        match AssertUnwindSafe(provisioner.run()).catch_unwind().await {
            Ok(report) => {
                log_summary(&report);
                SessionOutcome::Completed(report)
            }
            Err(_) => {
                error!("Provisioning panicked. Closing the session.");
                SessionOutcome::Panicked
            }
        }
    }
}

fn log_summary(report: &ProvisionReport) {
    info!(
        teams = report.teams.len(),
        skipped_rows = report.skipped_rows.len(),
        "Provisioning pass finished"
    );
    if let Some(abort) = &report.abort {
        warn!("Provisioning stopped early: {abort:?}");
    }
}

/// Maps the end of the gateway task, before readiness, to an error.
fn gateway_stopped(joined: Result<Result<(), serenity::Error>, JoinError>) -> BotError {
    match joined {
        Ok(Ok(())) => BotError::NotReady,
        Ok(Err(e)) => BotError::from_client(e),
        Err(e) => BotError::Gateway(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::gateway::GatewayError;

    #[test]
    fn test_clean_stop_before_ready() {
        assert!(matches!(gateway_stopped(Ok(Ok(()))), BotError::NotReady));
    }

    #[test]
    fn test_rejected_token_before_ready() {
        let err = serenity::Error::Gateway(GatewayError::InvalidAuthentication);
        assert!(matches!(gateway_stopped(Ok(Err(err))), BotError::InvalidToken));
    }

    #[tokio::test]
    async fn test_gateway_task_panic_before_ready() {
        let joined = tokio::spawn(async {
            if true {
                panic!("gateway task");
            }
            Ok::<(), serenity::Error>(())
        })
        .await;
        let err = gateway_stopped(joined);
        assert!(matches!(err, BotError::Gateway(_)));
    }

    #[tokio::test]
    async fn test_cache_ready_context_is_preferred() {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (cache_tx, cache_rx) = oneshot::channel();
        ready_tx.send("login").unwrap();
        cache_tx.send("cache").unwrap();

        let ctx = wait_until_ready(ready_rx, cache_rx, Duration::from_secs(5)).await;
        assert_eq!(ctx, Some("cache"));
    }

    #[tokio::test]
    async fn test_unavailable_guild_falls_back_to_login_context() {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (_cache_tx, cache_rx) = oneshot::channel::<&str>();
        ready_tx.send("login").unwrap();

        let ctx = wait_until_ready(ready_rx, cache_rx, Duration::from_millis(20)).await;
        assert_eq!(ctx, Some("login"));
    }

    #[tokio::test]
    async fn test_no_guilds_uses_login_context_without_waiting() {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (cache_tx, cache_rx) = oneshot::channel::<&str>();
        ready_tx.send("login").unwrap();
        drop(cache_tx);

        let ctx = wait_until_ready(ready_rx, cache_rx, Duration::from_secs(3600)).await;
        assert_eq!(ctx, Some("login"));
    }

    #[tokio::test]
    async fn test_no_login_yields_nothing() {
        let (ready_tx, ready_rx) = oneshot::channel::<&str>();
        let (_cache_tx, cache_rx) = oneshot::channel();
        drop(ready_tx);

        assert_eq!(wait_until_ready(ready_rx, cache_rx, Duration::from_secs(3600)).await, None);
    }

    #[test]
    fn test_bot_keeps_config() {
        let config = Config {
            token: "abc.def.ghi".to_string(),
            guild_id: std::num::NonZeroU64::new(1).unwrap(),
            category_name: "Teams".to_string(),
            roster_path: "teams.csv".into(),
            participant_role_name: "Participant".to_string(),
            global_access_role_name: "Mentor".to_string(),
        };
        let bot = TeamSyncBot::new(config.clone());
        assert_eq!(*bot.config, config);
    }
}
