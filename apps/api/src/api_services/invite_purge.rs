use chrono::Utc;
use tenura_application::InviteService;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{info, warn};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Periodically deletes expired invite tokens.
pub fn spawn_invite_purge(invite_service: InviteService) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(PURGE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match invite_service.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "expired invites purged"),
                Err(error) => warn!(error = %error, "failed to purge expired invites"),
            }
        }
    })
}
