use tenura_application::PolicyStore;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::warn;

/// Periodically replaces the in-memory policy view with the durable rules,
/// picking up writes made by other API instances.
pub fn spawn_policy_reload(policies: PolicyStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The view was loaded during start-up.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(error) = policies.reload().await {
                warn!(error = %error, "failed to reload policy rules");
            }
        }
    })
}
