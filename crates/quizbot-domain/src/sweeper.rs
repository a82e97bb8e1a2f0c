//! Background removal of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use quizbot_session::SessionStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Run [`SessionStore::sweep`] every `interval` until `cancel` fires.
///
/// A zero `interval` falls back to the store's configured sweep interval,
/// which construction guarantees is non-zero.
///
/// Expired sessions are already invisible to reads; sweeping only bounds
/// memory held by users who never come back.
pub fn spawn_sweeper(
    store: Arc<SessionStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let interval = if interval.is_zero() {
        store.config().sweep_interval
    } else {
        interval
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        debug!(interval_secs = interval.as_secs(), "Session sweeper started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Session sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    if removed > 0 {
                        debug!(removed, remaining = store.len(), "Expired sessions swept");
                    }
                }
            }
        }
    })
}
