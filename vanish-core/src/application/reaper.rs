use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::data::post_store::PostStore;
use crate::domain::error::DomainError;
use crate::domain::expiry::ExpiryPolicy;

pub const DEFAULT_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_TICK_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy)]
pub struct ReaperConfig {
    pub interval: Duration,
    pub tick_timeout: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            tick_timeout: Duration::from_secs(DEFAULT_TICK_TIMEOUT_SECS),
        }
    }
}

/// Background storage reclamation for expired posts.
///
/// The reaper is an optimization only: read paths filter by expiry themselves
/// and never depend on how recently a sweep ran. Each tick deletes the whole
/// expired batch in one atomic statement; a failed or timed-out tick is logged
/// and retried at the next interval, and ticks never overlap.
pub struct Reaper<P> {
    posts: P,
    policy: ExpiryPolicy,
    config: ReaperConfig,
}

impl<P: PostStore + 'static> Reaper<P> {
    pub fn new(posts: P, policy: ExpiryPolicy, config: ReaperConfig) -> Self {
        Self {
            posts,
            policy,
            config,
        }
    }

    /// One sweep against the current clock.
    pub async fn tick(&self) -> Result<u64, DomainError> {
        self.tick_at(Utc::now()).await
    }

    /// One sweep with a caller-fixed `now`; deletes every post older than
    /// `now - ttl`, cascading into reply subtrees.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        self.posts.delete_expired(self.policy.cutoff(now)).await
    }

    /// Starts the periodic task. The returned handle stops it cleanly; the
    /// task itself never terminates on sweep errors.
    pub fn spawn(self) -> ReaperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match tokio::time::timeout(self.config.tick_timeout, self.tick()).await {
                            Ok(Ok(0)) => debug!("no expired posts to delete"),
                            Ok(Ok(deleted)) => info!(deleted, "deleted expired posts"),
                            Ok(Err(err)) => {
                                warn!(error = %err, "expired-post sweep failed, retrying next tick");
                            }
                            Err(_) => warn!("expired-post sweep timed out, retrying next tick"),
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("reaper shutting down");
                        break;
                    }
                }
            }
        });

        ReaperHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

pub struct ReaperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
