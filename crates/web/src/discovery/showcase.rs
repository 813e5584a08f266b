//! The set of profiles on the landing page.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use gymnet_core::Profile;

use super::{ProfileSource, sample_profiles};

/// How often the background task resamples.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(6);

/// Process-wide showcase shared by every visitor.
///
/// Refreshes are not coalesced: a timer refresh and a visitor-triggered one
/// can overlap, and whichever finishes last wins.
#[derive(Debug, Default)]
pub struct Showcase {
    profiles: RwLock<Vec<Profile>>,
}

impl Showcase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Profiles currently on display.
    pub async fn profiles(&self) -> Vec<Profile> {
        self.profiles.read().await.clone()
    }

    /// Sample a new set and display it, unless sampling came back empty.
    ///
    /// Returns the set on display afterwards.
    pub async fn refresh<S: ProfileSource>(&self, source: &S) -> Vec<Profile> {
        let sampled = sample_profiles(source).await;
        if sampled.is_empty() {
            debug!("Sampling found nothing, keeping previous showcase");
            return self.profiles().await;
        }

        let mut profiles = self.profiles.write().await;
        profiles.clone_from(&sampled);
        sampled
    }

    /// Spawn the periodic refresh task. The first refresh runs immediately.
    ///
    /// Abort the returned handle to stop refreshing.
    pub fn spawn_refresh<S>(self: &Arc<Self>, source: S, every: Duration) -> JoinHandle<()>
    where
        S: ProfileSource + 'static,
    {
        let showcase = Arc::clone(self);
        info!(interval_secs = every.as_secs(), "Spawning showcase refresh task");

        tokio::spawn(async move {
            let mut tick = interval(every);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                let shown = showcase.refresh(&source).await;
                debug!(count = shown.len(), "Showcase refreshed");
            }
        })
    }
}
