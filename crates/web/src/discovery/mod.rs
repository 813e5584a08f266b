//! Profile discovery.
//!
//! Two independent algorithms pick which profiles a visitor sees:
//!
//! - **Random sampling** ([`sample_profiles`], [`Showcase`]): up to four
//!   distinct complete profiles, refreshed every six seconds by a background
//!   task. A failed refresh keeps the previous set.
//! - **Debounced search** ([`DebouncedSearch`]): a search runs only after
//!   input has been quiet for 300ms; blank input clears results at once.
//!
//! Both work against any [`ProfileSource`], which the profile repository
//! implements.

mod sampler;
mod search;
mod showcase;

pub use sampler::{MAX_SAMPLE_ATTEMPTS, SHOWCASE_SIZE, sample_profiles};
pub use search::{DebouncedSearch, SEARCH_QUIET_PERIOD, SearchResults};
pub use showcase::{REFRESH_INTERVAL, Showcase};

use std::future::Future;
use std::sync::Arc;

use gymnet_core::Profile;

use crate::repository::ProfileRepository;

/// Where discovery gets its candidates from.
pub trait ProfileSource: Send + Sync {
    /// One profile chosen uniformly at random, or `None`.
    fn random_profile(&self) -> impl Future<Output = Option<Profile>> + Send;

    /// Profiles matching `term`. Never fails; errors yield an empty list.
    fn search(&self, term: &str) -> impl Future<Output = Vec<Profile>> + Send;
}

impl ProfileSource for ProfileRepository {
    async fn random_profile(&self) -> Option<Profile> {
        Self::random_profile(self).await
    }

    async fn search(&self, term: &str) -> Vec<Profile> {
        Self::search(self, term).await
    }
}

impl<T: ProfileSource> ProfileSource for Arc<T> {
    fn random_profile(&self) -> impl Future<Output = Option<Profile>> + Send {
        T::random_profile(self)
    }

    fn search(&self, term: &str) -> impl Future<Output = Vec<Profile>> + Send {
        T::search(self, term)
    }
}
