//! Random sampling of complete profiles.

use tracing::{debug, instrument};

use gymnet_core::Profile;

use super::ProfileSource;

/// Profiles shown in the showcase.
pub const SHOWCASE_SIZE: usize = 4;

/// Fetches per sampling round.
pub const MAX_SAMPLE_ATTEMPTS: usize = 8;

/// Collect up to [`SHOWCASE_SIZE`] distinct complete profiles, fetching one
/// candidate at a time and giving up after [`MAX_SAMPLE_ATTEMPTS`] fetches.
///
/// Duplicates and incomplete profiles are skipped. Each fetch is a fresh
/// uniform pick, so the same profile can come back repeatedly.
#[instrument(skip_all)]
pub async fn sample_profiles<S: ProfileSource>(source: &S) -> Vec<Profile> {
    let mut picked: Vec<Profile> = Vec::with_capacity(SHOWCASE_SIZE);

    for attempt in 1..=MAX_SAMPLE_ATTEMPTS {
        let Some(candidate) = source.random_profile().await else {
            debug!(attempt, "No candidate returned");
            continue;
        };

        if !candidate.is_complete() {
            debug!(attempt, profile_id = %candidate.id, "Skipping incomplete profile");
        } else if picked.iter().any(|p| p.id == candidate.id) {
            debug!(attempt, profile_id = %candidate.id, "Skipping duplicate profile");
        } else {
            picked.push(candidate);
            if picked.len() == SHOWCASE_SIZE {
                break;
            }
        }
    }

    debug!(count = picked.len(), "Sampling finished");
    picked
}
