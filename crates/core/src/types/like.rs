//! Like records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{LikeId, ProfileId};

/// One member liking another member's profile.
///
/// At most one `Like` exists per `(user_id, profile_id)` pair; the web crate
/// keys the stored document by the pair so repeated likes collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    /// Profile of the member who liked.
    pub user_id: ProfileId,
    /// Profile that was liked.
    pub profile_id: ProfileId,
    pub created_at: DateTime<Utc>,
}
