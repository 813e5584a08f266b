//! Like repository.
//!
//! Like documents are keyed by a hash of the (liker, liked) pair, so two
//! concurrent likes of the same profile collide on create instead of
//! producing duplicates. The collision is treated as success.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use gymnet_core::{Like, LikeId, ProfileId};

use super::RepositoryError;
use crate::appwrite::{AppwriteClient, AppwriteError, Document, Query};
use crate::config::AppwriteConfig;

const USER_ID: &str = "userId";
const PROFILE_ID: &str = "profileId";
const CREATED_AT: &str = "createdAt";

/// Appwrite document IDs are at most 36 characters.
const MAX_DOCUMENT_ID_LEN: usize = 36;

/// Document ID for the like of `profile` by `user`.
#[must_use]
pub fn like_id(user: &ProfileId, profile: &ProfileId) -> LikeId {
    let mut hasher = Sha256::new();
    hasher.update(user.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(profile.as_str().as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(MAX_DOCUMENT_ID_LEN);
    LikeId::new(id)
}

fn like_from_document(doc: &Document) -> Like {
    let created_at = DateTime::parse_from_rfc3339(doc.get_str(CREATED_AT))
        .or_else(|_| DateTime::parse_from_rfc3339(doc.created_at.as_deref().unwrap_or_default()))
        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

    Like {
        id: LikeId::new(doc.id.as_str()),
        user_id: ProfileId::new(doc.get_str(USER_ID)),
        profile_id: ProfileId::new(doc.get_str(PROFILE_ID)),
        created_at,
    }
}

/// Repository for likes.
#[derive(Clone)]
pub struct LikeRepository {
    client: AppwriteClient,
    database_id: String,
    collection_id: String,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub fn new(client: AppwriteClient, config: &AppwriteConfig) -> Self {
        Self {
            client,
            database_id: config.database_id.clone(),
            collection_id: config.likes_collection_id.clone(),
        }
    }

    fn pair_queries(user: &ProfileId, profile: &ProfileId) -> [Query; 2] {
        [
            Query::equal(USER_ID, user.as_str()),
            Query::equal(PROFILE_ID, profile.as_str()),
        ]
    }

    /// Whether `user` likes `profile`. Failures resolve to `false`.
    #[instrument(skip(self), fields(user = %user, profile = %profile))]
    pub async fn is_liked(&self, user: &ProfileId, profile: &ProfileId) -> bool {
        let [by_user, of_profile] = Self::pair_queries(user, profile);
        match self
            .client
            .list_documents(
                &self.database_id,
                &self.collection_id,
                &[by_user, of_profile, Query::limit(1)],
            )
            .await
        {
            Ok(list) => !list.documents.is_empty(),
            Err(e) => {
                warn!(error = %e, "Failed to check like status");
                false
            }
        }
    }

    /// Record that `user` likes `profile`. Liking twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Like` if the write is rejected for any
    /// reason other than the like already existing.
    #[instrument(skip(self), fields(user = %user, profile = %profile))]
    pub async fn like(&self, user: &ProfileId, profile: &ProfileId) -> Result<Like, RepositoryError> {
        let id = like_id(user, profile);
        let data = json!({
            USER_ID: user.as_str(),
            PROFILE_ID: profile.as_str(),
            CREATED_AT: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        match self
            .client
            .create_document(&self.database_id, &self.collection_id, Some(id.as_str()), &data)
            .await
        {
            Ok(doc) => Ok(like_from_document(&doc)),
            Err(AppwriteError::Conflict(_)) => {
                debug!("Like already exists");
                self.client
                    .get_document(&self.database_id, &self.collection_id, id.as_str())
                    .await
                    .map(|doc| like_from_document(&doc))
                    .map_err(RepositoryError::Like)
            }
            Err(e) => Err(RepositoryError::Like(e)),
        }
    }

    /// Remove the like of `profile` by `user`. Unliking twice is a no-op.
    ///
    /// Also removes likes stored under generated IDs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Like` if listing or deleting fails.
    #[instrument(skip(self), fields(user = %user, profile = %profile))]
    pub async fn unlike(&self, user: &ProfileId, profile: &ProfileId) -> Result<(), RepositoryError> {
        let [by_user, of_profile] = Self::pair_queries(user, profile);
        let list = self
            .client
            .list_documents(&self.database_id, &self.collection_id, &[by_user, of_profile])
            .await
            .map_err(RepositoryError::Like)?;

        for doc in &list.documents {
            match self
                .client
                .delete_document(&self.database_id, &self.collection_id, &doc.id)
                .await
            {
                Ok(()) | Err(AppwriteError::NotFound(_)) => {}
                Err(e) => return Err(RepositoryError::Like(e)),
            }
        }
        Ok(())
    }

    /// Flip the like state and return the new state (`true` = liked).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Like` if the write fails.
    pub async fn toggle(&self, user: &ProfileId, profile: &ProfileId) -> Result<bool, RepositoryError> {
        if self.is_liked(user, profile).await {
            self.unlike(user, profile).await?;
            Ok(false)
        } else {
            self.like(user, profile).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::appwrite::test_support;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCUMENTS: &str = "/v1/databases/main/collections/likes/documents";

    fn repository(server: &MockServer) -> LikeRepository {
        let config = test_support::config(&server.uri());
        LikeRepository::new(AppwriteClient::new(&config).unwrap(), &config)
    }

    fn ids() -> (ProfileId, ProfileId) {
        (ProfileId::new("me"), ProfileId::new("them"))
    }

    #[test]
    fn test_like_id_is_deterministic_and_valid() {
        let (me, them) = ids();
        let id = like_id(&me, &them);
        assert_eq!(id, like_id(&me, &them));
        assert_ne!(id, like_id(&them, &me));
        assert_eq!(id.as_str().len(), 36);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_like_creates_pair_keyed_document() {
        let server = MockServer::start().await;
        let (me, them) = ids();
        let id = like_id(&me, &them);
        Mock::given(method("POST"))
            .and(path(DOCUMENTS))
            .and(body_partial_json(json!({
                "documentId": id.as_str(),
                "data": {"userId": "me", "profileId": "them"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": id.as_str(),
                "userId": "me",
                "profileId": "them",
                "createdAt": "2024-05-01T10:00:00.000Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let like = repository(&server).like(&me, &them).await.unwrap();
        assert_eq!(like.id, id);
        assert_eq!(like.profile_id, them);
        assert_eq!(like.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[tokio::test]
    async fn test_second_like_is_a_no_op() {
        let server = MockServer::start().await;
        let (me, them) = ids();
        let id = like_id(&me, &them);
        Mock::given(method("POST"))
            .and(path(DOCUMENTS))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "Document with the requested ID already exists.",
                "code": 409,
                "type": "document_already_exists"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{DOCUMENTS}/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": id.as_str(),
                "userId": "me",
                "profileId": "them"
            })))
            .mount(&server)
            .await;

        let like = repository(&server).like(&me, &them).await.unwrap();
        assert_eq!(like.user_id, me);
    }

    #[tokio::test]
    async fn test_unlike_absent_like_is_a_no_op() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOCUMENTS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 0,
                "documents": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let (me, them) = ids();
        repository(&server).unlike(&me, &them).await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_unlikes_existing_like() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DOCUMENTS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "documents": [{"$id": "legacy-id", "userId": "me", "profileId": "them"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{DOCUMENTS}/legacy-id")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (me, them) = ids();
        assert!(!repository(&server).toggle(&me, &them).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_liked_failure_is_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (me, them) = ids();
        assert!(!repository(&server).is_liked(&me, &them).await);
    }
}
