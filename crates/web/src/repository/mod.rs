//! Profile and like storage on top of Appwrite.
//!
//! # Collections
//!
//! - `users` - One profile document per member, linked by `accountId`.
//!   Structured fields (`contactDetails`, `socialLinks`, `workImages`,
//!   `gymLocations`) are string attributes holding JSON.
//! - `likes` - One document per (liker, liked profile) pair.
//!
//! # Failure policy
//!
//! Reads never fail: a failed fetch is logged and resolves to `None` or an
//! empty list. Writes return [`RepositoryError`] so the initiating flow can
//! show a message.

mod conversions;
mod likes;

pub use likes::LikeRepository;

use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use gymnet_core::{AccountId, Profile, ProfileDraft, ProfileId, ProfileUpdate};

use crate::appwrite::{AppwriteClient, AppwriteError, Query};
use crate::config::AppwriteConfig;
use conversions::{draft_to_data, profile_from_document, update_to_data};

/// Documents scanned when picking a random profile.
const RANDOM_SCAN_LIMIT: u32 = 100;

/// Page size used when scanning the collection for search matches.
const SEARCH_PAGE_SIZE: u32 = 100;

/// Errors returned by repository writes.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Looking up a profile failed (distinct from "no such profile").
    #[error("failed to read profile: {0}")]
    Read(#[source] AppwriteError),

    /// Creating a document was rejected.
    #[error("failed to save profile: {0}")]
    Write(#[source] AppwriteError),

    /// Patching a document was rejected.
    #[error("failed to update profile: {0}")]
    Update(#[source] AppwriteError),

    /// Storing a file failed.
    #[error("failed to upload image: {0}")]
    Upload(#[source] AppwriteError),

    /// No storage bucket is configured.
    #[error("image uploads are not configured (APPWRITE_BUCKET_ID is not set)")]
    MissingBucket,

    /// Creating or deleting a like failed.
    #[error("failed to update like: {0}")]
    Like(#[source] AppwriteError),
}

/// Repository for member profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    client: AppwriteClient,
    database_id: String,
    collection_id: String,
    bucket_id: Option<String>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub fn new(client: AppwriteClient, config: &AppwriteConfig) -> Self {
        Self {
            client,
            database_id: config.database_id.clone(),
            collection_id: config.user_collection_id.clone(),
            bucket_id: config.bucket_id.clone(),
        }
    }

    /// Store a new profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Write` if the document store rejects the write.
    #[instrument(skip(self, draft), fields(account_id = %draft.account_id))]
    pub async fn create(&self, draft: &ProfileDraft) -> Result<Profile, RepositoryError> {
        let doc = self
            .client
            .create_document(
                &self.database_id,
                &self.collection_id,
                None,
                &draft_to_data(draft),
            )
            .await
            .map_err(RepositoryError::Write)?;

        debug!(profile_id = %doc.id, "Profile created");
        Ok(profile_from_document(&doc))
    }

    /// Get a profile by ID. Any fetch failure resolves to `None`.
    #[instrument(skip(self), fields(profile_id = %id))]
    pub async fn get_by_id(&self, id: &ProfileId) -> Option<Profile> {
        match self
            .client
            .get_document(&self.database_id, &self.collection_id, id.as_str())
            .await
        {
            Ok(doc) => Some(profile_from_document(&doc)),
            Err(AppwriteError::NotFound(_)) => None,
            Err(e) => {
                warn!(error = %e, "Failed to fetch profile");
                None
            }
        }
    }

    /// Find the profile linked to an auth account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Read` if the lookup fails, so callers never
    /// mistake an outage for a missing profile.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Profile>, RepositoryError> {
        let list = self
            .client
            .list_documents(
                &self.database_id,
                &self.collection_id,
                &[
                    Query::equal(conversions::ACCOUNT_ID, account_id.as_str()),
                    Query::limit(1),
                ],
            )
            .await
            .map_err(RepositoryError::Read)?;

        Ok(list.documents.first().map(profile_from_document))
    }

    /// Patch a profile. Structured fields are serialized here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Update` with the underlying message if the
    /// patch is rejected.
    #[instrument(skip(self, update), fields(profile_id = %id))]
    pub async fn update(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError> {
        let doc = self
            .client
            .update_document(
                &self.database_id,
                &self.collection_id,
                id.as_str(),
                &update_to_data(update),
            )
            .await
            .map_err(RepositoryError::Update)?;

        Ok(profile_from_document(&doc))
    }

    /// Profiles whose name or business description contains `term`,
    /// ignoring case.
    ///
    /// Pages through the whole collection, newest first. A blank term returns
    /// no results without calling the backend. Failures resolve to an empty
    /// list.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str) -> Vec<Profile> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        // Appwrite's `contains` is case-sensitive, so every page is filtered locally
        let mut matches = Vec::new();
        let mut scanned: u64 = 0;
        let mut cursor: Option<String> = None;
        loop {
            let mut queries = vec![
                Query::order_desc("$createdAt"),
                Query::limit(SEARCH_PAGE_SIZE),
            ];
            if let Some(last) = &cursor {
                queries.push(Query::cursor_after(last));
            }

            let page = match self
                .client
                .list_documents(&self.database_id, &self.collection_id, &queries)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, scanned, "Profile search failed");
                    return Vec::new();
                }
            };

            scanned += page.documents.len() as u64;
            matches.extend(
                page.documents
                    .iter()
                    .map(profile_from_document)
                    .filter(|profile| profile.matches(term)),
            );

            let short_page = page.documents.len() < SEARCH_PAGE_SIZE as usize;
            match page.documents.last() {
                Some(last) if !short_page && scanned < page.total => {
                    cursor = Some(last.id.clone());
                }
                _ => break,
            }
        }

        debug!(scanned, hits = matches.len(), "Profile search finished");
        matches
    }

    /// A uniformly random complete profile, or `None` if there is none or the
    /// listing fails.
    #[instrument(skip(self))]
    pub async fn random_profile(&self) -> Option<Profile> {
        let list = match self
            .client
            .list_documents(
                &self.database_id,
                &self.collection_id,
                &[Query::limit(RANDOM_SCAN_LIMIT)],
            )
            .await
        {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "Failed to list profiles");
                return None;
            }
        };

        let complete: Vec<Profile> = list
            .documents
            .iter()
            .map(profile_from_document)
            .filter(Profile::is_complete)
            .collect();

        if complete.is_empty() {
            debug!(scanned = list.documents.len(), "No complete profiles found");
            return None;
        }

        complete.choose(&mut rand::rng()).cloned()
    }

    /// Store an image and return its public view URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingBucket` immediately if no bucket is
    /// configured, or `RepositoryError::Upload` if the store rejects the file.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RepositoryError> {
        let bucket_id = self
            .bucket_id
            .as_deref()
            .ok_or(RepositoryError::MissingBucket)?;

        let file = self
            .client
            .create_file(bucket_id, file_name, content_type, bytes)
            .await
            .map_err(RepositoryError::Upload)?;

        Ok(self.client.file_view_url(bucket_id, &file.id))
    }

    /// Initials avatar URL for a new profile.
    ///
    /// Falls back to an empty string, which renders as initials anyway.
    #[must_use]
    pub fn avatar_url(&self, name: &str) -> String {
        self.client.avatar_initials_url(name).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build avatar URL");
            String::new()
        })
    }
}
