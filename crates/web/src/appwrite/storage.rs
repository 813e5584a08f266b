//! Storage service: file upload and view URLs.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use gymnet_core::FileId;

use super::{AppwriteClient, AppwriteError, Auth, FileRecord, segment};

impl AppwriteClient {
    /// Upload a file to `bucket_id` under a generated ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is invalid, the store is
    /// unreachable, or the upload is rejected.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn create_file(
        &self,
        bucket_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRecord, AppwriteError> {
        let url = self.url(&format!("/storage/buckets/{}/files", segment(bucket_id)))?;

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().text("fileId", "unique()").part("file", part);

        self.execute(self.request(Method::POST, url, Auth::ApiKey).multipart(form))
            .await
    }

    /// Public view URL for a stored file.
    #[must_use]
    pub fn file_view_url(&self, bucket_id: &str, file_id: &FileId) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint(),
            segment(bucket_id),
            segment(file_id.as_str()),
            urlencoding::encode(self.project_id())
        )
    }
}
