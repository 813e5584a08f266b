//! Databases service: document CRUD and listing.

use reqwest::Method;
use serde_json::{Value, json};
use tracing::instrument;

use super::{AppwriteClient, AppwriteError, Auth, Document, DocumentList, Query, segment};

/// Placeholder ID that asks Appwrite to generate one.
const UNIQUE_ID: &str = "unique()";

impl AppwriteClient {
    fn documents_path(database_id: &str, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            segment(database_id),
            segment(collection_id)
        )
    }

    /// List documents matching `queries`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, AppwriteError> {
        let mut url = self.url(&Self::documents_path(database_id, collection_id))?;
        if !queries.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for query in queries {
                pairs.append_pair("queries[]", &query.to_string());
            }
        }

        self.execute(self.request(Method::GET, url, Auth::ApiKey))
            .await
    }

    /// Get one document by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppwriteError::NotFound`] if the document does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, AppwriteError> {
        let path = format!(
            "{}/{}",
            Self::documents_path(database_id, collection_id),
            segment(document_id)
        );
        let url = self.url(&path)?;

        self.execute(self.request(Method::GET, url, Auth::ApiKey))
            .await
    }

    /// Create a document. `document_id` of `None` lets Appwrite pick one.
    ///
    /// # Errors
    ///
    /// Returns [`AppwriteError::Conflict`] if a document with the same ID
    /// exists, or another error if the write is rejected.
    #[instrument(skip(self, data))]
    pub async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: Option<&str>,
        data: &Value,
    ) -> Result<Document, AppwriteError> {
        let url = self.url(&Self::documents_path(database_id, collection_id))?;
        let body = json!({
            "documentId": document_id.unwrap_or(UNIQUE_ID),
            "data": data,
        });

        self.execute(self.request(Method::POST, url, Auth::ApiKey).json(&body))
            .await
    }

    /// Patch a document with the attributes in `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or the write is
    /// rejected.
    #[instrument(skip(self, data))]
    pub async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &Value,
    ) -> Result<Document, AppwriteError> {
        let path = format!(
            "{}/{}",
            Self::documents_path(database_id, collection_id),
            segment(document_id)
        );
        let url = self.url(&path)?;
        let body = json!({ "data": data });

        self.execute(self.request(Method::PATCH, url, Auth::ApiKey).json(&body))
            .await
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns [`AppwriteError::NotFound`] if the document does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self))]
    pub async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), AppwriteError> {
        let path = format!(
            "{}/{}",
            Self::documents_path(database_id, collection_id),
            segment(document_id)
        );
        let url = self.url(&path)?;

        self.send(self.request(Method::DELETE, url, Auth::ApiKey))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::appwrite::test_support;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> AppwriteClient {
        AppwriteClient::new(&test_support::config(&server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_list_documents_sends_each_query() {
        let server = MockServer::start().await;
        let equal = Query::equal("accountId", "acc-1");
        Mock::given(method("GET"))
            .and(path("/v1/databases/main/collections/users/documents"))
            .and(query_param("queries[]", equal.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "documents": [{"$id": "p1", "accountId": "acc-1", "name": "Jo"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let list = client(&server)
            .await
            .list_documents("main", "users", &[equal, Query::limit(1)])
            .await
            .unwrap();

        assert_eq!(list.total, 1);
        assert_eq!(list.documents[0].id, "p1");
        assert_eq!(list.documents[0].get_str("name"), "Jo");
    }

    #[tokio::test]
    async fn test_create_document_defaults_to_unique_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/main/collections/users/documents"))
            .and(body_json(json!({
                "documentId": "unique()",
                "data": {"name": "Jo"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "generated",
                "name": "Jo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let doc = client(&server)
            .await
            .create_document("main", "users", None, &json!({"name": "Jo"}))
            .await
            .unwrap();
        assert_eq!(doc.id, "generated");
    }

    #[tokio::test]
    async fn test_create_document_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/main/collections/likes/documents"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "Document with the requested ID already exists.",
                "code": 409,
                "type": "document_already_exists"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .create_document("main", "likes", Some("abc"), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppwriteError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_document_wraps_data() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/databases/main/collections/users/documents/p1"))
            .and(body_json(json!({"data": {"businessDescription": "Coach"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "p1",
                "businessDescription": "Coach"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let doc = client(&server)
            .await
            .update_document("main", "users", "p1", &json!({"businessDescription": "Coach"}))
            .await
            .unwrap();
        assert_eq!(doc.get_str("businessDescription"), "Coach");
    }

    #[tokio::test]
    async fn test_delete_document_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/databases/main/collections/likes/documents/abc"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .await
            .delete_document("main", "likes", "abc")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_path_segments_are_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/databases/main/collections/users/documents/a%2Fb"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Document with the requested ID could not be found.",
                "code": 404,
                "type": "document_not_found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .get_document("main", "users", "a/b")
            .await
            .unwrap_err();
        assert!(matches!(err, AppwriteError::NotFound(_)));
    }
}
