use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use crate::database::{DocumentStore, StoreError};
use crate::models::{Document, Fields};
use crate::services::credentials::TokenProvider;
use crate::services::firestore_value::{
    decode_fields, encode_fields, field_path, FirestoreDocument, ListDocumentsResponse,
};

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
const LIST_PAGE_SIZE: &str = "300";
/// The emulator accepts this bearer token as an admin credential.
const EMULATOR_TOKEN: &str = "owner";

/// Cloud Firestore REST v1 client.
#[derive(Debug)]
pub struct FirestoreClient {
    client: Client,
    documents_url: Url,
    auth: Option<TokenProvider>,
}

impl FirestoreClient {
    pub fn new(
        project_id: &str,
        database_id: &str,
        auth: TokenProvider,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        Self::build(FIRESTORE_BASE_URL, project_id, database_id, Some(auth), timeout_secs)
    }

    /// Client for a local Firestore emulator (`host:port`). No credentials are used.
    pub fn emulator(
        emulator_host: &str,
        project_id: &str,
        database_id: &str,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let base_url = format!("http://{}", emulator_host.trim_end_matches('/'));
        Self::build(&base_url, project_id, database_id, None, timeout_secs)
    }

    fn build(
        base_url: &str,
        project_id: &str,
        database_id: &str,
        auth: Option<TokenProvider>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let documents_url = Url::parse(&format!(
            "{}/v1/projects/{}/databases/{}/documents",
            base_url, project_id, database_id
        ))
        .context("Invalid Firestore URL")?;

        Ok(Self {
            client,
            documents_url,
            auth,
        })
    }

    /// `{documents}/{collection}[/{id}]`, with each segment percent-encoded.
    fn url(&self, collection: &str, id: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.documents_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Decode("Firestore URL cannot be a base".to_string()))?;
            segments.push(collection);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        let token = match &self.auth {
            Some(provider) => provider.access_token(&self.client).await?,
            None => EMULATOR_TOKEN.to_string(),
        };
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        Ok(self.authorize(request).await?.send().await?)
    }

    fn into_document(doc: FirestoreDocument) -> Result<Document, StoreError> {
        Ok(Document {
            id: doc.id()?,
            fields: decode_fields(&doc.fields)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

/// Whether an error body says the addressed document does not exist.
///
/// A NOT_FOUND for a missing project or database names no document path and
/// stays a store failure. A failed `currentDocument.exists` precondition may
/// also come back as FAILED_PRECONDITION.
fn reports_missing_document(body: &str) -> bool {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status.as_str() {
            "NOT_FOUND" => envelope.error.message.contains("/documents/"),
            "FAILED_PRECONDITION" => true,
            _ => false,
        },
        Err(_) => false,
    }
}

/// Turn a non-success response into a `StoreError`.
///
/// When `id` is given, an error body reporting that document as missing maps
/// to `NotFound`.
async fn check_status(response: Response, id: Option<&str>) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if let Some(id) = id {
        if (status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST)
            && reports_missing_document(&body)
        {
            return Err(StoreError::NotFound(id.to_string()));
        }
    }

    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let url = self.url(collection, None)?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .query(&[("pageSize", LIST_PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = check_status(self.send(request).await?, None).await?;
            let page: ListDocumentsResponse = response.json().await?;

            for doc in page.documents {
                documents.push(Self::into_document(doc)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Listed {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let request = self.client.get(self.url(collection, Some(id))?);
        let response = match check_status(self.send(request).await?, Some(id)).await {
            Ok(response) => response,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let doc: FirestoreDocument = response.json().await?;
        Ok(Some(Self::into_document(doc)?))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let request = self
            .client
            .post(self.url(collection, None)?)
            .json(&json!({ "fields": encode_fields(&fields) }));

        let doc: FirestoreDocument = check_status(self.send(request).await?, None)
            .await?
            .json()
            .await?;
        doc.id()
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        // Without a mask Firestore would replace the document, so an empty
        // merge is simply not sent.
        if fields.is_empty() {
            return Ok(());
        }

        let mut query: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", field_path(key)))
            .collect();
        query.push(("currentDocument.exists", "true".to_string()));

        let request = self
            .client
            .patch(self.url(collection, Some(id))?)
            .query(&query)
            .json(&json!({ "fields": encode_fields(&fields) }));

        check_status(self.send(request).await?, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.url(collection, Some(id))?)
            .query(&[("currentDocument.exists", "true")]);

        check_status(self.send(request).await?, Some(id)).await?;
        Ok(())
    }
}
