use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::codec::{FirestoreDocument, RunQueryItem, decode_document, encode_record};
use crate::backends::traits::PageQuery;
use crate::constants::HTTP_TIMEOUT_SECS;
use crate::models::{Player, PlayerId, PlayerRecord};
use crate::utils::errors::{Result, RosterError};

/// Thin client over the Firestore v1 REST API for one collection.
#[derive(Debug, Clone)]
pub struct FirestoreApi {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    api_key: Option<String>,
}

impl FirestoreApi {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        collection: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            collection: collection.into(),
            api_key,
        })
    }

    fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn document_name(&self, id: &PlayerId) -> String {
        format!("{}/{}/{}", self.documents_root(), self.collection, id)
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/v1/{}", self.base_url, resource)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }

    async fn check(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("{} failed with status {}: {}", context, status, body);
        match status {
            StatusCode::NOT_FOUND => Err(RosterError::NotFound(context.to_string())),
            _ => Err(RosterError::Backend(format!(
                "{}: {} - {}",
                context, status, body
            ))),
        }
    }

    fn structured_query(&self, query: &PageQuery) -> Value {
        let mut structured = json!({
            "from": [{ "collectionId": self.collection }],
            "orderBy": [
                { "field": { "fieldPath": "name" }, "direction": "ASCENDING" },
                { "field": { "fieldPath": "__name__" }, "direction": "ASCENDING" }
            ],
            "limit": query.limit,
        });

        if let Some(cursor) = &query.after {
            structured["startAt"] = json!({
                "values": [
                    { "stringValue": cursor.name() },
                    { "referenceValue": self.document_name(cursor.id()) }
                ],
                "before": false
            });
        }

        json!({ "structuredQuery": structured })
    }

    /// Run an ordered, cursor-bounded page query.
    pub async fn run_query(&self, query: &PageQuery) -> Result<Vec<Player>> {
        let url = self.url(&format!("{}:runQuery", self.documents_root()));
        let request = self
            .client
            .post(&url)
            .json(&self.structured_query(query));

        let response = self.with_key(request).send().await?;
        let response = Self::check(response, "Query players").await?;
        let items: Vec<RunQueryItem> = response.json().await?;

        let players = items
            .iter()
            .filter_map(|item| item.document.as_ref())
            .map(decode_document)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Fetched {} players (after cursor: {})",
            players.len(),
            query.after.is_some()
        );
        Ok(players)
    }

    pub async fn get_document(&self, id: &PlayerId) -> Result<Option<Player>> {
        let url = self.url(&self.document_name(id));
        let response = self.with_key(self.client.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response, "Get player").await?;
        let document: FirestoreDocument = response.json().await?;
        decode_document(&document).map(Some)
    }

    pub async fn create_document(&self, record: &PlayerRecord) -> Result<PlayerId> {
        let url = self.url(&format!("{}/{}", self.documents_root(), self.collection));
        let body = json!({ "fields": encode_record(record)? });

        let response = self
            .with_key(self.client.post(&url).json(&body))
            .send()
            .await?;
        let response = Self::check(response, "Create player").await?;
        let document: FirestoreDocument = response.json().await?;

        let id = document.id();
        info!("Created player document {}", id);
        Ok(id)
    }

    /// Patch `fields` on an existing document; only the masked paths change.
    pub async fn patch_document(
        &self,
        id: &PlayerId,
        fields: Map<String, Value>,
        mask: &[String],
    ) -> Result<()> {
        let url = self.url(&self.document_name(id));
        let mut params: Vec<(&str, String)> = mask
            .iter()
            .map(|path| ("updateMask.fieldPaths", path.clone()))
            .collect();
        params.push(("currentDocument.exists", "true".to_string()));

        let request = self
            .client
            .patch(&url)
            .query(&params)
            .json(&json!({ "fields": fields }));

        let response = self.with_key(request).send().await?;
        Self::check(response, &format!("Update player {}", id)).await?;
        debug!("Patched player {} ({} fields)", id, mask.len());
        Ok(())
    }

    pub async fn update_document(&self, id: &PlayerId, record: &PlayerRecord) -> Result<()> {
        let fields = encode_record(record)?;
        let mask: Vec<String> = fields.keys().cloned().collect();
        self.patch_document(id, fields, &mask).await
    }
}
