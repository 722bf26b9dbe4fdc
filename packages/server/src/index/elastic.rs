//! Elasticsearch-style HTTP [`DocumentIndex`] implementation.
//!
//! Talks the minimal subset of the Elasticsearch REST API the catalog
//! needs: `GET /` as a liveness handshake, `HEAD /{index}` for existence,
//! `PUT /{index}` with the mapping body for creation, and
//! `PUT`/`DELETE /{index}/_doc/{id}` for document lifecycle. Index names
//! are the entity kind prefixed with a configurable namespace.

use async_trait::async_trait;
use metacat_core::EntityHash;
use reqwest::StatusCode;
use tracing::debug;

use super::DocumentIndex;
use crate::config::IndexConfig;
use crate::connect::{AttemptResult, Connector};
use crate::error::IndexError;

/// HTTP client for an Elasticsearch-style index service.
#[derive(Debug, Clone)]
pub struct ElasticIndex {
    client: reqwest::Client,
    base_url: String,
    prefix: String,
}

impl ElasticIndex {
    /// Creates a client for the configured service.
    #[must_use]
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            prefix: config.index_prefix.clone(),
        }
    }

    /// Full index name for an entity kind.
    #[must_use]
    pub fn index_name(&self, kind: &str) -> String {
        format!("{}{kind}", self.prefix)
    }

    fn index_url(&self, kind: &str) -> String {
        format!("{}/{}", self.base_url, self.index_name(kind))
    }

    fn document_url(&self, kind: &str, id: i64) -> String {
        format!("{}/_doc/{id}", self.index_url(kind))
    }

    fn check_status(&self, kind: &str, status: StatusCode) -> Result<(), IndexError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(IndexError::Status {
                index: self.index_name(kind),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl DocumentIndex for ElasticIndex {
    async fn ping(&self) -> Result<(), IndexError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(IndexError::request)?;
        self.check_status("", response.status())
    }

    async fn index_exists(&self, kind: &str) -> Result<bool, IndexError> {
        let response = self
            .client
            .head(self.index_url(kind))
            .send()
            .await
            .map_err(IndexError::request)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status => self.check_status(kind, status).map(|()| true),
        }
    }

    async fn create_index(
        &self,
        kind: &str,
        mapping: &serde_json::Value,
    ) -> Result<(), IndexError> {
        debug!(index = %self.index_name(kind), "creating index");
        let response = self
            .client
            .put(self.index_url(kind))
            .json(mapping)
            .send()
            .await
            .map_err(IndexError::request)?;
        self.check_status(kind, response.status())
    }

    async fn put_document(
        &self,
        kind: &str,
        id: i64,
        document: &EntityHash,
    ) -> Result<(), IndexError> {
        let response = self
            .client
            .put(self.document_url(kind, id))
            .json(document)
            .send()
            .await
            .map_err(IndexError::request)?;
        self.check_status(kind, response.status())
    }

    async fn delete_document(&self, kind: &str, id: i64) -> Result<(), IndexError> {
        let response = self
            .client
            .delete(self.document_url(kind, id))
            .send()
            .await
            .map_err(IndexError::request)?;
        match response.status() {
            // Already gone: delete is idempotent by contract.
            StatusCode::NOT_FOUND => Ok(()),
            status => self.check_status(kind, status),
        }
    }
}

/// Startup connector for the index service: a successful ping yields the
/// client as the live handle.
pub struct ElasticConnector {
    index: ElasticIndex,
}

impl ElasticConnector {
    /// Creates a connector for the configured service.
    #[must_use]
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            index: ElasticIndex::new(config),
        }
    }
}

#[async_trait]
impl Connector for ElasticConnector {
    type Handle = ElasticIndex;

    fn resource(&self) -> &str {
        "document index"
    }

    async fn connect(&self) -> AttemptResult<ElasticIndex> {
        self.index.ping().await?;
        Ok(self.index.clone())
    }
}
