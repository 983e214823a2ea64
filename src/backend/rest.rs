//! Remote document store backend.
//!
//! Speaks a small keyed-document REST protocol:
//! - `GET    {base}/collections/{coll}/items` lists every document
//! - `GET    {base}/collections/{coll}/items/{name}` fetches one document
//! - `PUT    {base}/collections/{coll}/items/{name}` overwrites one document
//! - `DELETE {base}/collections/{coll}/items/{name}` removes one document
//!
//! Conditional writes pass `?expected=<quantity>` (or `?expected=none` for
//! create-if-absent); the store answers 409 when the precondition no longer
//! holds. Document bodies carry the single field `{"quantity": <n>}`.

use crate::backend::InventoryBackend;
use crate::error::{InventoryError, Result};
use crate::models::InventoryItem;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = "inventory_tracker/1.0";

/// Wire form of a single stored document.
#[derive(Debug, Serialize, Deserialize)]
struct ItemDocument {
    quantity: u32,
}

/// Client for a remote keyed-document collection.
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            collection: collection.into(),
        }
    }

    fn items_url(&self) -> String {
        format!(
            "{}/collections/{}/items",
            self.base_url,
            urlencoding::encode(&self.collection)
        )
    }

    /// Item names may contain spaces or any other character, so they are
    /// percent-encoded into the document path.
    fn item_url(&self, name: &str) -> String {
        format!("{}/{}", self.items_url(), urlencoding::encode(name))
    }

    async fn put_item(
        &self,
        name: &str,
        quantity: u32,
        expected: Option<&str>,
    ) -> Result<StatusCode> {
        let mut request = self
            .client
            .put(self.item_url(name))
            .header("User-Agent", USER_AGENT)
            .json(&ItemDocument { quantity });
        if let Some(expected) = expected {
            request = request.query(&[("expected", expected)]);
        }
        Ok(request.send().await?.status())
    }
}

/// Outcome of a conditional write: 2xx means it applied, 409 means the
/// precondition no longer held. 404 counts as a failed precondition too
/// (the document vanished between read and write).
fn conditional_outcome(status: StatusCode) -> Result<bool> {
    if status.is_success() {
        Ok(true)
    } else if status == StatusCode::CONFLICT || status == StatusCode::NOT_FOUND {
        Ok(false)
    } else {
        Err(InventoryError::HttpStatus(status))
    }
}

#[async_trait]
impl InventoryBackend for RestBackend {
    async fn get(&self, name: &str) -> Result<Option<u32>> {
        let response = self
            .client
            .get(self.item_url(name))
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(InventoryError::HttpStatus(status));
        }

        let body = response.text().await?;
        log::debug!("Document body for '{}': {}", name, body);
        let doc: ItemDocument = serde_json::from_str(&body)?;
        Ok(Some(doc.quantity))
    }

    async fn set(&self, name: &str, quantity: u32) -> Result<()> {
        let status = self.put_item(name, quantity, None).await?;
        if !status.is_success() {
            return Err(InventoryError::HttpStatus(status));
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let status = self
            .client
            .delete(self.item_url(name))
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .status();

        // Delete-by-key is idempotent: an already-absent document is fine.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(InventoryError::HttpStatus(status))
        }
    }

    async fn list(&self) -> Result<Vec<InventoryItem>> {
        let response = self
            .client
            .get(self.items_url())
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InventoryError::HttpStatus(status));
        }

        let body = response.text().await?;
        log::debug!("Collection listing body: {}", body);
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_if_absent(&self, name: &str, quantity: u32) -> Result<bool> {
        conditional_outcome(self.put_item(name, quantity, Some("none")).await?)
    }

    async fn set_if_equals(&self, name: &str, expected: u32, quantity: u32) -> Result<bool> {
        conditional_outcome(
            self.put_item(name, quantity, Some(&expected.to_string()))
                .await?,
        )
    }

    async fn delete_if_equals(&self, name: &str, expected: u32) -> Result<bool> {
        let status = self
            .client
            .delete(self.item_url(name))
            .header("User-Agent", USER_AGENT)
            .query(&[("expected", expected.to_string())])
            .send()
            .await?
            .status();
        conditional_outcome(status)
    }
}
