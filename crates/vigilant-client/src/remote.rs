//! Remote store collaborator.
//!
//! The remote side is a plain JSON-over-HTTP document store:
//!
//! | Call                      | Request                          |
//! |---------------------------|----------------------------------|
//! | list items of an owner    | `GET  {base}/items?owner=<id>`   |
//! | insert / replace an item  | `PUT  {base}/items/<id>`         |
//! | delete an item            | `DELETE {base}/items/<id>`       |
//! | list the user directory   | `GET  {base}/users`              |
//! | merge a directory entry   | `PUT  {base}/users/<user id>`    |
//! | reachability probe        | `GET  {base}/items?limit=1`      |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use vigilant_shared::{DirectoryEntry, Item, ItemId, UserId};

use crate::error::RemoteError;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Items of `owner`, most recently added first.
    async fn list_items(&self, owner: &UserId) -> Result<Vec<Item>, RemoteError>;

    async fn put_item(&self, item: &Item) -> Result<(), RemoteError>;

    async fn delete_item(&self, id: &ItemId) -> Result<(), RemoteError>;

    async fn list_users(&self) -> Result<Vec<DirectoryEntry>, RemoteError>;

    /// Merge semantics: fields present in `entry` overwrite the stored ones.
    async fn upsert_user(&self, entry: &DirectoryEntry) -> Result<(), RemoteError>;

    /// Cheap reachability check.
    async fn probe(&self) -> Result<(), RemoteError>;
}

/// [`RemoteStore`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_items(&self, owner: &UserId) -> Result<Vec<Item>, RemoteError> {
        let req = self
            .client
            .get(self.url("items"))
            .query(&[("owner", owner.as_str())]);
        let mut items: Vec<Item> = self.send(req).await?.json().await?;

        // The server is asked to filter and sort, but the mirror relies on it.
        items.retain(|item| &item.owner == owner);
        items.sort_by(|a, b| b.added_at.cmp(&a.added_at));

        debug!(owner = %owner, count = items.len(), "fetched remote items");
        Ok(items)
    }

    async fn put_item(&self, item: &Item) -> Result<(), RemoteError> {
        let req = self
            .client
            .put(self.url(&format!("items/{}", item.id)))
            .json(item);
        self.send(req).await?;
        Ok(())
    }

    async fn delete_item(&self, id: &ItemId) -> Result<(), RemoteError> {
        let req = self.client.delete(self.url(&format!("items/{id}")));
        self.send(req).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<DirectoryEntry>, RemoteError> {
        let req = self.client.get(self.url("users"));
        Ok(self.send(req).await?.json().await?)
    }

    async fn upsert_user(&self, entry: &DirectoryEntry) -> Result<(), RemoteError> {
        let req = self
            .client
            .put(self.url(&format!("users/{}", entry.user_id)))
            .json(entry);
        self.send(req).await?;
        Ok(())
    }

    async fn probe(&self) -> Result<(), RemoteError> {
        let req = self.client.get(self.url("items")).query(&[("limit", "1")]);
        self.send(req).await?;
        Ok(())
    }
}
