//! Replays captured platform payloads from a directory.
//!
//! File layout, per post id:
//!
//! - `<id>.post.json` - detail object
//! - `<id>.replies.json` - array of reply objects
//! - `<id>.raw.json` - raw protocol body (served with status 200)
//! - `<id>.search.json` - results for the `id:<id>` query
//! - `search.json` - results for any other query
//!
//! A missing file means "nothing": `None`, an empty list, or a 404 raw
//! response.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use threadscope_core::PostId;

use crate::client::{PlatformClient, PostObject, RawProtocolResponse, decode_post_list};
use crate::error::TransportError;

/// Platform client that reads JSON fixtures from disk.
#[derive(Debug, Clone)]
pub struct FixtureClient {
    dir: PathBuf,
}

impl FixtureClient {
    /// Creates a client reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the fixture directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves the fixture path for an id. Ids must be plain file-name
    /// characters so they cannot escape the directory.
    fn path_for(&self, id: &str, suffix: &str) -> Result<PathBuf, TransportError> {
        let safe = id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !safe {
            return Err(TransportError::Unavailable(format!(
                "no fixture can exist for id {id:?}"
            )));
        }
        Ok(self.dir.join(format!("{id}.{suffix}.json")))
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, TransportError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), "Replaying fixture");
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No fixture");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PlatformClient for FixtureClient {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch_post_by_id(&self, id: &PostId) -> Result<Option<PostObject>, TransportError> {
        let path = self.path_for(id.as_str(), "post")?;
        self.read_json(&path).await
    }

    async fn search_posts(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError> {
        let path = match query.trim().strip_prefix("id:") {
            Some(id) => self.path_for(id.trim(), "search")?,
            None => self.dir.join("search.json"),
        };
        let mut posts = match self.read_json(&path).await? {
            Some(list) => decode_post_list(list)?,
            None => Vec::new(),
        };
        posts.truncate(limit);
        Ok(posts)
    }

    async fn fetch_replies_by_id(
        &self,
        id: &PostId,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError> {
        let path = self.path_for(id.as_str(), "replies")?;
        let mut replies = match self.read_json(&path).await? {
            Some(list) => decode_post_list(list)?,
            None => Vec::new(),
        };
        replies.truncate(limit);
        Ok(replies)
    }

    async fn fetch_raw_protocol_response(
        &self,
        id: &PostId,
    ) -> Result<RawProtocolResponse, TransportError> {
        let path = self.path_for(id.as_str(), "raw")?;
        Ok(match self.read_json::<Value>(&path).await? {
            Some(body) => RawProtocolResponse::ok(body),
            None => RawProtocolResponse {
                status: 404,
                body: Value::Null,
            },
        })
    }
}
