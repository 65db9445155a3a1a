use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use async_trait::async_trait;

use crate::foundation::error::{ReelError, ReelResult};

/// Where encoded frame bytes come from.
///
/// `path` is a rendered [`crate::PathTemplate`]. Implementations must be cheap to share
/// across concurrent fetches.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Fetch the encoded bytes for one frame.
    async fn fetch(&self, path: &str) -> ReelResult<Vec<u8>>;

    /// Human readable origin for logs.
    fn describe(&self) -> String;
}

/// Frames read from a directory on disk. Leading `/` in frame paths is the directory root.
#[derive(Clone, Debug)]
pub struct FsFrameSource {
    root: PathBuf,
}

impl FsFrameSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &str) -> ReelResult<PathBuf> {
        Ok(self.root.join(normalize_rel_path(path)?))
    }
}

#[async_trait]
impl FrameSource for FsFrameSource {
    async fn fetch(&self, path: &str) -> ReelResult<Vec<u8>> {
        let abs = self.resolve(path)?;
        tokio::fs::read(&abs)
            .await
            .with_context(|| format!("read frame bytes from '{}'", abs.display()))
            .map_err(ReelError::from)
    }

    fn describe(&self) -> String {
        format!("fs:{}", self.root.display())
    }
}

/// Frames fetched over HTTP(S) relative to a base URL.
#[derive(Clone, Debug)]
pub struct HttpFrameSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFrameSource {
    /// `timeout` bounds each request, so a stalled server still resolves the frame (as failed).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ReelResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> ReelResult<String> {
        Ok(format!("{}/{}", self.base_url, normalize_rel_path(path)?))
    }
}

#[async_trait]
impl FrameSource for HttpFrameSource {
    async fn fetch(&self, path: &str) -> ReelResult<Vec<u8>> {
        let url = self.url_for(path)?;
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReelError::asset(format!("GET {url}: HTTP {status}")));
        }
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("read body of {url}"))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        format!("http:{}", self.base_url)
    }
}

/// Normalize a frame path into a `/`-separated path relative to the source root.
///
/// A leading `/` is the site root; `..` segments are rejected.
pub fn normalize_rel_path(source: &str) -> ReelResult<String> {
    let s = source.replace('\\', "/");
    if s.trim().is_empty() {
        return Err(ReelError::asset("frame path must be non-empty"));
    }
    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ReelError::asset("frame paths must not contain '..'"));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(ReelError::asset("frame path must contain a file name"));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
