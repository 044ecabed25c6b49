//! HTTP client and the single-resource fetcher

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use reqwest::header::LOCATION;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Shared HTTP client.
///
/// Holds two clients over one cookie store configuration: one that follows
/// redirects and one that never does, so a single redirect hop can be read
/// from the `Location` header.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    no_redirect: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("packdl/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;

        let no_redirect = reqwest::Client::builder()
            .user_agent(concat!("packdl/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, no_redirect })
    }

    /// Get the redirect-following reqwest client
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Resolve at most one redirect hop.
    ///
    /// Returns the `Location` target when the server answers with one,
    /// otherwise the URL unchanged. Chained redirects are not chased here.
    pub async fn resolve_redirect(&self, url: &str) -> Result<String> {
        let response = self
            .no_redirect
            .get(url)
            .send()
            .await
            .with_context(|| format!("Connection failed: {}", truncate_url(url)))?;

        let Some(location) = response.headers().get(LOCATION) else {
            return Ok(url.to_string());
        };

        let location = location
            .to_str()
            .with_context(|| format!("Invalid redirect target from {}", truncate_url(url)))?;

        // Relative targets resolve against the requested URL
        let target = response
            .url()
            .join(location)
            .with_context(|| format!("Invalid redirect target: {}", location))?;

        debug!("Redirect {} -> {}", url, target);
        Ok(target.to_string())
    }

    /// Follow the whole redirect chain and return the URL it ends on.
    pub async fn final_url(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Connection failed: {}", truncate_url(url)))?;

        Ok(response.url().to_string())
    }
}

/// Result of a single fetch
#[derive(Debug, Clone)]
pub struct FetchedFile {
    /// Local path the resource lives at
    pub path: PathBuf,
    /// Bytes written, or the size of the reused file
    pub size: u64,
    /// True when an existing file of the right size was kept untouched
    pub reused: bool,
}

impl FetchedFile {
    /// File name part of the local path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Local file name for a URL: its last path segment
pub fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    if name.is_empty() {
        bail!("URL has no file name: {}", url);
    }
    Ok(name.to_string())
}

/// Fetch one resource into `dest_dir` (or the working directory).
///
/// A local file whose size equals the response's `Content-Length` is kept
/// as is; anything else is overwritten. Without a `Content-Length` the file
/// is always downloaded again.
pub async fn fetch(client: &HttpClient, url: &str, dest_dir: Option<&Path>) -> Result<FetchedFile> {
    let url = client.resolve_redirect(url).await?;

    let file_name = file_name_from_url(&url)?;
    let output_path = match dest_dir {
        Some(dir) => dir.join(&file_name),
        None => PathBuf::from(&file_name),
    };

    let response = client
        .inner()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Connection failed: {}", truncate_url(&url)))?;

    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {} - {}", status.as_u16(), truncate_url(&url));
    }

    let remote_size = response.content_length();
    if let Ok(meta) = tokio::fs::metadata(&output_path).await {
        if remote_size == Some(meta.len()) {
            debug!("Already downloaded: {}", output_path.display());
            return Ok(FetchedFile {
                path: output_path,
                size: meta.len(),
                reused: true,
            });
        }
    }

    let mut file = File::create(&output_path)
        .await
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Failed to read chunk")?;
        file.write_all(&chunk)
            .await
            .context("Failed to write chunk")?;
        written += chunk.len() as u64;
    }
    file.flush().await.context("Failed to flush file")?;

    debug!("Downloaded {} ({} bytes)", output_path.display(), written);

    Ok(FetchedFile {
        path: output_path,
        size: written,
        reused: false,
    })
}

/// Truncate URL for error messages
fn truncate_url(url: &str) -> String {
    if url.chars().count() > 80 {
        let cut: String = url.chars().take(77).collect();
        format!("{}...", cut)
    } else {
        url.to_string()
    }
}
