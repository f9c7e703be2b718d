use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str = "co2-emissions-etl";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client for the emissions page
pub struct PageClient {
    client: Client,
}

impl PageClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch the document at `url` as text. A single attempt; any failure is returned.
    pub fn fetch_html(&self, url: &str) -> Result<String> {
        info!(url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Server rejected request for {}", url))?;

        let text = response.text().context("Failed to read response")?;
        info!("received {}", format_bytes(text.len() as u64));

        Ok(text)
    }

    /// Fetch the document and save it to `dest`
    pub fn download_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let html = self.fetch_html(url)?;
        std::fs::write(dest, &html)
            .with_context(|| format!("Failed to write {:?}", dest))?;
        Ok(html.len() as u64)
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}
