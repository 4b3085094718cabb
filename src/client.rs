use anyhow::{Context, Result};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::format_api_error;
use crate::export::{CreatedExport, ExportList, ExportParams};
use crate::util::{asset_source_url, exports_url, source_filter};

#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    /// Creates a client from `KOBO_*` environment variables and built-in defaults.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env())
    }

    pub fn new(config: Config) -> Result<Self> {
        Self::with_config_and_timeout(config, Duration::from_secs(60))
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        Self::with_config_and_timeout(self.config, timeout)
    }

    fn with_config_and_timeout(config: Config, timeout: Duration) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kobo-export/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("kobo-export")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            config,
            timeout,
            http,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Asks the server to generate a new export of the configured asset.
    ///
    /// The export is produced asynchronously; use [`Client::latest_export_url`]
    /// later to fetch its download link.
    pub fn create_export(&self, params: &ExportParams) -> Result<CreatedExport> {
        let url = exports_url(&self.config.base_url);
        let form = params.to_form(asset_source_url(
            &self.config.base_url,
            &self.config.asset_id,
        ));
        debug!(url = %url, source = %form.source, export_type = %params.export_type, "creating export");

        let resp = self.send(self.http.post(&url).form(&form), &url)?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .with_context(|| format!("failed to read response body (url={})", url))?;

        info!(status, "export created");
        Ok(CreatedExport { status, body })
    }

    /// Returns the first page of exports of the configured asset, as sent by the server.
    pub fn list_exports(&self) -> Result<Value> {
        let listing: Value = self.get_exports()?;
        if listing.get("next").is_some_and(|n| !n.is_null()) {
            warn!("server returned more than one page of exports; only the first page is shown");
        }
        Ok(listing)
    }

    /// Returns the download URL of the last export in the server's listing.
    pub fn latest_export_url(&self) -> Result<String> {
        let listing: ExportList = self.get_exports()?;
        debug!(count = listing.results.len(), "exports listed");
        listing.latest_url(&self.config.asset_id)
    }

    fn get_exports<T: DeserializeOwned>(&self) -> Result<T> {
        let url = exports_url(&self.config.base_url);
        let filter = source_filter(&self.config.asset_id);
        debug!(url = %url, q = %filter, "listing exports");

        let resp = self.send(self.http.get(&url).query(&[("q", filter.as_str())]), &url)?;
        let status = resp.status();
        let text = resp
            .text()
            .with_context(|| format!("failed to read response body (url={})", url))?;

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("failed to parse API JSON (url={}, status={})", url, status))
    }

    fn apply_auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(&self.config.user, Some(&self.config.password))
    }

    /// Sends an authenticated request and turns any non-success status into an error.
    fn send(&self, req: RequestBuilder, url: &str) -> Result<Response> {
        let resp = self
            .apply_auth(req)
            .send()
            .with_context(|| format!("could not connect to {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(format_api_error(status, url, &text));
        }
        Ok(resp)
    }
}
