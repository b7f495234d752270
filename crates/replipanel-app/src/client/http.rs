//! reqwest-backed fragment client

use async_trait::async_trait;
use url::Url;

use replipanel_core::prelude::*;

use super::FragmentClient;

/// [`FragmentClient`] speaking HTTP to the hosting server.
#[derive(Debug, Clone)]
pub struct HttpFragmentClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpFragmentClient {
    /// `server_base` is the authority panel-relative URLs resolve against,
    /// e.g. `https://author.example.com`.
    pub fn new(server_base: &str) -> Result<Self> {
        let base = Url::parse(server_base)
            .map_err(|e| Error::config(format!("Invalid server base {server_base}: {e}")))?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, base })
    }

    fn absolute(&self, url: &str) -> Result<Url> {
        self.base
            .join(url)
            .map_err(|e| Error::fetch(url, format!("invalid URL: {e}")))
    }
}

#[async_trait]
impl FragmentClient for HttpFragmentClient {
    async fn get_fragment(&self, url: &str) -> Result<String> {
        let target = self.absolute(url)?;
        debug!("GET {target}");
        let response = self
            .http
            .get(target)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::fetch(url, e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))
    }

    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<String> {
        let target = self.absolute(url)?;
        debug!("POST {target}");
        let response = self
            .http
            .post(target)
            .form(fields)
            .send()
            .await
            .map_err(|e| Error::submit(url, e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::submit(url, e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| Error::submit(url, e.to_string()))
    }
}
