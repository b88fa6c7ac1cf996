//! HTTP client implementation for the DHV-XC API.
//!
//! This module provides a reqwest-based implementation of the [`XcClient`](crate::XcClient) trait.
//! The session keeps cookies between requests and attaches the CSRF token once
//! [`fetch_token`](crate::XcClient::fetch_token) has succeeded.

use crate::config::Config;
use crate::{
    ApiResponse, Credentials, Flight, FlightList, StatusResponse, XcClient, XcError,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

const TOKEN_PATH: &str = "xc/login/status";
const LOGIN_PATH: &str = "xc/login/login";
const FLIGHTS_PATH: &str = "fli/flights";
const CSRF_HEADER: &str = "X-CSRF-Token";
const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Client for the DHV-XC API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestXcClient {
    api_base_url: String,
    flight_base_url: String,
    token: Arc<RwLock<Option<SecretString>>>,
    client: reqwest::Client,
}

impl ReqwestXcClient {
    /// Create a new client with its own cookie-backed session.
    ///
    /// # Arguments
    /// * `api_base_url` - JSON API root (e.g., "https://de.dhv-xc.de/api")
    /// * `flight_base_url` - root of the per-flight IGC downloads (e.g., "https://en.dhv-xc.de/flight")
    pub fn new(api_base_url: &str, flight_base_url: &str) -> Result<Self, XcError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            flight_base_url: flight_base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, XcError> {
        Self::new(&config.api_base_url, &config.flight_base_url)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path)
    }

    fn igc_url(&self, flight_id: &str) -> String {
        format!("{}/{}/igc", self.flight_base_url, flight_id)
    }

    /// Attach the JSON content type and, once known, the CSRF token.
    async fn prepare(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        match self.token.read().await.as_ref() {
            Some(token) => {
                tracing::debug!("setting token header");
                request.header(CSRF_HEADER, token.expose_secret())
            }
            None => request,
        }
    }

    async fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        tracing::debug!(%url, "GET");
        self.prepare(self.client.get(url)).await
    }

    async fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        tracing::debug!(%url, "POST");
        self.prepare(self.client.post(url)).await
    }

    /// Execute a request and decode a JSON response.
    ///
    /// The body is read as text first so a decode failure can report what the
    /// server actually sent.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, XcError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        for cookie in resp.cookies() {
            tracing::debug!(name = cookie.name(), "got cookie");
        }
        let text = resp.text().await?;
        tracing::debug!("Response: [{}]", text);
        serde_json::from_str::<T>(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(512).collect();
            XcError::Decode(format!("{e} - body: {body_snippet}"))
        })
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> XcError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => XcError::NotFound(body_snippet),
            401 | 403 => XcError::Auth(body_snippet),
            _ => XcError::from_status(status, body_snippet),
        }
    }

    /// Stream a response body into `path`, creating its parent directory.
    async fn download_file(&self, url: String, path: &Path) -> Result<u64, XcError> {
        let resp = self.get_request(&url).await.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| XcError::io(parent, e))?;
        }

        let mut stream = resp.bytes_stream();
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| XcError::io(path, e))?;
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            file.write_all(&bytes)
                .await
                .map_err(|e| XcError::io(path, e))?;
            written += bytes.len() as u64;
        }
        file.sync_all().await.map_err(|e| XcError::io(path, e))?;
        Ok(written)
    }
}

#[async_trait]
impl XcClient for ReqwestXcClient {
    async fn fetch_token(&self) -> Result<String, XcError> {
        let url = self.api_url(TOKEN_PATH);
        let resp: StatusResponse = self.execute_json(self.get_request(&url).await).await?;
        if resp.success.is_none() {
            return Err(XcError::Token(resp.message.unwrap_or_default()));
        }
        let token = resp
            .meta
            .and_then(|m| m.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| XcError::Token("response carries no token".into()))?;
        *self.token.write().await = Some(SecretString::new(token.clone().into()));
        Ok(token)
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), XcError> {
        if self.token.read().await.is_none() {
            return Err(XcError::Token("login requires a token".into()));
        }
        let url = self.api_url(LOGIN_PATH);
        tracing::debug!(user = %credentials.user, "Request: login");
        let resp: ApiResponse = self
            .execute_json(self.post_request(&url).await.json(credentials))
            .await?;
        if resp.success != Some(true) {
            return Err(XcError::Auth(resp.message.unwrap_or_default()));
        }
        Ok(())
    }

    async fn list_flights(&self) -> Result<Vec<Flight>, XcError> {
        let url = self.api_url(FLIGHTS_PATH);
        let list: FlightList = self
            .execute_json(self.get_request(&url).await.query(&[("mine", "1")]))
            .await?;
        if list.success == Some(false) {
            return Err(XcError::from_status(
                200,
                list.message.unwrap_or_else(|| "flight listing failed".into()),
            ));
        }
        Ok(list.data)
    }

    async fn download_igc(&self, flight_id: &str, output_path: &Path) -> Result<u64, XcError> {
        let id = flight_id.trim();
        if id.is_empty() {
            return Err(XcError::InvalidInput("flight id is empty".into()));
        }
        self.download_file(self.igc_url(id), output_path).await
    }
}
