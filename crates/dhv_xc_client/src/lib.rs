//! `XcClient` trait and the typed DHV-XC payloads it works with.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod utils;

#[derive(Debug, Error)]
pub enum XcError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("unable to get token: {0}")]
    Token(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("configuration error: {0}")]
    Config(String),
}

impl XcError {
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        XcError::Api {
            status,
            body: body.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        XcError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Username/password pair posted to the login endpoint as `{"uid", "pwd"}`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "uid")]
    pub user: String,
    #[serde(rename = "pwd", serialize_with = "serialize_secret")]
    pub pass: SecretString,
}

impl Credentials {
    pub fn new(user: impl Into<String>, pass: SecretString) -> Self {
        Self {
            user: user.into(),
            pass,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

fn serialize_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

/// One entry of the `fli/flights` listing.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Flight {
    #[serde(
        rename = "IDFlight",
        alias = "idflight",
        alias = "idFlight",
        default,
        deserialize_with = "deserialize_opt_string"
    )]
    pub id: Option<String>,
    #[serde(rename = "FlightDate", alias = "flightdate", alias = "flightDate", default)]
    pub date: String,
    #[serde(
        rename = "TakeoffLocation",
        alias = "takeofflocation",
        alias = "takeoffLocation",
        default
    )]
    pub takeoff: Option<String>,
}

impl Flight {
    /// The flight ID as an integer, if it is one.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.as_deref().and_then(|id| id.trim().parse().ok())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FlightList {
    #[serde(default)]
    pub data: Vec<Flight>,
    pub success: Option<bool>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub success: Option<serde_json::Value>,
    pub message: Option<String>,
    pub meta: Option<StatusMeta>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StatusMeta {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub token: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ApiResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string().into()),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[async_trait]
pub trait XcClient: Send + Sync + 'static {
    /// Fetch the CSRF token from the login status endpoint and keep it for
    /// the rest of the session.
    async fn fetch_token(&self) -> Result<String, XcError>;

    /// Log in with the given credentials. Requires a token.
    async fn login(&self, credentials: &Credentials) -> Result<(), XcError>;

    /// List the logged-in user's flights.
    async fn list_flights(&self) -> Result<Vec<Flight>, XcError>;

    /// Download the IGC track of `flight_id` to `output_path`, creating the
    /// parent directory. Returns the number of bytes written.
    async fn download_igc(&self, flight_id: &str, output_path: &Path) -> Result<u64, XcError>;
}
