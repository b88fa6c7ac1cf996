use crate::XcError;

pub const DEFAULT_API_BASE_URL: &str = "https://de.dhv-xc.de/api/";
pub const DEFAULT_FLIGHT_BASE_URL: &str = "https://en.dhv-xc.de/flight/";

/// Endpoints of the DHV-XC service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// JSON API root, e.g. `https://de.dhv-xc.de/api`.
    pub api_base_url: String,
    /// Root of the per-flight pages; the IGC lives at `<root>/<id>/igc`.
    pub flight_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.trim_end_matches('/').to_string(),
            flight_base_url: DEFAULT_FLIGHT_BASE_URL.trim_end_matches('/').to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, XcError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, XcError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_base_url = read_url(&mut get, "DHV_XC_API_URL", DEFAULT_API_BASE_URL)?;
        let flight_base_url = read_url(&mut get, "DHV_XC_FLIGHT_URL", DEFAULT_FLIGHT_BASE_URL)?;
        Ok(Self {
            api_base_url,
            flight_base_url,
        })
    }
}

fn read_url<F>(get: &mut F, key: &str, default: &str) -> Result<String, XcError>
where
    F: FnMut(&str) -> Option<String>,
{
    let raw = get(key).unwrap_or_else(|| default.to_string());
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(XcError::Config(format!("{key} is empty")));
    }
    Ok(trimmed.to_string())
}
