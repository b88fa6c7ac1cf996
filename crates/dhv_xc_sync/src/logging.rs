//! tracing-subscriber setup.
//!
//! The filter comes from `DHV_XC_LOG_LEVEL`, falling back to `RUST_LOG` and
//! then `info`. Setting `XC_DEBUG` (to anything) forces `debug`.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn,cookie_store=warn";

/// Per-target overrides appended to every filter to keep HTTP internals quiet.
const QUIET_TARGETS: &str = "hyper=warn,hyper_util=warn,reqwest=warn,cookie_store=warn";

/// Build the filter directive string using the provided lookup.
pub fn log_filter_with<F>(mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let level = if get("XC_DEBUG").is_some() {
        "debug".to_string()
    } else {
        get("DHV_XC_LOG_LEVEL")
            .or_else(|| get("RUST_LOG"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "info".to_string())
    };
    format!("{level},{QUIET_TARGETS}")
}

/// Parse `filter`, falling back to [`DEFAULT_FILTER`] when it is invalid.
pub fn env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let filter = log_filter_with(|k| std::env::var(k).ok());
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter(&filter))
        .try_init();
    tracing::debug!("log filter: {}", filter);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info() {
        assert_eq!(log_filter_with(|_| None), DEFAULT_FILTER);
    }

    #[test]
    fn xc_debug_forces_debug() {
        let filter = log_filter_with(|k| match k {
            "XC_DEBUG" => Some(String::new()),
            "DHV_XC_LOG_LEVEL" => Some("warn".into()),
            _ => None,
        });
        assert!(filter.starts_with("debug,"));
    }

    #[test]
    fn own_variable_takes_priority_over_rust_log() {
        let filter = log_filter_with(|k| match k {
            "DHV_XC_LOG_LEVEL" => Some("trace".into()),
            "RUST_LOG" => Some("error".into()),
            _ => None,
        });
        assert!(filter.starts_with("trace,"));

        let filter = log_filter_with(|k| (k == "RUST_LOG").then(|| "error".to_string()));
        assert!(filter.starts_with("error,"));
    }

    #[test]
    fn invalid_filter_falls_back() {
        let f = env_filter("invalid[[[filter");
        assert!(!format!("{f:?}").is_empty());
    }

    #[test]
    fn init_does_not_panic_twice() {
        init();
        init();
    }
}
