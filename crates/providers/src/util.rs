//! Shared utility functions for provider adapters.

use vg_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Read an API key from the named environment variable.
///
/// Called once at startup; a missing key is a fatal configuration error,
/// never a per-request one.
pub(crate) fn resolve_api_key(env_var: &str) -> Result<String> {
    std::env::var(env_var).map_err(|_| {
        Error::Config(format!(
            "environment variable '{env_var}' not set or not valid UTF-8"
        ))
    })
}

/// Parse a `Retry-After` header value into milliseconds.
///
/// Only the delta-seconds form is honored; the HTTP-date form is rare in
/// LLM APIs and falls back to `None`.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn resolve_api_key_env_var() {
        let var_name = "VG_TEST_RESOLVE_ENV_KEY_1234";
        std::env::set_var(var_name, "env-secret-value");
        assert_eq!(resolve_api_key(var_name).unwrap(), "env-secret-value");
        std::env::remove_var(var_name);
    }

    #[test]
    fn resolve_api_key_env_var_missing() {
        let err = resolve_api_key("VG_TEST_NONEXISTENT_VAR_8888").unwrap_err();
        assert!(err.to_string().contains("VG_TEST_NONEXISTENT_VAR_8888"));
    }

    #[test]
    fn retry_after_seconds_to_millis() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));
        assert_eq!(parse_retry_after(&headers), Some(2000));
    }

    #[test]
    fn retry_after_date_form_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn retry_after_absent() {
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }
}
