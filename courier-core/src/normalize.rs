use crate::response::{ApiResponse, AppError, Outcome};
use crate::session::{SessionExpired, SessionHook};
use crate::store::TokenStore;
use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Header whose presence on a failed response means the token is no longer
/// accepted. `HeaderMap` lowercases names, so lookups are case-insensitive.
pub const AUTH_CHALLENGE_HEADER: &str = "www-authenticate";

/// Turns raw responses and transport failures into `Outcome`s.
#[derive(Clone)]
pub struct ResponseNormalizer {
    store: Arc<dyn TokenStore>,
    hook: Arc<dyn SessionHook>,
}

impl ResponseNormalizer {
    pub fn new(store: Arc<dyn TokenStore>, hook: Arc<dyn SessionHook>) -> Self {
        Self { store, hook }
    }

    /// Normalize a response that reached us, successful or not.
    pub async fn normalize<T: DeserializeOwned>(&self, response: Response) -> Outcome<T> {
        let status = response.status();
        let url = response.url().clone();
        let headers = response.headers().clone();

        if !status.is_success() {
            if let Some(challenge) = challenge(&headers) {
                return Err(self.reset_session(challenge, &url));
            }
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%url, error = %e, "failed to read response body");
                return Ok(ApiResponse::failure(
                    transport_error(&url, &e.to_string()),
                    Some(headers),
                ));
            }
        };
        let body = parse_body(&bytes);

        if !status.is_success() {
            debug!(%url, %status, "request failed");
            return Ok(ApiResponse::failure(
                AppError::from_status(status, body),
                Some(headers),
            ));
        }

        match serde_json::from_value::<T>(body) {
            Ok(payload) => Ok(ApiResponse::success(payload, Some(headers))),
            Err(e) => {
                warn!(%url, error = %e, "response body did not match the expected shape");
                Ok(ApiResponse::failure(
                    AppError::Generic(json!({
                        "message": format!("invalid response body: {e}"),
                        "url": url.as_str(),
                    })),
                    Some(headers),
                ))
            }
        }
    }

    /// Normalize a failure where no response was received.
    pub fn transport_failure<T>(&self, url: &Url, err: &reqwest::Error) -> ApiResponse<T> {
        warn!(%url, error = %err, "request did not complete");
        ApiResponse::failure(transport_error(url, &err.to_string()), None)
    }

    fn reset_session(&self, challenge: String, url: &Url) -> SessionExpired {
        if let Err(e) = self.store.clear_token() {
            warn!(error = %e, "failed to clear token after auth challenge");
        }
        let signal = SessionExpired {
            challenge,
            url: url.to_string(),
        };
        self.hook.session_expired(&signal);
        signal
    }
}

impl std::fmt::Debug for ResponseNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseNormalizer").finish_non_exhaustive()
    }
}

fn challenge(headers: &HeaderMap) -> Option<String> {
    headers
        .get(WWW_AUTHENTICATE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// JSON when it parses, the raw text otherwise, `null` for an empty body.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn transport_error(url: &Url, message: &str) -> AppError {
    AppError::Generic(json!({
        "message": message,
        "url": url.as_str(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn parse_body_variants() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(br#"{"msg":"x"}"#), json!({"msg": "x"}));
        assert_eq!(parse_body(b"plain failure"), json!("plain failure"));
    }

    #[test]
    fn challenge_header_lookup() {
        let mut headers = HeaderMap::new();
        assert!(challenge(&headers).is_none());
        headers.insert(
            reqwest::header::HeaderName::from_static(AUTH_CHALLENGE_HEADER),
            HeaderValue::from_static("Bearer error=\"invalid_token\""),
        );
        assert_eq!(
            challenge(&headers).as_deref(),
            Some("Bearer error=\"invalid_token\"")
        );
    }

    #[test]
    fn transport_error_is_generic() {
        let url = Url::parse("http://api.local/items").unwrap();
        let err = transport_error(&url, "connection refused");
        assert_eq!(
            err,
            AppError::Generic(json!({
                "message": "connection refused",
                "url": "http://api.local/items",
            }))
        );
    }
}
