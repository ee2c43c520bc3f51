use crate::store::TokenStore;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Request;
use std::sync::Arc;
use tracing::{debug, warn};

/// Adds `Authorization: Bearer <token>` to requests that ask for it.
#[derive(Clone)]
pub struct AuthDecorator {
    store: Arc<dyn TokenStore>,
}

impl AuthDecorator {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Decorate an outgoing request. Never fails; a missing or unusable
    /// token leaves the request untouched.
    pub fn decorate(&self, mut request: Request, auth: bool) -> Request {
        if !auth {
            return request;
        }
        let token = match self.store.token() {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                debug!(url = %request.url(), "auth requested but no token stored");
                return request;
            }
            Err(e) => {
                warn!(error = %e, "failed to read token store");
                return request;
            }
        };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => warn!(error = %e, "stored token is not a valid header value"),
        }
        request
    }
}

impl std::fmt::Debug for AuthDecorator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthDecorator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CourierError, Result};
    use crate::store::{FileTokenStore, MemoryTokenStore};
    use reqwest::{Method, Url};

    struct BrokenStore;

    impl TokenStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CourierError::Store("backend unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CourierError::Store("backend unavailable".into()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(CourierError::Store("backend unavailable".into()))
        }
    }

    fn request() -> Request {
        Request::new(Method::GET, Url::parse("http://api.local/items").unwrap())
    }

    #[test]
    fn adds_bearer_when_flag_set() {
        let decorator = AuthDecorator::new(Arc::new(MemoryTokenStore::with_token("abc")));
        let req = decorator.decorate(request(), true);
        assert_eq!(req.headers().get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn skips_when_flag_unset() {
        let decorator = AuthDecorator::new(Arc::new(MemoryTokenStore::with_token("abc")));
        let req = decorator.decorate(request(), false);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn skips_without_token() {
        let decorator = AuthDecorator::new(Arc::new(MemoryTokenStore::new()));
        let req = decorator.decorate(request(), true);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_token_is_ignored() {
        let decorator = AuthDecorator::new(Arc::new(MemoryTokenStore::with_token("bad\ntoken")));
        let req = decorator.decorate(request(), true);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn store_read_error_sends_without_header() {
        let decorator = AuthDecorator::new(Arc::new(BrokenStore));
        let req = decorator.decorate(request(), true);
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert_eq!(req.url().as_str(), "http://api.local/items");
    }

    #[test]
    fn corrupt_file_store_sends_without_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        let decorator = AuthDecorator::new(Arc::new(FileTokenStore::new(&path)));
        let req = decorator.decorate(request(), true);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn overrides_caller_header() {
        let decorator = AuthDecorator::new(Arc::new(MemoryTokenStore::with_token("abc")));
        let mut req = request();
        req.headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        let req = decorator.decorate(req, true);
        assert_eq!(req.headers().get(AUTHORIZATION).unwrap(), "Bearer abc");
    }
}
