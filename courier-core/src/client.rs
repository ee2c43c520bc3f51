use crate::auth::AuthDecorator;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::normalize::ResponseNormalizer;
use crate::response::{ApiResponse, AppError, Outcome};
use crate::session::{LogSessionHook, SessionHook};
use crate::store::TokenStore;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Per-request knobs: query params, extra headers, and whether to send the token.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    headers: HeaderMap,
    auth: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the stored bearer token.
    pub fn authenticated(self) -> Self {
        self.auth(true)
    }

    pub fn auth(mut self, auth: bool) -> Self {
        self.auth = auth;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn requires_auth(&self) -> bool {
        self.auth
    }
}

/// Facade over the four verbs. Cheap to clone; clones share the connection
/// pool, the token store and the session hook.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    decorator: AuthDecorator,
    normalizer: ResponseNormalizer,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_hook(config, store, Arc::new(LogSessionHook))
    }

    pub fn with_hook(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        hook: Arc<dyn SessionHook>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            decorator: AuthDecorator::new(store.clone()),
            normalizer: ResponseNormalizer::new(store, hook),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Outcome<T> {
        self.dispatch(Method::GET, path, None, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Outcome<T> {
        self.dispatch(Method::DELETE, path, None, options).await
    }

    /// POST with an optional JSON body; `None` sends no body and no content type.
    pub async fn post<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match encode_body(body) {
            Ok(body) => self.dispatch(Method::POST, path, body, options).await,
            Err(e) => Ok(local_failure(path, format!("failed to encode request body: {e}"))),
        }
    }

    pub async fn put<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match encode_body(body) {
            Ok(body) => self.dispatch(Method::PUT, path, body, options).await,
            Err(e) => Ok(local_failure(path, format!("failed to encode request body: {e}"))),
        }
    }

    /// 构建请求 -> 注入 token -> 发送 -> 归一化。
    #[instrument(skip(self, body, options), fields(auth = options.requires_auth()))]
    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Outcome<T> {
        let url = match self.config.resolve(path) {
            Ok(url) => url,
            Err(e) => return Ok(local_failure(path, e.to_string())),
        };

        let mut builder = self.http.request(method, url.clone());
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        builder = builder.headers(options.headers);
        if let Some(body) = body.as_ref() {
            builder = builder.json(body);
        }
        let request = match builder.build() {
            Ok(request) => request,
            Err(e) => return Ok(self.normalizer.transport_failure(&url, &e)),
        };
        let request = self.decorator.decorate(request, options.auth);

        debug!(url = %request.url(), "sending request");
        match self.http.execute(request).await {
            Ok(response) => {
                debug!(status = %response.status(), "response received");
                self.normalizer.normalize(response).await
            }
            Err(e) => Ok(self.normalizer.transport_failure(&url, &e)),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url().as_str())
            .finish_non_exhaustive()
    }
}

fn encode_body<B: Serialize + ?Sized>(body: Option<&B>) -> serde_json::Result<Option<Value>> {
    body.map(serde_json::to_value).transpose()
}

/// Failure raised before anything hit the network.
fn local_failure<T>(path: &str, message: String) -> ApiResponse<T> {
    ApiResponse::failure(
        AppError::Generic(json!({
            "message": message,
            "url": path,
        })),
        None,
    )
}
