use crate::session::SessionExpired;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// What every facade call yields: a normalized response, or the session-reset
/// signal raised by an auth challenge.
pub type Outcome<T> = std::result::Result<ApiResponse<T>, SessionExpired>;

/// Request failure tagged by the status the server answered with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(Value),
    #[error("unauthorized: {0}")]
    Unauthorized(Value),
    #[error("not found: {0}")]
    NotFound(Value),
    #[error("request failed: {0}")]
    Generic(Value),
}

impl AppError {
    /// Pick the variant for a failed response's status.
    pub fn from_status(status: StatusCode, body: Value) -> Self {
        match status {
            StatusCode::BAD_REQUEST => AppError::BadRequest(body),
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(body),
            StatusCode::NOT_FOUND => AppError::NotFound(body),
            _ => AppError::Generic(body),
        }
    }

    pub fn body(&self) -> &Value {
        match self {
            AppError::BadRequest(body)
            | AppError::Unauthorized(body)
            | AppError::NotFound(body)
            | AppError::Generic(body) => body,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BadRequest",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotFound(_) => "NotFound",
            AppError::Generic(_) => "Error",
        }
    }

    /// The status this variant stands for; `None` for the catch-all.
    pub fn status_hint(&self) -> Option<StatusCode> {
        match self {
            AppError::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            AppError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            AppError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            AppError::Generic(_) => None,
        }
    }
}

/// Uniform envelope for one completed request.
///
/// `succeeded()` holds exactly when no error is present. Fields are fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    payload: Option<T>,
    error: Option<AppError>,
    headers: Option<HeaderMap>,
}

impl<T> ApiResponse<T> {
    pub fn success(payload: T, headers: Option<HeaderMap>) -> Self {
        Self {
            payload: Some(payload),
            error: None,
            headers,
        }
    }

    pub fn failure(error: AppError, headers: Option<HeaderMap>) -> Self {
        Self {
            payload: None,
            error: Some(error),
            headers,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    /// Collapse into a plain `Result`, dropping headers.
    pub fn into_result(self) -> std::result::Result<Option<T>, AppError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_table() {
        let body = json!({"msg": "x"});
        assert!(matches!(
            AppError::from_status(StatusCode::BAD_REQUEST, body.clone()),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::UNAUTHORIZED, body.clone()),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::NOT_FOUND, body.clone()),
            AppError::NotFound(_)
        ));
        for status in [
            StatusCode::FORBIDDEN,
            StatusCode::CONFLICT,
            StatusCode::UNPROCESSABLE_ENTITY,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
        ] {
            let err = AppError::from_status(status, body.clone());
            assert_eq!(err, AppError::Generic(body.clone()), "status {status}");
        }
    }

    #[test]
    fn succeeded_tracks_error() {
        let ok: ApiResponse<Value> = ApiResponse::success(json!([1, 2]), None);
        assert!(ok.succeeded());
        assert!(ok.error().is_none());
        assert_eq!(ok.payload(), Some(&json!([1, 2])));

        let failed: ApiResponse<Value> =
            ApiResponse::failure(AppError::NotFound(json!({"msg": "x"})), None);
        assert!(!failed.succeeded());
        assert!(failed.payload().is_none());
        assert_eq!(failed.error().map(AppError::kind), Some("NotFound"));
    }

    #[test]
    fn into_result_splits_channels() {
        let failed: ApiResponse<Value> =
            ApiResponse::failure(AppError::BadRequest(json!("nope")), None);
        let err = failed.into_result().unwrap_err();
        assert_eq!(err.body(), &json!("nope"));
        assert_eq!(err.status_hint(), Some(StatusCode::BAD_REQUEST));
    }
}
