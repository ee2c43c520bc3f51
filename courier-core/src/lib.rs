//! Core library for the courier HTTP wrapper: base-URL configuration, bearer
//! token injection, and normalization of every response into an `ApiResponse`.

mod auth;
mod client;
mod config;
mod error;
mod normalize;
mod response;
mod session;
pub mod store;

pub use auth::AuthDecorator;
pub use client::{ApiClient, RequestOptions};
pub use config::{ClientConfig, DEFAULT_API_BASE, ENV_API_BASE, ENV_TIMEOUT_SECS};
pub use error::{CourierError, Result};
pub use normalize::{ResponseNormalizer, AUTH_CHALLENGE_HEADER};
pub use response::{ApiResponse, AppError, Outcome};
pub use session::{LogSessionHook, SessionExpired, SessionHook};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
