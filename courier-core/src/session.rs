//! Session reset signalling.
//!
//! An auth challenge from the server invalidates the whole session: the stored
//! token is dropped and the host application must start over. That path is
//! reported through `SessionExpired` and the `SessionHook`, never as an
//! ordinary `ApiResponse`.

use thiserror::Error;
use tracing::warn;

/// Fatal signal: the server challenged our credentials and the session was reset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session expired: server sent an authentication challenge ({challenge})")]
pub struct SessionExpired {
    /// Raw value of the challenge header.
    pub challenge: String,
    /// Url of the request that triggered it.
    pub url: String,
}

/// Global side effect run once per auth challenge, after the token is cleared.
///
/// A browser host would reload the page here; a CLI or service resets its
/// own state.
pub trait SessionHook: Send + Sync {
    fn session_expired(&self, signal: &SessionExpired);
}

/// Default hook: only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSessionHook;

impl SessionHook for LogSessionHook {
    fn session_expired(&self, signal: &SessionExpired) {
        warn!(url = %signal.url, challenge = %signal.challenge, "session reset after auth challenge");
    }
}

impl<F> SessionHook for F
where
    F: Fn(&SessionExpired) + Send + Sync,
{
    fn session_expired(&self, signal: &SessionExpired) {
        self(signal)
    }
}
