//! Login session shared by every request sent through one client.

use http::{HeaderMap, HeaderValue, StatusCode};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::secret::SecretString;

/// Header carrying the login token on outbound requests.
pub const TOKEN_HEADER: &str = "x-token";

/// Header carrying the logged-in user id on outbound requests.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Response header the backend uses to hand out a refreshed token.
pub const NEW_TOKEN_HEADER: &str = "new-token";

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user_id: Option<String>,
}

/// Token and user id for the current login.
///
/// Cloning shares the same state. The lock is only held for the duration of
/// a read or a swap, never across an `.await`.
#[derive(Clone, Default)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        let session = Self::new();
        session.set_token(config.token.clone());
        if let Some(user_id) = &config.user_id {
            session.set_user_id(user_id.clone());
        }
        session
    }

    pub fn set_token(&self, token: impl Into<SecretString>) {
        self.state.write().token = Some(token.into());
    }

    pub fn set_user_id(&self, user_id: impl Into<String>) {
        self.state.write().user_id = Some(user_id.into());
    }

    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.state.read().token.clone()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.state.read().user_id.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().token.is_some()
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.token = None;
        state.user_id = None;
    }

    /// Add `x-token` / `x-user-id` unless the caller already set them.
    ///
    /// Values that are not valid header values are skipped with a warning.
    pub(crate) fn apply(&self, headers: &mut HeaderMap) {
        let state = self.state.read();

        if let Some(token) = &state.token
            && !headers.contains_key(TOKEN_HEADER)
        {
            match HeaderValue::from_str(token.expose()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(TOKEN_HEADER, value);
                }
                Err(_) => tracing::warn!("session token is not a valid header value; skipped"),
            }
        }

        if let Some(user_id) = &state.user_id
            && !headers.contains_key(USER_ID_HEADER)
        {
            match HeaderValue::from_str(user_id) {
                Ok(value) => {
                    headers.insert(USER_ID_HEADER, value);
                }
                Err(_) => tracing::warn!("session user id is not a valid header value; skipped"),
            }
        }
    }

    /// Update the session from a response: `new-token` replaces the token,
    /// `401 Unauthorized` drops the session.
    pub(crate) fn absorb(&self, status: StatusCode, headers: &HeaderMap) {
        if status == StatusCode::UNAUTHORIZED {
            if self.is_authenticated() {
                tracing::info!("backend answered 401; clearing session");
            }
            self.clear();
            return;
        }

        if let Some(token) = headers
            .get(NEW_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        {
            tracing::info!("backend issued a refreshed session token");
            self.set_token(token);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Session")
            .field("token", &state.token)
            .field("user_id", &state.user_id)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_apply_injects_both_headers() {
        let session = Session::new();
        session.set_token("tok-1");
        session.set_user_id("7");

        let mut headers = HeaderMap::new();
        session.apply(&mut headers);

        assert_eq!(headers.get(TOKEN_HEADER).unwrap(), "tok-1");
        assert!(headers.get(TOKEN_HEADER).unwrap().is_sensitive());
        assert_eq!(headers.get(USER_ID_HEADER).unwrap(), "7");
    }

    #[test]
    fn test_apply_does_not_override_explicit_header() {
        let session = Session::new();
        session.set_token("from-session");

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("explicit"));
        session.apply(&mut headers);

        assert_eq!(headers.get(TOKEN_HEADER).unwrap(), "explicit");
    }

    #[test]
    fn test_apply_without_session_adds_nothing() {
        let mut headers = HeaderMap::new();
        Session::new().apply(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_absorb_new_token() {
        let session = Session::new();
        session.set_token("old");

        let mut headers = HeaderMap::new();
        headers.insert(NEW_TOKEN_HEADER, HeaderValue::from_static("fresh"));
        session.absorb(StatusCode::OK, &headers);

        assert_eq!(session.token().unwrap().expose(), "fresh");
    }

    #[test]
    fn test_absorb_unauthorized_clears() {
        let session = Session::new();
        session.set_token("old");
        session.set_user_id("7");

        session.absorb(StatusCode::UNAUTHORIZED, &HeaderMap::new());

        assert!(!session.is_authenticated());
        assert!(session.user_id().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let a = Session::new();
        let b = a.clone();
        a.set_token("shared");
        assert_eq!(b.token().unwrap().expose(), "shared");
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new();
        session.set_token("do-not-print");
        assert!(!format!("{session:?}").contains("do-not-print"));
    }
}
