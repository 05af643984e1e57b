use serde::Serialize;

use crate::claims::TokenClaims;
use crate::session::{SessionStorage, SessionStore};

/// What the UI knows about the current user.
///
/// Computed once per page load from the session store. `user_id` and
/// `is_root` come from unverified claims and only drive what is displayed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    token: Option<String>,
    user_id: Option<i64>,
    is_root: bool,
}

impl AuthContext {
    /// Context of a visitor without a session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_token(token: Option<String>) -> Self {
        let Some(token) = token else {
            return Self::anonymous();
        };
        let claims = TokenClaims::decode(&token);

        Self {
            user_id: claims.as_ref().and_then(TokenClaims::user_id),
            is_root: claims.as_ref().is_some_and(TokenClaims::is_root),
            token: Some(token),
        }
    }

    pub fn load<S>(store: &SessionStore<S>) -> Self
    where
        S: SessionStorage,
    {
        Self::from_token(store.load())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
