use std::sync::{Arc, RwLock};

/// The authorization configuration injected into every outbound call.
///
/// The session store is the only writer. Reads and writes are synchronous so
/// a request prepared after `clear()` returns can never carry the old token.
#[derive(Clone, Default)]
pub struct AuthState {
    token: Arc<RwLock<Option<String>>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.into());
    }

    pub fn clear(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Value for the `Authorization` header, if a token is present.
    pub fn authorization(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }

    pub fn is_set(&self) -> bool {
        self.token().is_some()
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("token", &self.is_set().then_some("***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_token() {
        let state = AuthState::new();
        let seen_by_client = state.clone();

        state.set_token("abc");
        assert_eq!(seen_by_client.authorization().as_deref(), Some("Bearer abc"));

        state.clear();
        assert!(!seen_by_client.is_set());
    }
}
