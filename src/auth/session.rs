use std::sync::{Arc, RwLock};

use serde_json::json;
use tracing::{info, instrument, warn};

use crate::auth::jwt;
use crate::auth::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use crate::errors::{ClientError, Result};
use crate::http::ApiClient;
use crate::model::UserProfile;
use crate::models::{Claims, LoginReqDto, LoginResponse};
use crate::route::Route;

const LOGIN_PATH: &str = "/api/auth/token";
const LOGOUT_PATH: &str = "/api/auth/logout";

/// An authenticated session. Token and user only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogoutOutcome {
    /// Whether the backend accepted the invalidation call.
    pub backend_acknowledged: bool,
    pub redirect: Route,
}

pub struct SessionStore {
    client: ApiClient,
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Rebuilds the session persisted by a previous run, if any.
    ///
    /// A malformed persisted user, or a token without a user (or the reverse),
    /// is treated as no session and the leftovers are removed.
    pub fn restore(client: ApiClient, storage: Arc<dyn SessionStorage>) -> Self {
        let token = storage.get(TOKEN_KEY).ok().flatten().filter(|t| !t.is_empty());
        let user = storage
            .get(USER_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok());

        let restored = match (token, user) {
            (Some(token), Some(user)) => {
                client.auth().set_token(token.clone());
                info!(username = %user.username, "session restored");
                Some(Session { user, token })
            }
            (None, None) => {
                client.auth().clear();
                None
            }
            _ => {
                warn!("discarding incomplete persisted session");
                client.auth().clear();
                let _ = storage.remove(TOKEN_KEY);
                let _ = storage.remove(USER_KEY);
                None
            }
        };

        Self {
            client,
            storage,
            current: RwLock::new(restored),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.current().map(|s| s.user)
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    /// Claims carried by the current token, when it is a JWT.
    pub fn claims(&self) -> Option<Claims> {
        self.token().and_then(|t| jwt::inspect_token(&t))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginReqDto) -> Result<Session> {
        // A stale token must not ride along on the login request.
        self.client.auth().clear();

        let response: LoginResponse = self
            .client
            .post(LOGIN_PATH, credentials)
            .await
            .map_err(|e| match e {
                ClientError::Transport { .. } => e,
                other => {
                    let message = other.user_message("Login failed");
                    ClientError::Auth {
                        message,
                        payload: other.payload().cloned(),
                    }
                }
            })?;

        let token = response
            .bearer()
            .ok_or_else(|| ClientError::Auth {
                message: "Login response did not include a token".to_string(),
                payload: None,
            })?
            .to_string();
        let mut user = response
            .user
            .clone()
            .unwrap_or_else(|| UserProfile::named(credentials.username.clone()));
        if user.username.trim().is_empty() {
            user.username = credentials.username.clone();
        }

        self.persist(&token, &user)?;

        let session = Session { user, token };
        self.client.auth().set_token(session.token.clone());
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());

        info!(username = %session.user.username, "logged in");
        Ok(session)
    }

    /// Always ends with no session, whatever the backend says.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> LogoutOutcome {
        let backend_acknowledged = match self
            .client
            .post::<_, serde_json::Value>(LOGOUT_PATH, &json!({}))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Logout failed on backend (ignored)");
                false
            }
        };

        self.clear_local();

        LogoutOutcome {
            backend_acknowledged,
            redirect: Route::ENTRY,
        }
    }

    /// Drops the session locally without telling the backend.
    pub fn clear_local(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        self.client.auth().clear();

        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(error = %e, key, "failed to remove persisted session entry");
            }
        }
    }

    fn persist(&self, token: &str, user: &UserProfile) -> Result<()> {
        let user_json = serde_json::to_string(user)?;
        let written = self
            .storage
            .set(TOKEN_KEY, token)
            .and_then(|_| self.storage.set(USER_KEY, &user_json));

        if let Err(e) = written {
            let _ = self.storage.remove(TOKEN_KEY);
            let _ = self.storage.remove(USER_KEY);
            return Err(e);
        }
        Ok(())
    }
}
