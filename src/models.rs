use serde::{Deserialize, Serialize};

use crate::model::UserProfile;

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginReqDto {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginReqDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginReqDto")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// `POST /api/auth/token` response. Older backends answer with `accessToken`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,

    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl LoginResponse {
    pub fn bearer(&self) -> Option<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.access_token.as_deref().filter(|t| !t.is_empty()))
    }
}

/// Claims we read out of the issued token. Never verified client side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub role: Option<serde_json::Value>,
}
