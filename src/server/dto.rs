use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::types::{ShaderId, ShaderQuery, ShaderScript, User, UserId};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct CreateShaderRequest {
    pub name: String,
    #[serde(default)]
    pub scripts: Vec<ShaderScript>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchShadersParams {
    /// Free-text filter over names and sources.
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-separated tag names; all must match.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub id: Option<ShaderId>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
    /// 1-based page number; ignored when `offset` is given.
    #[serde(default)]
    pub page: Option<usize>,
}

impl SearchShadersParams {
    #[must_use]
    pub fn into_query(self) -> ShaderQuery {
        let limit = match self.limit {
            Some(limit) if limit > 0 => limit.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        let offset = self.offset.unwrap_or_else(|| {
            self.page
                .map_or(0, |page| page.saturating_sub(1).saturating_mul(limit))
        });

        ShaderQuery {
            text: self.q,
            tags: self
                .tags
                .as_deref()
                .map(|tags| tags.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            owner_id: self.owner_id,
            username: self.username,
            shader_id: self.id,
            limit: Some(limit),
            offset,
        }
    }
}
