use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

use crate::error::{Error, Result};
use crate::types::UserId;

const TOKEN_PREFIX: &str = "shaderhub";
const SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Opaque bearer tokens mapped to users. Sessions live only in memory.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a new token of the form `shaderhub_<64 hex chars>`.
    pub fn issue(&self, user_id: UserId) -> (String, Session) {
        let token = generate_token();
        let now = Utc::now();
        let session = Session {
            user_id,
            created_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.sessions().insert(token.clone(), session.clone());
        (token, session)
    }

    /// Looks up a live session. Expired sessions are dropped on access.
    pub fn resolve(&self, token: &str) -> Option<Session> {
        parse_token(token).ok()?;

        let now = Utc::now();
        let mut sessions = self.sessions();
        match sessions.get(token) {
            Some(session) if session.is_expired(now) => {
                sessions.remove(token);
                None
            }
            Some(session) => Some(session.clone()),
            None => None,
        }
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions().remove(token).is_some()
    }

    /// Removes every expired session and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    fn sessions(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{TOKEN_PREFIX}_{}", hex::encode(bytes))
}

/// Checks the token shape and returns its secret part.
pub fn parse_token(token: &str) -> Result<&str> {
    let secret = token
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|rest| rest.strip_prefix('_'))
        .ok_or(Error::Unauthorized)?;

    if secret.len() != SECRET_BYTES * 2 || !secret.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::Unauthorized);
    }
    Ok(secret)
}
