use crate::domain_model::Subject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque refresh handle. `Debug` is redacted so the value never reaches logs.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshTokenId(pub String);

impl RefreshTokenId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshTokenId(..)")
    }
}

impl From<&str> for RefreshTokenId {
    fn from(s: &str) -> Self {
        RefreshTokenId(s.to_string())
    }
}

/// Issuance result; the two halves always travel together.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: AccessToken,
    pub refresh_token_id: RefreshTokenId,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub subject: Subject,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
