//! Bearer-token authentication.
//!
//! Each configured API key maps to a [`UserProfile`]. Lookups compare the
//! presented token against every key in constant time, so response timing
//! does not reveal which key prefix matched.

use pulseboard_core::dashboard::UserProfile;
use serde::Deserialize;
use std::fmt;
use subtle::ConstantTimeEq;

/// A single API key entry from `PULSEBOARD_API_KEYS`.
#[derive(Clone, Deserialize)]
pub struct ApiKeyEntry {
    /// The bearer token string.
    pub key: String,
    /// Display name of the key's owner.
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Resolved key → profile table.
#[derive(Clone, Default)]
pub struct AuthConfig {
    keys: Vec<(String, UserProfile)>,
}

impl AuthConfig {
    /// Builds an `AuthConfig` from a list of key entries. Empty keys are skipped.
    pub fn from_entries(entries: Vec<ApiKeyEntry>) -> Self {
        let keys = entries
            .into_iter()
            .filter(|e| !e.key.is_empty())
            .map(|e| {
                (
                    e.key,
                    UserProfile {
                        name: e.name,
                        email: e.email,
                    },
                )
            })
            .collect();
        Self { keys }
    }

    /// A single key owned by a generic `admin` profile.
    pub fn single(key: impl Into<String>) -> Self {
        Self::from_entries(vec![ApiKeyEntry {
            key: key.into(),
            name: "admin".to_string(),
            email: None,
        }])
    }

    /// Resolves the key table from the raw values of `PULSEBOARD_API_KEYS`
    /// (JSON array) and `PULSEBOARD_API_KEY` (one key). The JSON list wins when
    /// both are set. Having no usable key at all is an error.
    pub fn from_sources(keys_json: Option<&str>, single_key: Option<&str>) -> Result<Self, String> {
        let config = match (keys_json.filter(|s| !s.trim().is_empty()), single_key) {
            (Some(json), _) => {
                let entries: Vec<ApiKeyEntry> = serde_json::from_str(json)
                    .map_err(|e| format!("PULSEBOARD_API_KEYS contains invalid JSON: {e}"))?;
                Self::from_entries(entries)
            }
            (None, Some(key)) => Self::single(key.trim()),
            (None, None) => Self::default(),
        };
        if config.is_empty() {
            return Err(
                "no API keys configured: set PULSEBOARD_API_KEYS or PULSEBOARD_API_KEY".to_string(),
            );
        }
        Ok(config)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the profile owning `token`, or `None` if the token is unknown.
    pub fn authenticate(&self, token: &str) -> Option<UserProfile> {
        let mut found = None;
        for (key, profile) in &self.keys {
            if bool::from(key.as_bytes().ct_eq(token.as_bytes())) && found.is_none() {
                found = Some(profile.clone());
            }
        }
        found
    }
}

// Keys never appear in logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl fmt::Debug for ApiKeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyEntry")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
