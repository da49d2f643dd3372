//! API key handling: the configured key set, bearer validation and key generation.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

/// Scheme prefix expected in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Characters used for generated keys.
pub const KEY_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of generated keys unless the caller asks otherwise.
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// One `API_KEYS` entry: an application name and its secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub appname: String,
    pub key: String,
}

/// Validates a bearer token against a set of known keys.
pub trait CredentialValidator: Send + Sync {
    /// True only if `token` exactly matches a configured key.
    fn validate(&self, token: &str) -> bool;
}

/// Configured application keys, app name to secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    keys: BTreeMap<String, String>,
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("apps", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ApiKeys {
    /// Build from explicit entries. Later duplicates overwrite earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = KeyEntry>) -> Self {
        Self {
            keys: entries.into_iter().map(|e| (e.appname, e.key)).collect(),
        }
    }

    /// Parse the `API_KEYS` format: a JSON array of `{"appname", "key"}` objects.
    ///
    /// Entries missing either field are skipped. A document that is not
    /// valid JSON is logged and yields an empty key set.
    pub fn from_json(raw: &str) -> Self {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                error!("Could not parse API_KEYS JSON: {e}");
                return Self::default();
            }
        };

        let Value::Array(items) = value else {
            warn!("API_KEYS must be a JSON array; ignoring");
            return Self::default();
        };

        let entries = items.into_iter().filter_map(|item| {
            let appname = item.get("appname")?.as_str()?.to_string();
            let key = item.get("key")?.as_str()?.to_string();
            Some(KeyEntry { appname, key })
        });

        Self::from_entries(entries)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Configured application names (never the secrets).
    pub fn app_names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}

impl CredentialValidator for ApiKeys {
    fn validate(&self, token: &str) -> bool {
        !token.is_empty() && self.keys.values().any(|key| key == token)
    }
}

/// Why a request failed authentication.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is required. Please provide 'Authorization: Bearer <token>'.")]
    MissingHeader,

    #[error("Invalid authorization format. Use 'Bearer <token>'.")]
    InvalidScheme,

    #[error("Invalid token.")]
    InvalidToken,
}

/// Check an `Authorization` header value.
///
/// `None` means the header was absent.
pub fn authorize(
    header: Option<&str>,
    validator: &dyn CredentialValidator,
) -> Result<(), AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::InvalidScheme)?;

    if validator.validate(token) {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}

/// Generate a random key of `length` characters drawn from [`KEY_ALPHABET`].
pub fn generate_api_key(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())]))
        .collect()
}
