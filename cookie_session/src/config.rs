//! Cookie policy configuration

use std::env;

use serde::{Deserialize, Serialize};

use crate::codec::KeyPair;
use crate::cookie::SameSite;
use crate::errors::SessionError;

/// One week, the lifetime used by both presets
pub const DEFAULT_MAX_AGE: i64 = 3600 * 24 * 7;

/// Attributes applied to every cookie a store writes.
///
/// A `CookieConfig` carries no per-request state and is shared by all
/// save and destroy calls of the store that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Empty means the scope of the responding resource
    pub path: String,
    /// Empty means host-only
    pub domain: String,
    /// Zero omits `Max-Age` (browser session cookie), negative deletes the
    /// cookie immediately, positive keeps it for that many seconds.
    pub max_age: i64,
    /// Only send the cookie over HTTPS
    pub secure: bool,
    /// Hide the cookie from scripts
    pub http_only: bool,
    /// Cross-site policy, `None` omits the attribute
    pub same_site: Option<SameSite>,
}

impl CookieConfig {
    /// HttpOnly, Secure, SameSite=Strict, one week
    pub fn production() -> Self {
        Self {
            path: "/".to_string(),
            domain: String::new(),
            max_age: DEFAULT_MAX_AGE,
            secure: true,
            http_only: true,
            same_site: Some(SameSite::Strict),
        }
    }

    /// HttpOnly, not Secure, SameSite=Lax, one week.
    ///
    /// Intended for local development over plain HTTP. Do not use in production.
    pub fn debug() -> Self {
        Self {
            secure: false,
            same_site: Some(SameSite::Lax),
            ..Self::production()
        }
    }

    /// Policy used for deletion cookies: only the scope (path and domain) is
    /// kept, a browser removes a cookie only when the scope matches.
    pub(crate) fn deletion(&self) -> Self {
        Self {
            path: self.path.clone(),
            domain: self.domain.clone(),
            max_age: -1,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    /// Build a configuration from `SESSION_COOKIE_*` environment variables.
    ///
    /// `SESSION_COOKIE_PRESET` selects the base (`production` or `debug`);
    /// the remaining variables override single attributes. Values that fail
    /// to parse leave the preset's value in place.
    pub fn from_env() -> Self {
        let mut config = match env::var("SESSION_COOKIE_PRESET").as_deref() {
            Ok("debug") | Ok("development") => Self::debug(),
            _ => Self::production(),
        };

        if let Ok(path) = env::var("SESSION_COOKIE_PATH") {
            config.path = path;
        }
        if let Ok(domain) = env::var("SESSION_COOKIE_DOMAIN") {
            config.domain = domain;
        }
        if let Some(max_age) = env::var("SESSION_COOKIE_MAX_AGE")
            .ok()
            .and_then(|s| s.trim().parse().ok())
        {
            config.max_age = max_age;
        }
        if let Some(secure) = env_bool("SESSION_COOKIE_SECURE") {
            config.secure = secure;
        }
        if let Some(http_only) = env_bool("SESSION_COOKIE_HTTP_ONLY") {
            config.http_only = http_only;
        }
        if let Ok(same_site) = env::var("SESSION_COOKIE_SAME_SITE") {
            match same_site.trim().to_ascii_lowercase().as_str() {
                "" => config.same_site = None,
                other => {
                    if let Ok(parsed) = other.parse() {
                        config.same_site = Some(parsed);
                    }
                }
            }
        }

        config
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self::production()
    }
}

fn env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read key pairs from `SESSION_KEYS`.
///
/// The variable holds comma-separated `hash_key[:block_key]` entries in
/// unpadded base64url, primary key first. Returns an empty list when the
/// variable is unset.
pub fn keys_from_env() -> Result<Vec<KeyPair>, SessionError> {
    let Ok(raw) = env::var("SESSION_KEYS") else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| {
            KeyPair::parse(entry)
                .map_err(|e| SessionError::Config(format!("SESSION_KEYS entry {index}: {e}")))
        })
        .collect()
}
