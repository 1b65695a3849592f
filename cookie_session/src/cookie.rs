//! Cookie policy: turning a [`CookieConfig`] into `Set-Cookie` attributes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::config::CookieConfig;
use crate::errors::SessionError;

/// `Expires` format required by RFC 6265 (IMF-fixdate)
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    /// Bare `SameSite` attribute, leaving the mode to the browser
    Default,
    Lax,
    Strict,
    None,
}

impl SameSite {
    fn attribute(self) -> &'static str {
        match self {
            SameSite::Default => "SameSite",
            SameSite::Lax => "SameSite=Lax",
            SameSite::Strict => "SameSite=Strict",
            SameSite::None => "SameSite=None",
        }
    }
}

impl FromStr for SameSite {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(SameSite::Default),
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            other => Err(SessionError::Config(format!("Unknown SameSite mode: {other}"))),
        }
    }
}

/// A cookie as it travels in a `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: String,
    /// Same three-way meaning as [`CookieConfig::max_age`]
    pub max_age: i64,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

/// Build a cookie carrying `name=value` with the attributes from `config`.
///
/// `Expires` is derived from `max_age` for clients that ignore `Max-Age`.
pub fn build_cookie(name: &str, value: &str, config: &CookieConfig) -> Cookie {
    Cookie {
        name: name.to_string(),
        value: value.to_string(),
        path: config.path.clone(),
        domain: config.domain.clone(),
        max_age: config.max_age,
        expires: cookie_expires(config.max_age),
        secure: config.secure,
        http_only: config.http_only,
        same_site: config.same_site,
    }
}

/// `Expires` for a given `Max-Age`: now + max_age when positive, one second
/// past the epoch when negative, none when zero.
pub fn cookie_expires(max_age: i64) -> Option<DateTime<Utc>> {
    match max_age {
        0 => None,
        age if age > 0 => {
            Duration::try_seconds(age).and_then(|ttl| Utc::now().checked_add_signed(ttl))
        }
        _ => DateTime::from_timestamp(1, 0),
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic()
        && !matches!(
            c,
            '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?'
                | '=' | '{' | '}'
        )
}

fn is_cookie_value_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '\\')
}

impl Cookie {
    fn validate(&self) -> Result<(), SessionError> {
        if self.name.is_empty() || !self.name.chars().all(is_token_char) {
            return Err(SessionError::Cookie(format!(
                "Invalid cookie name: {:?}",
                self.name
            )));
        }
        if !self.value.chars().all(is_cookie_value_char) {
            return Err(SessionError::Cookie(format!(
                "Invalid value for cookie {}",
                self.name
            )));
        }
        if self.path.chars().any(|c| c == ';' || c.is_ascii_control()) {
            return Err(SessionError::Cookie(format!(
                "Invalid path for cookie {}",
                self.name
            )));
        }
        if self.domain.chars().any(|c| c == ';' || c.is_ascii_control()) {
            return Err(SessionError::Cookie(format!(
                "Invalid domain for cookie {}",
                self.name
            )));
        }
        Ok(())
    }

    /// Render the cookie as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> Result<HeaderValue, SessionError> {
        self.validate()?;
        HeaderValue::from_str(&self.to_string())
            .map_err(|e| SessionError::Cookie(format!("Failed to build Set-Cookie header: {e}")))
    }

    /// Parse a `Set-Cookie` header value.
    ///
    /// Unknown attributes are ignored. A `Max-Age` of zero or less is reported
    /// as `-1`, the way a deletion cookie is configured.
    pub fn parse(set_cookie: &str) -> Result<Self, SessionError> {
        let mut parts = set_cookie.split(';').map(str::trim);
        let pair = parts.next().unwrap_or_default();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| SessionError::Cookie(format!("Missing '=' in cookie: {pair}")))?;

        let mut cookie = Cookie {
            name: name.trim().to_string(),
            value: value.trim().trim_matches('"').to_string(),
            path: String::new(),
            domain: String::new(),
            max_age: 0,
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
        };

        for attribute in parts.filter(|p| !p.is_empty()) {
            let (key, val) = match attribute.split_once('=') {
                Some((key, val)) => (key.trim(), Some(val.trim())),
                None => (attribute, None),
            };
            match (key.to_ascii_lowercase().as_str(), val) {
                ("path", Some(val)) => cookie.path = val.to_string(),
                ("domain", Some(val)) => cookie.domain = val.trim_start_matches('.').to_string(),
                ("max-age", Some(val)) => {
                    let secs: i64 = val.parse().map_err(|_| {
                        SessionError::Cookie(format!("Invalid Max-Age: {val}"))
                    })?;
                    cookie.max_age = if secs <= 0 { -1 } else { secs };
                }
                ("expires", Some(val)) => {
                    let parsed = NaiveDateTime::parse_from_str(val, EXPIRES_FORMAT)
                        .map_err(|_| SessionError::Cookie(format!("Invalid Expires: {val}")))?;
                    cookie.expires = Some(parsed.and_utc());
                }
                ("secure", _) => cookie.secure = true,
                ("httponly", _) => cookie.http_only = true,
                ("samesite", None) => cookie.same_site = Some(SameSite::Default),
                ("samesite", Some(val)) => cookie.same_site = val.parse().ok(),
                _ => {}
            }
        }

        Ok(cookie)
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if !self.path.is_empty() {
            write!(f, "; Path={}", self.path)?;
        }
        // A leading dot is ignored by RFC 6265 compliant clients
        let domain = self.domain.trim_start_matches('.');
        if !domain.is_empty() {
            write!(f, "; Domain={domain}")?;
        }
        if let Some(expires) = self.expires {
            write!(f, "; Expires={}", expires.format(EXPIRES_FORMAT))?;
        }
        if self.max_age > 0 {
            write!(f, "; Max-Age={}", self.max_age)?;
        } else if self.max_age < 0 {
            write!(f, "; Max-Age=0")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; {}", same_site.attribute())?;
        }
        Ok(())
    }
}
