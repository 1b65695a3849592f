use std::collections::BTreeMap;

use chrono::Utc;
use cookie_session::Cookie;
use http::HeaderMap;
use http::header::{COOKIE, SET_COOKIE};

/// Mock browser cookie jar for integration testing
///
/// Applies `Set-Cookie` headers the way a compliant client does: a cookie is
/// stored or replaced by name, and removed when `Max-Age` is zero or negative
/// or `Expires` lies in the past. Scope matching is not modelled; tests use a
/// single path.
#[derive(Default)]
pub struct MockBrowser {
    jar: BTreeMap<String, String>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every `Set-Cookie` header of a response
    pub fn receive(&mut self, response: &HeaderMap) {
        for header in response.get_all(SET_COOKIE) {
            let cookie = Cookie::parse(header.to_str().unwrap()).unwrap();
            let expired_by_date = cookie.expires.is_some_and(|expires| expires <= Utc::now());
            if cookie.max_age < 0 || (cookie.max_age == 0 && expired_by_date) {
                self.jar.remove(&cookie.name);
            } else {
                self.jar.insert(cookie.name, cookie.value);
            }
        }
    }

    /// Headers of the next request, carrying every stored cookie
    pub fn request(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !self.jar.is_empty() {
            let cookie_header = self
                .jar
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(COOKIE, cookie_header.parse().unwrap());
        }
        headers
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(String::as_str)
    }

    /// Overwrite a stored cookie, the way a user could edit it
    pub fn set_raw(&mut self, name: &str, value: &str) {
        self.jar.insert(name.to_string(), value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.jar.is_empty()
    }
}
