//! Reading request cookies and writing `Set-Cookie` headers over `http` types

use http::header::{COOKIE, HeaderMap, SET_COOKIE};
use http::request::Parts;
use http::{Request, Response};

use crate::cookie::Cookie;
use crate::errors::SessionError;

/// Anything a named cookie can be read from
pub trait CookieSource {
    /// Value of the first cookie called `name`, `None` when absent
    fn cookie(&self, name: &str) -> Option<&str>;
}

/// Anything a `Set-Cookie` header can be written to
pub trait CookieSink {
    fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), SessionError>;
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

impl CookieSource for HeaderMap {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .map(str::trim)
            .find_map(|pair| match pair.split_once('=') {
                Some((k, v)) if k.trim() == name => Some(unquote(v.trim())),
                _ => None,
            })
    }
}

impl<B> CookieSource for Request<B> {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.headers().cookie(name)
    }
}

impl CookieSource for Parts {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.headers.cookie(name)
    }
}

impl CookieSource for headers::Cookie {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.get(name).map(unquote)
    }
}

impl CookieSink for HeaderMap {
    fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), SessionError> {
        self.append(SET_COOKIE, cookie.to_header_value()?);
        Ok(())
    }
}

impl<B> CookieSink for Response<B> {
    fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), SessionError> {
        self.headers_mut().set_cookie(cookie)
    }
}

/// Records cookies instead of writing headers
impl CookieSink for Vec<Cookie> {
    fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), SessionError> {
        cookie.to_header_value()?;
        self.push(cookie.clone());
        Ok(())
    }
}
