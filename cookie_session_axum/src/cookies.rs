use std::convert::Infallible;

use axum::response::{IntoResponse, IntoResponseParts, Response, ResponseParts};
use cookie_session::{Cookie, CookieSink, SessionError};
use http::HeaderValue;
use http::header::SET_COOKIE;

/// `Set-Cookie` headers collected during a handler, emitted as a response part
#[derive(Debug, Default, Clone)]
pub struct SetCookies {
    values: Vec<HeaderValue>,
}

impl SetCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CookieSink for SetCookies {
    fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), SessionError> {
        self.values.push(cookie.to_header_value()?);
        Ok(())
    }
}

impl IntoResponseParts for SetCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for value in self.values {
            res.headers_mut().append(SET_COOKIE, value);
        }
        Ok(res)
    }
}

impl IntoResponse for SetCookies {
    fn into_response(self) -> Response {
        (self, ()).into_response()
    }
}
