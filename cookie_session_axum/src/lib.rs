//! Axum integration for cookie-session
//!
//! Handlers read the session from the request's `HeaderMap`, collect the
//! resulting `Set-Cookie` headers in [`SetCookies`], and return it as part
//! of the response:
//!
//! ```no_run
//! use axum::{extract::State, response::IntoResponse};
//! use cookie_session::CookieStore;
//! use cookie_session_axum::{IntoResponseError, SetCookies, load_or_new};
//! use http::{HeaderMap, StatusCode};
//! use std::sync::Arc;
//!
//! async fn visit(
//!     State(store): State<Arc<CookieStore<u64>>>,
//!     headers: HeaderMap,
//! ) -> Result<impl IntoResponse, (StatusCode, String)> {
//!     let mut session = load_or_new(store.as_ref(), &headers, "visits").into_response_error()?;
//!     let count = session.get("count") + 1;
//!     session.set("count", count);
//!
//!     let mut cookies = SetCookies::new();
//!     session.save(&mut cookies).into_response_error()?;
//!     Ok((cookies, format!("visit #{count}")))
//! }
//! ```

mod cookies;
mod error;
mod session;

pub use cookies::SetCookies;
pub use error::IntoResponseError;
pub use session::load_or_new;

// Re-export the core crate so applications need a single dependency
pub use cookie_session;
