//! cookie_session - client-side session state in signed cookies
//!
//! Session values live entirely in the browser, inside a cookie that is
//! authenticated with HMAC-SHA256 and optionally encrypted with AES-GCM.
//! The crate is split along three seams:
//!
//! * [`CookieConfig`] and [`build_cookie`] turn a policy into `Set-Cookie`
//!   attributes, including the legacy `Expires` derived from `Max-Age`.
//! * [`Session`] is a typed key/value container bound to the [`Store`] that
//!   created it.
//! * [`Store`] defines the session lifecycle; [`CookieStore`] implements it
//!   on top of an ordered list of [`Codec`]s so keys can be rotated.
//!
//! ```no_run
//! use cookie_session::{CookieConfig, CookieStore, KeyPair, Store};
//! use http::HeaderMap;
//!
//! # fn main() -> Result<(), cookie_session::SessionError> {
//! let keys = [KeyPair::generate(true).map_err(|e| cookie_session::SessionError::Config(e.to_string()))?];
//! let store: CookieStore<String> = CookieStore::new(Some(CookieConfig::production()), &keys)?;
//!
//! let mut session = store.new_session("sess");
//! session.set("uid", "42".to_string());
//!
//! let mut response_headers = HeaderMap::new();
//! session.save(&mut response_headers)?;
//! # Ok(())
//! # }
//! ```

mod codec;
mod config;
mod cookie;
mod errors;
mod session;
mod store;
mod transport;
mod utils;

pub use codec::{
    Codec, CodecError, DEFAULT_MAX_AGE_SECS, DEFAULT_MAX_LENGTH, GENERATED_BLOCK_KEY_LEN,
    GENERATED_HASH_KEY_LEN, KeyPair, SecureCookie, codecs_from_pairs, decode_multi, encode_multi,
    generate_key,
};
pub use config::{CookieConfig, DEFAULT_MAX_AGE, keys_from_env};
pub use cookie::{Cookie, SameSite, build_cookie, cookie_expires};
pub use errors::SessionError;
pub use session::Session;
pub use store::{CookieStore, Store};
pub use transport::{CookieSink, CookieSource};
