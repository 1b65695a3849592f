use crate::errors::SessionError;
use crate::session::Session;
use crate::transport::{CookieSink, CookieSource};

/// Creates, reads, writes and expires [`Session`]s.
///
/// A store holds no per-request state: the request and the response are
/// passed into every call, so one store can serve concurrent handlers.
pub trait Store<V>: Send + Sync {
    /// A fresh, empty session bound to this store
    fn new_session(&self, name: &str) -> Session<'_, V>;

    /// Load the named session from the request.
    ///
    /// Fails with [`SessionError::NotFound`] when the request has no such
    /// cookie and [`SessionError::Decode`] when the cookie does not verify.
    fn get(&self, source: &dyn CookieSource, name: &str) -> Result<Session<'_, V>, SessionError>;

    /// Write the session to the response as exactly one `Set-Cookie` header.
    ///
    /// Nothing is written when encoding fails.
    fn save(&self, sink: &mut dyn CookieSink, session: &Session<'_, V>)
    -> Result<(), SessionError>;

    /// Write one `Set-Cookie` header that expires the named session
    fn destroy(&self, sink: &mut dyn CookieSink, name: &str);
}
