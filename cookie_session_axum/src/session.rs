use cookie_session::{CookieSource, Session, SessionError, Store};

/// Load the named session, starting an empty one when the request has none.
///
/// Only a missing cookie yields a fresh session. A cookie that fails to
/// verify is reported as [`SessionError::Decode`] so the caller decides how
/// to treat a possibly forged request.
pub fn load_or_new<'s, V, S>(
    store: &'s S,
    source: &dyn CookieSource,
    name: &str,
) -> Result<Session<'s, V>, SessionError>
where
    S: Store<V> + ?Sized,
{
    match store.get(source, name) {
        Err(SessionError::NotFound(_)) => {
            tracing::debug!(name, "Starting new session");
            Ok(store.new_session(name))
        }
        result => result,
    }
}
