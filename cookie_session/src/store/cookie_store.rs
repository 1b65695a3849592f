use std::fmt;
use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};

use crate::codec::{Codec, KeyPair, codecs_from_pairs, decode_multi, encode_multi};
use crate::config::CookieConfig;
use crate::cookie::build_cookie;
use crate::errors::SessionError;
use crate::session::Session;
use crate::store::Store;
use crate::transport::{CookieSink, CookieSource};

/// Store that keeps the whole session inside a signed, optionally encrypted
/// cookie on the client.
///
/// New cookies are always encoded with the first codec. Every codec is tried
/// in order when reading, so keys can be rotated by prepending a new pair and
/// keeping the old ones until their cookies have expired.
pub struct CookieStore<V> {
    config: CookieConfig,
    codecs: Vec<Box<dyn Codec>>,
    _values: PhantomData<fn() -> V>,
}

impl<V> CookieStore<V> {
    /// Create a store from a cookie policy and key pairs, primary key first.
    ///
    /// `None` selects [`CookieConfig::production`].
    pub fn new(config: Option<CookieConfig>, key_pairs: &[KeyPair]) -> Result<Self, SessionError> {
        let codecs =
            codecs_from_pairs(key_pairs).map_err(|e| SessionError::Config(e.to_string()))?;
        Ok(Self::with_codecs(config, codecs))
    }

    /// Create a store from already constructed codecs, primary codec first
    pub fn with_codecs(config: Option<CookieConfig>, codecs: Vec<Box<dyn Codec>>) -> Self {
        Self {
            config: config.unwrap_or_default(),
            codecs,
            _values: PhantomData,
        }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    pub fn codec_count(&self) -> usize {
        self.codecs.len()
    }
}

impl<V> Store<V> for CookieStore<V>
where
    V: Serialize + DeserializeOwned,
{
    fn new_session(&self, name: &str) -> Session<'_, V> {
        Session::new(self, name)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    fn get(&self, source: &dyn CookieSource, name: &str) -> Result<Session<'_, V>, SessionError> {
        let Some(value) = source.cookie(name) else {
            tracing::debug!("No session cookie in request");
            return Err(SessionError::NotFound(name.to_string()));
        };

        let values = decode_multi(name, value, &self.codecs).map_err(SessionError::Decode)?;
        Ok(Session::with_values(self, name, values))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %session.name()))]
    fn save(
        &self,
        sink: &mut dyn CookieSink,
        session: &Session<'_, V>,
    ) -> Result<(), SessionError> {
        let value = encode_multi(session.name(), session.values(), &self.codecs)
            .map_err(SessionError::Encode)?;

        sink.set_cookie(&build_cookie(session.name(), &value, &self.config))?;
        tracing::debug!(len = value.len(), "Wrote session cookie");
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    fn destroy(&self, sink: &mut dyn CookieSink, name: &str) {
        let cookie = build_cookie(name, "", &self.config.deletion());
        // Same as HTTP servers that skip a Set-Cookie they cannot render
        if let Err(e) = sink.set_cookie(&cookie) {
            tracing::debug!(error = %e, "Deletion cookie dropped");
        }
    }
}

impl<V> fmt::Debug for CookieStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieStore")
            .field("config", &self.config)
            .field("codecs", &self.codecs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, SecureCookie};
    use crate::config::DEFAULT_MAX_AGE;
    use crate::cookie::{Cookie, SameSite};
    use http::HeaderMap;
    use http::header::{COOKIE, SET_COOKIE};
    use std::collections::HashMap;

    fn store(keys: &[&[u8]]) -> CookieStore<String> {
        let pairs: Vec<KeyPair> = keys.iter().map(|k| KeyPair::signing(k.to_vec())).collect();
        CookieStore::new(None, &pairs).unwrap()
    }

    fn request_with(name: &str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, format!("{name}={value}").parse().unwrap());
        headers
    }

    #[test]
    fn test_new_uses_default_config() {
        let store = store(&[b"key"]);
        assert_eq!(store.config(), &CookieConfig::production());
        assert_eq!(store.codec_count(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_keys() {
        let result: Result<CookieStore<String>, _> =
            CookieStore::new(None, &[KeyPair::new(b"hash".to_vec(), Some(vec![0u8; 7]))]);
        assert!(matches!(result, Err(SessionError::Config(_))));

        let result: Result<CookieStore<String>, _> =
            CookieStore::new(None, &[KeyPair::signing(Vec::new())]);
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn test_new_session_is_empty_and_named() {
        let store = store(&[b"key"]);
        let session = store.new_session("sess");
        assert_eq!(session.name(), "sess");
        assert!(session.is_empty());
    }

    #[test]
    fn test_save_writes_exactly_one_cookie() {
        let store = store(&[b"key"]);
        let mut session = store.new_session("sess");
        session.set("uid", "42".to_string());

        let mut sink: Vec<Cookie> = Vec::new();
        store.save(&mut sink, &session).unwrap();

        assert_eq!(sink.len(), 1);
        let cookie = &sink[0];
        assert_eq!(cookie.name, "sess");
        assert!(!cookie.value.is_empty());
        assert_eq!(cookie.max_age, DEFAULT_MAX_AGE);
        assert!(cookie.http_only);
        assert!(cookie.secure);
        assert_eq!(cookie.same_site, Some(SameSite::Strict));
    }

    #[test]
    fn test_save_then_get_roundtrip() {
        let store = store(&[b"key"]);
        let mut session = store.new_session("sess");
        session.set("uid", "42".to_string());
        session.set("theme", "dark".to_string());

        let mut response = HeaderMap::new();
        store.save(&mut response, &session).unwrap();
        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        let cookie = Cookie::parse(set_cookie).unwrap();

        let loaded = store
            .get(&request_with(&cookie.name, &cookie.value), "sess")
            .unwrap();
        assert_eq!(loaded.name(), "sess");
        assert_eq!(loaded.values(), session.values());
    }

    #[test]
    fn test_get_missing_cookie_is_not_found() {
        let store = store(&[b"key"]);
        let err = store.get(&HeaderMap::new(), "sess").unwrap_err();
        assert!(err.is_not_found());

        let err = store
            .get(&request_with("other", "value"), "sess")
            .unwrap_err();
        assert!(matches!(err, SessionError::NotFound(ref n) if n == "sess"));
    }

    #[test]
    fn test_get_garbage_cookie_is_decode_error() {
        let store = store(&[b"key"]);
        let err = store.get(&request_with("sess", "garbage"), "sess").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_get_cookie_for_other_name_is_decode_error() {
        let store = store(&[b"key"]);
        let mut session = store.new_session("first");
        session.set("uid", "42".to_string());
        let mut sink: Vec<Cookie> = Vec::new();
        store.save(&mut sink, &session).unwrap();

        // Same token presented under a different cookie name
        let err = store
            .get(&request_with("second", &sink[0].value), "second")
            .unwrap_err();
        assert!(matches!(err, SessionError::Decode(CodecError::MacInvalid)));
    }

    #[test]
    fn test_get_with_mismatched_value_type_is_decode_error() {
        let numbers: CookieStore<u64> = CookieStore::new(None, &[KeyPair::signing(b"key".to_vec())]).unwrap();
        let strings = store(&[b"key"]);

        let mut session = strings.new_session("sess");
        session.set("uid", "not-a-number".to_string());
        let mut sink: Vec<Cookie> = Vec::new();
        strings.save(&mut sink, &session).unwrap();

        let err = numbers
            .get(&request_with("sess", &sink[0].value), "sess")
            .unwrap_err();
        assert!(matches!(err, SessionError::Decode(CodecError::Deserialize(_))));
    }

    #[test]
    fn test_store_without_codecs() {
        let store: CookieStore<String> = CookieStore::new(None, &[]).unwrap();
        let session = store.new_session("sess");
        let mut sink: Vec<Cookie> = Vec::new();
        assert!(matches!(
            store.save(&mut sink, &session),
            Err(SessionError::Encode(CodecError::NoCodecs))
        ));
        assert!(sink.is_empty());

        assert!(matches!(
            store.get(&request_with("sess", "x"), "sess"),
            Err(SessionError::Decode(CodecError::NoCodecs))
        ));
    }

    #[test]
    fn test_oversized_session_is_encode_error_and_writes_nothing() {
        let store = store(&[b"key"]);
        let mut session = store.new_session("sess");
        session.set("blob", "x".repeat(8192));

        let mut response = HeaderMap::new();
        let err = store.save(&mut response, &session).unwrap_err();
        assert!(matches!(err, SessionError::Encode(CodecError::ValueTooLong(_))));
        assert!(response.is_empty());
    }

    #[test]
    fn test_save_with_invalid_name_is_cookie_error() {
        let store = store(&[b"key"]);
        let session = store.new_session("bad name");
        let mut response = HeaderMap::new();
        assert!(matches!(
            store.save(&mut response, &session),
            Err(SessionError::Cookie(_))
        ));
        assert!(response.is_empty());
    }

    #[test]
    fn test_destroy_writes_expired_cookie_with_scope_only() {
        let config = CookieConfig {
            path: "/app".to_string(),
            domain: "example.com".to_string(),
            ..CookieConfig::production()
        };
        let store: CookieStore<String> =
            CookieStore::new(Some(config), &[KeyPair::signing(b"key".to_vec())]).unwrap();

        let mut sink: Vec<Cookie> = Vec::new();
        store.destroy(&mut sink, "sess");

        assert_eq!(sink.len(), 1);
        let cookie = &sink[0];
        assert_eq!(cookie.name, "sess");
        assert_eq!(cookie.value, "");
        assert_eq!(cookie.path, "/app");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.max_age, -1);
        assert_eq!(cookie.expires, chrono::DateTime::from_timestamp(1, 0));
        assert!(!cookie.secure);
        assert!(!cookie.http_only);
        assert_eq!(cookie.same_site, None);
    }

    #[test]
    fn test_destroy_with_invalid_name_writes_nothing() {
        let store = store(&[b"key"]);
        let mut response = HeaderMap::new();
        store.destroy(&mut response, "bad name");
        assert!(response.is_empty());
    }

    #[test]
    fn test_rotation_reads_old_writes_new() {
        let old_store = store(&[b"old-key"]);
        let mut session = old_store.new_session("sess");
        session.set("uid", "7".to_string());
        let mut sink: Vec<Cookie> = Vec::new();
        old_store.save(&mut sink, &session).unwrap();
        let old_token = sink.remove(0).value;

        let rotated = store(&[b"new-key", b"old-key"]);
        let loaded = rotated.get(&request_with("sess", &old_token), "sess").unwrap();
        assert_eq!(loaded.get("uid"), "7");

        // Re-saving moves the cookie to the new key
        rotated.save(&mut sink, &loaded).unwrap();
        let new_token = &sink[0].value;
        let new_only = store(&[b"new-key"]);
        assert!(new_only.get(&request_with("sess", new_token), "sess").is_ok());
        assert!(old_store.get(&request_with("sess", new_token), "sess").unwrap_err().is_decode());
    }

    #[test]
    fn test_dropped_key_no_longer_verifies() {
        let old_store = store(&[b"old-key"]);
        let session = old_store.new_session("sess");
        let mut sink: Vec<Cookie> = Vec::new();
        old_store.save(&mut sink, &session).unwrap();

        let current_only = store(&[b"new-key"]);
        let err = current_only
            .get(&request_with("sess", &sink[0].value), "sess")
            .unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_with_custom_codec() {
        let codec = SecureCookie::new(b"hash", Some(&[9u8; 32])).unwrap().with_max_age(0);
        let store: CookieStore<HashMap<String, u32>> =
            CookieStore::with_codecs(Some(CookieConfig::debug()), vec![Box::new(codec)]);

        let mut session = store.new_session("prefs");
        session.set("limits", HashMap::from([("daily".to_string(), 10)]));
        let mut sink: Vec<Cookie> = Vec::new();
        session.save(&mut sink).unwrap();
        assert!(!sink[0].secure);

        let loaded = store.get(&request_with("prefs", &sink[0].value), "prefs").unwrap();
        assert_eq!(loaded.get("limits").get("daily"), Some(&10));
    }

    #[test]
    fn test_store_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CookieStore<String>>();
        assert_send_sync::<CookieStore<std::rc::Rc<String>>>();
    }

    #[test]
    fn test_debug_does_not_leak_keys() {
        let store = store(&[b"very-secret-key"]);
        let debug = format!("{store:?}");
        assert!(debug.contains("codecs: 1"));
        assert!(!debug.contains("very-secret-key"));
    }
}
