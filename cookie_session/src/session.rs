use std::collections::HashMap;
use std::fmt;

use crate::errors::SessionError;
use crate::store::Store;
use crate::transport::CookieSink;

/// Named bundle of per-request state persisted through a [`Store`].
///
/// The session borrows the store that created it; that borrow is only used
/// by [`Session::save`] and [`Session::destroy`].
pub struct Session<'s, V> {
    name: String,
    values: HashMap<String, V>,
    store: &'s dyn Store<V>,
}

impl<'s, V> Session<'s, V> {
    /// Create an empty session bound to `store`
    pub fn new(store: &'s dyn Store<V>, name: impl Into<String>) -> Self {
        Self::with_values(store, name, HashMap::new())
    }

    pub(crate) fn with_values(
        store: &'s dyn Store<V>,
        name: impl Into<String>,
        values: HashMap<String, V>,
    ) -> Self {
        Self {
            name: name.into(),
            values,
            store,
        }
    }

    /// Session name, also used as the cookie name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or overwrite a value
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.values.insert(key.into(), value);
    }

    /// Value for `key`, or `V::default()` when absent.
    ///
    /// Use [`Session::get_ok`] when absence must be told apart from a
    /// default value.
    pub fn get(&self, key: &str) -> V
    where
        V: Clone + Default,
    {
        self.values.get(key).cloned().unwrap_or_default()
    }

    pub fn get_ok(&self, key: &str) -> Option<&V> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.values.remove(key)
    }

    pub fn values(&self) -> &HashMap<String, V> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut HashMap<String, V> {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Persist the session, same as `store.save(sink, &session)`
    pub fn save(&self, sink: &mut dyn CookieSink) -> Result<(), SessionError> {
        self.store.save(sink, self)
    }

    /// Expire the session, same as `store.destroy(sink, session.name())`
    pub fn destroy(&self, sink: &mut dyn CookieSink) {
        self.store.destroy(sink, &self.name)
    }
}

impl<V: fmt::Debug> fmt::Debug for Session<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
