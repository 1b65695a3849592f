pub mod mock_browser;

pub use mock_browser::MockBrowser;

use cookie_session::{CookieConfig, CookieStore, KeyPair};

/// Store with the production policy and the given signing keys, primary first
pub fn signing_store(keys: &[&[u8]]) -> CookieStore<String> {
    let pairs: Vec<KeyPair> = keys.iter().map(|k| KeyPair::signing(k.to_vec())).collect();
    CookieStore::new(Some(CookieConfig::production()), &pairs).unwrap()
}
