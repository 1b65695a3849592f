mod cookie_store;
mod traits;

pub use cookie_store::CookieStore;
pub use traits::Store;
