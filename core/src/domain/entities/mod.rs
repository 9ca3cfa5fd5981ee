//! Domain entities representing core business objects.

pub mod identity;
pub mod token;


// Re-export commonly used types
pub use identity::Identity;
pub use token::{
    Claims, RefreshRecord, TokenPair,
    BLACKLIST_KEY_PREFIX, BLACKLIST_SENTINEL, REFRESH_INDEX_KEY_PREFIX, REFRESH_KEY_PREFIX,
};
