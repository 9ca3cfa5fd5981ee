pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod bounded;
pub mod memory;

pub use bounded::BoundedStore;
pub use memory::InMemoryStore;
pub use r#trait::KeyValueStore;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::{SlowStore, UnavailableStore};
