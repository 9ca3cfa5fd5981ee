pub mod store;

pub use store::{BoundedStore, InMemoryStore, KeyValueStore};

#[cfg(test)]
pub use store::{SlowStore, UnavailableStore};
