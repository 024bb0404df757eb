pub mod repository;
pub mod sqlite;
pub mod state;

pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use state::StateStore;
