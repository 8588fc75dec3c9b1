// Adapters layer: concrete implementations of the domain ports (stores, file storage) and the HTTP surface.

pub mod http;
pub mod local;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use local::LocalStorage;
pub use memory::{Dataset, MemoryStore};
pub use sqlite::SqliteStore;
