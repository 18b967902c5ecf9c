pub mod storage;

pub use storage::InMemoryRegistry;
