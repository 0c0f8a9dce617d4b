//! mecha-file - File-backed session storage.

mod store;

pub use store::FileStore;
