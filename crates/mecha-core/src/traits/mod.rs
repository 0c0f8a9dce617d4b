//! Core traits at the seams of the client.

mod redirect;
mod store;
mod transport;

pub use redirect::LoginRedirect;
pub use store::KeyValueStore;
pub use transport::{Body, FilePart, Method, PreparedRequest, RawResponse, Transport};
