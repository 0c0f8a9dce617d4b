//! mecha-core - Core types and traits for the mecha API client.

pub mod credentials;
pub mod error;
pub mod memory;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::{ApiError, AuthError, Error, ErrorKind, FieldErrors};
pub use memory::MemoryStore;
pub use tokens::{AccessToken, CredentialPair, RefreshToken};
pub use traits::{
    Body, FilePart, KeyValueStore, LoginRedirect, Method, PreparedRequest, RawResponse, Transport,
};
pub use types::{ApiUrl, Payload, QueryParams, QueryValue};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
