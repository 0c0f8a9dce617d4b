//! Validated value types.

mod api_url;
mod payload;
mod query;

pub use api_url::ApiUrl;
pub use payload::Payload;
pub use query::{QueryParams, QueryValue};
