//! Core value types.

mod api_url;

pub use api_url::{ApiUrl, PRODUCTION_API_URL};
