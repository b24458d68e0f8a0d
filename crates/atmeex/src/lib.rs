//! atmeex - Atmeex Cloud Client Library
//!
//! This library authenticates requests against the Atmeex cloud API using
//! one of several mutually exclusive login methods (stored refresh token,
//! phone + one-time SMS code, email + password), transparently refreshes
//! expired sessions, and retries a request exactly once after
//! re-authentication.
//!
//! # Example
//!
//! ```no_run
//! use atmeex::{AtmeexClient, Credentials};
//!
//! # async fn example() -> Result<(), atmeex::Error> {
//! // Request an SMS code, then sign in with it.
//! let client = AtmeexClient::new(Credentials::phone("+7(900)123-45-67"));
//! client.request_sms_code(None).await?;
//!
//! let client = AtmeexClient::new(Credentials::phone_code("+7(900)123-45-67", "4242"));
//! let devices = client.get_devices().await?;
//!
//! // Persist the session for next time.
//! let access = client.access_token().await;
//! let refresh = client.refresh_token().await;
//! # let _ = (devices, access, refresh);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{Authenticator, Credentials, LoginMethod};
pub use client::AtmeexClient;
pub use error::{AuthError, Error, InvalidInputError, TransportError};
pub use types::{ApiUrl, PRODUCTION_API_URL};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
