//! Authentication primitives and session management.
//!
//! The [`Authenticator`] owns the session token pair and wraps every
//! outbound request with the authentication protocol; the credential
//! selection policy in [`method`] decides which login path to take.

mod authenticator;
mod credentials;
mod method;
mod tokens;

pub use authenticator::Authenticator;
pub use credentials::Credentials;
pub use method::LoginMethod;
pub use tokens::{AccessToken, RefreshToken};
