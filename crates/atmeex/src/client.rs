//! High-level cloud client.

use reqwest::Method;
use tracing::{debug, instrument, warn};

use crate::auth::{Authenticator, Credentials};
use crate::error::{AuthError, Error};
use crate::types::ApiUrl;

/// Client for the Atmeex cloud API.
///
/// Owns an [`Authenticator`] and exposes the small collaborator surface
/// around it: device listing, SMS code requests, and session persistence
/// hooks. All requests go through the authenticator's envelope, so tokens
/// may change silently inside any call; persist via
/// [`access_token`](Self::access_token) / [`refresh_token`](Self::refresh_token)
/// afterwards.
///
/// # Example
///
/// ```no_run
/// use atmeex::{AtmeexClient, Credentials};
///
/// # async fn example() -> Result<(), atmeex::Error> {
/// let client = AtmeexClient::new(Credentials::email_password(
///     "alice@example.com",
///     "app-password",
/// ));
/// let devices = client.get_devices().await?;
/// println!("{} devices", devices.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AtmeexClient {
    auth: Authenticator,
}

impl AtmeexClient {
    /// Create a client against the production cloud API.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(ApiUrl::default(), credentials)
    }

    /// Create a client against a specific base URL.
    pub fn with_base_url(base: ApiUrl, credentials: Credentials) -> Self {
        Self {
            auth: Authenticator::new(base, credentials),
        }
    }

    /// Create a client seeded with previously persisted tokens.
    pub fn from_persisted(
        base: ApiUrl,
        credentials: Credentials,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            auth: Authenticator::from_persisted(base, credentials, access_token, refresh_token),
        }
    }

    /// Returns the underlying authenticator.
    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// List the devices registered to the account.
    ///
    /// Authentication failures propagate; a well-formed response whose
    /// body is not a device listing yields an empty list, matching the
    /// cloud's behavior for accounts without devices.
    #[instrument(skip(self))]
    pub async fn get_devices(&self) -> Result<Vec<serde_json::Value>, Error> {
        let request = self.auth.request(Method::GET, "/devices").build()?;
        let response = self.auth.authorize(request).await?;
        let status = response.status();

        match response.json::<Vec<serde_json::Value>>().await {
            Ok(devices) => {
                debug!(count = devices.len(), "device listing fetched");
                Ok(devices)
            }
            Err(err) => {
                warn!(status = status.as_u16(), error = %err, "malformed device listing");
                Ok(Vec::new())
            }
        }
    }

    /// Ask the cloud to deliver a one-time sign-in code over SMS.
    ///
    /// Uses the configured phone number when `phone` is `None`.
    #[instrument(skip(self))]
    pub async fn request_sms_code(&self, phone: Option<&str>) -> Result<(), Error> {
        let phone = phone
            .or_else(|| self.auth.credentials().phone_number())
            .ok_or(AuthError::MissingCredentials {
                operation: "SMS code request",
            })?;
        self.auth.request_one_time_code(phone).await
    }

    /// Seed the session with previously persisted tokens.
    ///
    /// Empty arguments leave the corresponding token untouched.
    pub async fn restore_tokens(&self, access_token: &str, refresh_token: &str) {
        self.auth.restore_tokens(access_token, refresh_token).await;
    }

    /// The current access token, if a session exists.
    pub async fn access_token(&self) -> Option<String> {
        self.auth.access_token().await
    }

    /// The current refresh token, if a session exists.
    pub async fn refresh_token(&self) -> Option<String> {
        self.auth.refresh_token().await
    }
}
