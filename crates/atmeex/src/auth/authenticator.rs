//! The authentication envelope around every outbound cloud request.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, Response, StatusCode};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use crate::api::{ApiClient, SIGN_IN, SIGN_UP, SignInRequest, SignUpRequest, TokenResponse};
use crate::error::{AuthError, Error, InvalidInputError};
use crate::types::ApiUrl;

use super::credentials::Credentials;
use super::method::{self, LoginMethod};
use super::tokens::{AccessToken, RefreshToken};

/// Owns the session token pair and wraps outbound requests with the
/// authentication protocol: attach the bearer token, detect expiry,
/// refresh, and retry exactly once.
///
/// # Thread Safety
///
/// Authenticators are cheap to clone (internal `Arc`) and safe to share
/// across concurrent in-flight requests. Token refresh is single-flight:
/// concurrent expiries coalesce into one remote refresh whose result all
/// waiters share.
///
/// # Example
///
/// ```no_run
/// use atmeex::{ApiUrl, Authenticator, Credentials};
///
/// # async fn example() -> Result<(), atmeex::Error> {
/// let auth = Authenticator::new(ApiUrl::default(), Credentials::email_password(
///     "alice@example.com",
///     "app-password",
/// ));
/// auth.ensure_authenticated().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Authenticator {
    inner: Arc<AuthenticatorInner>,
}

struct AuthenticatorInner {
    api: ApiClient,
    credentials: Credentials,
    tokens: RwLock<SessionTokens>,
    // Single-flight gate: every token acquisition path runs under this
    // lock, so concurrent refreshes collapse into one remote call.
    gate: Mutex<()>,
}

#[derive(Default)]
struct SessionTokens {
    access: Option<AccessToken>,
    refresh: Option<RefreshToken>,
}

impl Authenticator {
    /// Create an authenticator with no session yet.
    ///
    /// The first [`authorize`](Self::authorize) call performs the initial
    /// login chosen by the credential priority order.
    pub fn new(base: ApiUrl, credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(AuthenticatorInner {
                api: ApiClient::new(base),
                credentials,
                tokens: RwLock::new(SessionTokens::default()),
                gate: Mutex::new(()),
            }),
        }
    }

    /// Create an authenticator seeded with previously persisted tokens.
    ///
    /// Empty strings mean "absent". The caller is responsible for the
    /// tokens still being valid; an expired pair simply triggers the usual
    /// refresh path on first use.
    pub fn from_persisted(
        base: ApiUrl,
        credentials: Credentials,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AuthenticatorInner {
                api: ApiClient::new(base),
                credentials,
                tokens: RwLock::new(SessionTokens {
                    access: non_empty_token(access_token).map(AccessToken::new),
                    refresh: non_empty_token(refresh_token).map(RefreshToken::new),
                }),
                gate: Mutex::new(()),
            }),
        }
    }

    /// Returns the credentials this authenticator was configured with.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Start building a request against the configured cloud API.
    ///
    /// The built request is not yet authorized; pass it to
    /// [`authorize`](Self::authorize).
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.inner.api.request(method, path)
    }

    /// Execute a request inside the authentication envelope.
    ///
    /// Ensures a session exists, attaches `Authorization: Bearer <token>`,
    /// and executes the request. A 401 response triggers one refresh and
    /// one retry; whatever the final execution returns is handed back
    /// unmodified, including a second 401. Requests whose body cannot be
    /// cloned (streaming) are returned after the first attempt without a
    /// retry.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn authorize(&self, request: Request) -> Result<Response, Error> {
        if self.access_token().await.is_none() {
            self.ensure_authenticated().await?;
        }
        let token = self.access_token().await.ok_or(AuthError::SessionExpired)?;

        let retry = request.try_clone();
        let mut request = request;
        attach_bearer(&mut request, &token)?;

        let response = self.inner.api.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(mut retry) = retry else {
            debug!("401 on non-replayable request, returning response as-is");
            return Ok(response);
        };

        debug!("got 401, refreshing and retrying once");
        self.refresh_stale(&token).await?;
        let token = self.access_token().await.ok_or(AuthError::SessionExpired)?;
        attach_bearer(&mut retry, &token)?;
        self.inner.api.execute(retry).await
    }

    /// Make sure a session exists, performing the initial login if needed.
    pub async fn ensure_authenticated(&self) -> Result<(), Error> {
        let _gate = self.inner.gate.lock().await;
        if self.access_token().await.is_some() {
            return Ok(());
        }
        self.acquire_tokens().await
    }

    /// Obtain a fresh token pair.
    ///
    /// Uses the stored refresh token when one is held; otherwise falls
    /// back to the initial-auth credential priority. A rejected refresh
    /// token falls back to email/password when configured, and surfaces
    /// [`AuthError::SessionExpired`] when not.
    pub async fn refresh(&self) -> Result<(), Error> {
        let _gate = self.inner.gate.lock().await;
        self.acquire_tokens().await
    }

    /// Sign in with the configured email and password.
    #[instrument(skip(self))]
    pub async fn login_with_email_password(&self) -> Result<(), Error> {
        let _gate = self.inner.gate.lock().await;
        self.sign_in(LoginMethod::EmailPassword).await
    }

    /// Sign in with the configured phone number and one-time SMS code.
    ///
    /// The code is consumed by this call regardless of outcome; obtain a
    /// new one via [`request_one_time_code`](Self::request_one_time_code)
    /// before calling again.
    #[instrument(skip(self))]
    pub async fn login_with_phone_code(&self) -> Result<(), Error> {
        let _gate = self.inner.gate.lock().await;
        self.sign_in(LoginMethod::PhoneCode).await
    }

    /// Ask the cloud to deliver a one-time sign-in code over SMS.
    ///
    /// Unauthenticated; does not touch the session tokens.
    #[instrument(skip(self))]
    pub async fn request_one_time_code(&self, phone: &str) -> Result<(), Error> {
        info!("requesting SMS code");
        let body = SignUpRequest::PhoneCode { phone };
        let response = self.inner.api.post_json(SIGN_UP, &body).await?;
        if response.status().is_success() {
            debug!("SMS code request accepted");
            Ok(())
        } else {
            Err(self.inner.api.rejection(response).await.into())
        }
    }

    /// Seed the session with previously persisted tokens.
    ///
    /// Empty arguments leave the corresponding token untouched; this is a
    /// partial restore, never a clear.
    pub async fn restore_tokens(&self, access_token: &str, refresh_token: &str) {
        let mut tokens = self.inner.tokens.write().await;
        if !access_token.is_empty() {
            tokens.access = Some(AccessToken::new(access_token));
        }
        if !refresh_token.is_empty() {
            tokens.refresh = Some(RefreshToken::new(refresh_token));
        }
    }

    /// The current access token, for persistence collaborators.
    ///
    /// Tokens may change silently inside [`authorize`](Self::authorize);
    /// read after every successful call when persisting sessions.
    pub async fn access_token(&self) -> Option<String> {
        let tokens = self.inner.tokens.read().await;
        tokens.access.as_ref().map(|t| t.as_str().to_string())
    }

    /// The current refresh token, for persistence collaborators.
    pub async fn refresh_token(&self) -> Option<String> {
        let tokens = self.inner.tokens.read().await;
        tokens.refresh.as_ref().map(|t| t.as_str().to_string())
    }

    // ------------------------------------------------------------------
    // Internals. Everything below runs under the single-flight gate.
    // ------------------------------------------------------------------

    /// Refresh after observing a 401 with `stale` attached.
    ///
    /// A waiter that acquires the gate after another caller already
    /// refreshed finds a different access token and skips the remote call.
    async fn refresh_stale(&self, stale: &str) -> Result<(), Error> {
        let _gate = self.inner.gate.lock().await;
        if let Some(current) = self.access_token().await {
            if current != stale {
                debug!("token already refreshed by a concurrent caller");
                return Ok(());
            }
        }
        self.acquire_tokens().await
    }

    /// Acquire a token pair: refresh grant when a refresh token is held,
    /// otherwise the highest-priority available credential method.
    async fn acquire_tokens(&self) -> Result<(), Error> {
        if self.refresh_token().await.is_some() {
            return self.sign_in(LoginMethod::RefreshToken).await;
        }
        // No refresh token held, so the priority table cannot pick it.
        let method = method::select_initial(&self.inner.credentials, false)?;
        self.sign_in(method).await
    }

    /// Execute one sign-in grant and store the resulting token pair.
    ///
    /// A rejected refresh grant (401) falls through to the refresh-failure
    /// policy, which never replays the one-shot phone code.
    async fn sign_in(&self, login: LoginMethod) -> Result<(), Error> {
        info!(method = ?login, "signing in");
        let creds = &self.inner.credentials;
        let refresh;
        let body = match login {
            LoginMethod::RefreshToken => {
                refresh = self
                    .refresh_token()
                    .await
                    .ok_or(AuthError::MissingCredentials {
                        operation: "refresh",
                    })?;
                SignInRequest::RefreshToken {
                    refresh_token: &refresh,
                }
            }
            LoginMethod::PhoneCode => SignInRequest::PhoneCode {
                phone: creds
                    .phone_number()
                    .ok_or(AuthError::MissingCredentials { operation: "sign-in" })?,
                phone_code: creds
                    .code()
                    .ok_or(AuthError::MissingCredentials { operation: "sign-in" })?,
            },
            LoginMethod::EmailPassword => SignInRequest::Basic {
                email: creds
                    .email()
                    .ok_or(AuthError::MissingCredentials { operation: "sign-in" })?,
                password: creds
                    .password()
                    .ok_or(AuthError::MissingCredentials { operation: "sign-in" })?,
            },
        };

        let response = self.inner.api.post_json(SIGN_IN, &body).await?;
        let status = response.status();

        if status.is_success() {
            return self.store_tokens(response).await;
        }

        if status == StatusCode::UNAUTHORIZED && login == LoginMethod::RefreshToken {
            info!("refresh token rejected, consulting fallback policy");
            return match method::select_refresh_fallback(creds) {
                Ok(fallback) => Box::pin(self.sign_in(fallback)).await,
                Err(_) => Err(AuthError::SessionExpired.into()),
            };
        }

        Err(self.inner.api.rejection(response).await.into())
    }

    /// Parse a successful sign-in body and overwrite both tokens
    /// atomically. A parse failure leaves the prior pair untouched.
    async fn store_tokens(&self, response: Response) -> Result<(), Error> {
        let body = response.json::<TokenResponse>().await?;
        let mut tokens = self.inner.tokens.write().await;
        tokens.access = Some(AccessToken::new(body.access_token));
        tokens.refresh = Some(RefreshToken::new(body.refresh_token));
        debug!("session tokens updated");
        Ok(())
    }
}

fn non_empty_token(token: impl Into<String>) -> Option<String> {
    let token = token.into();
    if token.is_empty() { None } else { Some(token) }
}

fn attach_bearer(request: &mut Request, token: &str) -> Result<(), Error> {
    let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| InvalidInputError::Token)?;
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("base", self.inner.api.base())
            .field("credentials", &self.inner.credentials)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_authenticator() -> Authenticator {
        Authenticator::new(
            ApiUrl::new("http://127.0.0.1:1").unwrap(),
            Credentials::none(),
        )
    }

    #[tokio::test]
    async fn restore_tokens_is_partial() {
        let auth = test_authenticator();
        auth.restore_tokens("A1", "R1").await;
        assert_eq!(auth.access_token().await.as_deref(), Some("A1"));
        assert_eq!(auth.refresh_token().await.as_deref(), Some("R1"));

        // Empty access token means "keep", not "clear".
        auth.restore_tokens("", "R9").await;
        assert_eq!(auth.access_token().await.as_deref(), Some("A1"));
        assert_eq!(auth.refresh_token().await.as_deref(), Some("R9"));

        // Both empty: no-op.
        auth.restore_tokens("", "").await;
        assert_eq!(auth.access_token().await.as_deref(), Some("A1"));
        assert_eq!(auth.refresh_token().await.as_deref(), Some("R9"));
    }

    #[tokio::test]
    async fn from_persisted_treats_empty_as_absent() {
        let auth = Authenticator::from_persisted(
            ApiUrl::new("http://127.0.0.1:1").unwrap(),
            Credentials::none(),
            "",
            "R0",
        );
        assert!(auth.access_token().await.is_none());
        assert_eq!(auth.refresh_token().await.as_deref(), Some("R0"));
    }

    #[tokio::test]
    async fn debug_output_redacts_tokens() {
        let auth = test_authenticator();
        auth.restore_tokens("super-secret-access", "super-secret-refresh")
            .await;
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn ensure_authenticated_without_credentials_is_a_configuration_error() {
        let auth = test_authenticator();
        let err = auth.ensure_authenticated().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(AuthError::MissingCredentials { .. })
        ));
    }
}
