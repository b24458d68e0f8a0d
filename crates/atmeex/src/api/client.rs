//! HTTP client for the Atmeex cloud API.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, Request, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, warn};

use super::endpoints::ApiErrorResponse;
use crate::error::{AuthError, Error};
use crate::types::ApiUrl;

/// Total request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Extra attempts after a failed connection, for idempotent requests.
const CONNECT_RETRIES: u32 = 2;

/// HTTP client wrapper applying the cloud API's common policy: shared
/// headers, a bounded request timeout, and a bounded retry on connection
/// failures.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: reqwest::Client,
    base: ApiUrl,
}

impl ApiClient {
    /// Create a new client for the given base URL.
    pub(crate) fn new(base: ApiUrl) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(concat!("atmeex/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self { client, base }
    }

    /// Returns the base URL this client is configured for.
    pub(crate) fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Start building a request against an endpoint path.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.base.endpoint(path))
    }

    /// POST a JSON body to an endpoint path.
    ///
    /// Returns the raw response; the caller owns status interpretation.
    pub(crate) async fn post_json<B>(&self, path: &str, body: &B) -> Result<Response, Error>
    where
        B: Serialize,
    {
        let request = self.request(Method::POST, path).json(body).build()?;
        self.execute(request).await
    }

    /// Execute a request, retrying connection failures a bounded number of
    /// times when the request body can be cloned.
    pub(crate) async fn execute(&self, request: Request) -> Result<Response, Error> {
        let mut attempt = 0;
        loop {
            let Some(this_try) = request.try_clone() else {
                // Streaming bodies cannot be replayed.
                return Ok(self.client.execute(request).await?);
            };
            match self.client.execute(this_try).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_connect() && attempt < CONNECT_RETRIES => {
                    attempt += 1;
                    debug!(attempt, error = %err, "connection failed, retrying");
                    // `request` is untouched; loop and clone again.
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Turn a failed sign-in/refresh response into an [`AuthError::Rejected`],
    /// parsing the error body best-effort for a server message.
    pub(crate) async fn rejection(&self, response: Response) -> AuthError {
        let status = response.status().as_u16();
        let message = match response.json::<ApiErrorResponse>().await {
            Ok(body) => body.message,
            Err(err) => {
                warn!(status, error = %err, "unparseable error response body");
                None
            }
        };
        AuthError::Rejected { status, message }
    }
}
