//! API base URL type.

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Base URL of the production Atmeex cloud API.
pub const PRODUCTION_API_URL: &str = "https://api.atmeex.ru";

/// A validated Atmeex cloud base URL.
///
/// This type ensures the URL is absolute, uses HTTPS (or HTTP for
/// localhost, which test servers rely on), and is normalized for endpoint
/// construction.
///
/// # Example
///
/// ```
/// use atmeex::ApiUrl;
///
/// let api = ApiUrl::new("https://api.atmeex.ru").unwrap();
/// assert_eq!(api.endpoint("/auth/signin"),
///            "https://api.atmeex.ru/auth/signin");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute, carries a non-HTTP
    /// scheme, or uses plain HTTP for a non-local host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slash
        let normalized = if url.path() == "/" {
            let mut u = url.clone();
            u.set_path("");
            u
        } else {
            url
        };

        Ok(Self(normalized))
    }

    /// Returns the absolute URL for an endpoint path such as `/auth/signin`.
    pub fn endpoint(&self, path: &str) -> String {
        // The url crate always adds a trailing slash to root paths, so trim
        // before joining.
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}{}", base, path)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "URL must be absolute".to_string(),
            }
            .into());
        }

        match url.scheme() {
            "https" => Ok(()),
            "http" => {
                let host = url.host_str().unwrap_or("");
                if host == "localhost" || host == "127.0.0.1" || host == "[::1]" {
                    Ok(())
                } else {
                    Err(InvalidInputError::ApiUrl {
                        value: original.to_string(),
                        reason: "plain HTTP is only allowed for localhost".to_string(),
                    }
                    .into())
                }
            }
            other => Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }
            .into()),
        }
    }
}

impl Default for ApiUrl {
    /// The production cloud API.
    fn default() -> Self {
        Self::new(PRODUCTION_API_URL).expect("production API URL is valid")
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
