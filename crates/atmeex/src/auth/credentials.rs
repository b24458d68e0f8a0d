//! Login credential set.

use std::fmt;

/// The credential material available for authenticating with the cloud.
///
/// A credential set is immutable for the lifetime of one authenticator.
/// Every field is optional; an absent field simply makes the corresponding
/// login method unavailable. Empty strings are normalized to "absent" at
/// construction, matching the wire convention of the cloud API.
///
/// # Security
///
/// The password and one-time code are never exposed in Debug output to
/// prevent accidental logging.
///
/// # Example
///
/// ```
/// use atmeex::Credentials;
///
/// let creds = Credentials::email_password("alice@example.com", "secret");
/// assert_eq!(creds.email(), Some("alice@example.com"));
/// ```
#[derive(Clone, Default)]
pub struct Credentials {
    email: Option<String>,
    password: Option<String>,
    phone: Option<String>,
    phone_code: Option<String>,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() { None } else { Some(value) }
}

impl Credentials {
    /// A full credential set; empty strings mean "absent".
    ///
    /// Most callers want one of the shape-specific constructors below.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        phone: impl Into<String>,
        phone_code: impl Into<String>,
    ) -> Self {
        Self {
            email: non_empty(email),
            password: non_empty(password),
            phone: non_empty(phone),
            phone_code: non_empty(phone_code),
        }
    }

    /// Credentials for email/password sign-in.
    pub fn email_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: non_empty(email),
            password: non_empty(password),
            ..Self::default()
        }
    }

    /// Credentials for phone + one-time SMS code sign-in.
    ///
    /// The code is single-use: once it has been presented to the cloud,
    /// success or failure, it will not be retried automatically.
    pub fn phone_code(phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone: non_empty(phone),
            phone_code: non_empty(code),
            ..Self::default()
        }
    }

    /// A phone number only, for requesting an SMS code before any sign-in.
    pub fn phone(phone: impl Into<String>) -> Self {
        Self {
            phone: non_empty(phone),
            ..Self::default()
        }
    }

    /// No primary credentials.
    ///
    /// Used for sessions driven entirely by a restored refresh token.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns the configured email, if any.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the configured phone number, if any.
    pub fn phone_number(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub(crate) fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub(crate) fn code(&self) -> Option<&str> {
        self.phone_code.as_deref()
    }

    /// True when both email and password are present.
    pub(crate) fn has_email_password(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }

    /// True when both phone and one-time code are present.
    pub(crate) fn has_phone_code(&self) -> bool {
        self.phone.is_some() && self.phone_code.is_some()
    }
}

// Intentionally hide secrets in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("phone", &self.phone)
            .field("phone_code", &self.phone_code.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_password_and_code() {
        let creds = Credentials::email_password("alice@example.com", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice@example.com"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));

        let creds = Credentials::phone_code("+7(900)123-45-67", "4242");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("4242"));
    }

    #[test]
    fn empty_strings_normalize_to_absent() {
        let creds = Credentials::email_password("alice@example.com", "");
        assert!(!creds.has_email_password());
        assert_eq!(creds.email(), Some("alice@example.com"));

        let creds = Credentials::phone_code("", "");
        assert!(!creds.has_phone_code());
    }

    #[test]
    fn phone_only_has_no_login_method() {
        let creds = Credentials::phone("+7(900)123-45-67");
        assert!(!creds.has_phone_code());
        assert!(!creds.has_email_password());
        assert_eq!(creds.phone_number(), Some("+7(900)123-45-67"));
    }
}
