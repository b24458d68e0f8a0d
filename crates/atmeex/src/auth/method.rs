//! Credential selection policy.
//!
//! Given a snapshot of the configured credentials and the current session
//! state, these functions decide which login method to attempt. The
//! priority orders are fixed: refresh is cheapest, the phone code is
//! one-shot, email/password is the durable fallback.

use super::credentials::Credentials;
use crate::error::AuthError;

/// A login method accepted by the cloud sign-in endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    /// Exchange the stored refresh token for a new token pair.
    RefreshToken,
    /// Exchange a phone number plus one-time SMS code.
    PhoneCode,
    /// Sign in with email and password.
    EmailPassword,
}

/// Priority order for initial authentication.
const INITIAL_AUTH: &[LoginMethod] = &[
    LoginMethod::RefreshToken,
    LoginMethod::PhoneCode,
    LoginMethod::EmailPassword,
];

/// Fallback order when a refresh attempt itself comes back unauthorized.
/// The one-time phone code is deliberately excluded: it must never be
/// replayed once presented to the cloud.
const REFRESH_FALLBACK: &[LoginMethod] = &[LoginMethod::EmailPassword];

fn available(method: LoginMethod, creds: &Credentials, has_refresh_token: bool) -> bool {
    match method {
        LoginMethod::RefreshToken => has_refresh_token,
        LoginMethod::PhoneCode => creds.has_phone_code(),
        LoginMethod::EmailPassword => creds.has_email_password(),
    }
}

fn select(
    table: &[LoginMethod],
    creds: &Credentials,
    has_refresh_token: bool,
) -> Option<LoginMethod> {
    table
        .iter()
        .copied()
        .find(|&m| available(m, creds, has_refresh_token))
}

/// Pick the login method for initial authentication.
///
/// `has_refresh_token` reflects the session tokens held by the
/// authenticator, since a refresh token may have been restored or acquired
/// after construction.
pub(crate) fn select_initial(
    creds: &Credentials,
    has_refresh_token: bool,
) -> Result<LoginMethod, AuthError> {
    select(INITIAL_AUTH, creds, has_refresh_token).ok_or(AuthError::MissingCredentials {
        operation: "sign-in",
    })
}

/// Pick the fallback method after the cloud rejected a refresh attempt.
pub(crate) fn select_refresh_fallback(creds: &Credentials) -> Result<LoginMethod, AuthError> {
    select(REFRESH_FALLBACK, creds, false).ok_or(AuthError::MissingCredentials {
        operation: "refresh fallback",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_creds() -> Credentials {
        Credentials::new("alice@example.com", "secret", "+7(900)123-45-67", "4242")
    }

    #[test]
    fn refresh_token_wins_when_held() {
        assert_eq!(
            select_initial(&full_creds(), true).unwrap(),
            LoginMethod::RefreshToken
        );
    }

    #[test]
    fn phone_code_beats_email_password() {
        assert_eq!(
            select_initial(&full_creds(), false).unwrap(),
            LoginMethod::PhoneCode
        );
    }

    #[test]
    fn email_password_is_the_last_resort() {
        let creds = Credentials::email_password("alice@example.com", "secret");
        assert_eq!(
            select_initial(&creds, false).unwrap(),
            LoginMethod::EmailPassword
        );
    }

    #[test]
    fn no_credentials_is_a_configuration_error() {
        let result = select_initial(&Credentials::none(), false);
        assert!(matches!(
            result,
            Err(AuthError::MissingCredentials { .. })
        ));
    }

    #[test]
    fn refresh_fallback_never_selects_phone_code() {
        let creds = Credentials::phone_code("+7(900)123-45-67", "4242");
        assert!(matches!(
            select_refresh_fallback(&creds),
            Err(AuthError::MissingCredentials { .. })
        ));
    }

    #[test]
    fn refresh_fallback_selects_email_password() {
        let creds = Credentials::email_password("alice@example.com", "secret");
        assert_eq!(
            select_refresh_fallback(&creds).unwrap(),
            LoginMethod::EmailPassword
        );
    }
}
