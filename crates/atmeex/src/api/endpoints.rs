//! Cloud endpoint definitions and request/response bodies.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Sign-in endpoint: all token-issuing grants.
pub(crate) const SIGN_IN: &str = "/auth/signin";

/// Sign-up endpoint: SMS code delivery.
pub(crate) const SIGN_UP: &str = "/auth/signup";

// ============================================================================
// Request/Response Bodies
// ============================================================================

/// Request body for `/auth/signin`.
///
/// The wire format tags each grant with a `grant_type` field; the serde
/// tag mirrors that exactly (`refresh_token`, `basic`, `phone_code`).
///
/// No Debug derive: every variant carries a secret.
#[derive(Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub(crate) enum SignInRequest<'a> {
    RefreshToken { refresh_token: &'a str },
    Basic { email: &'a str, password: &'a str },
    PhoneCode { phone: &'a str, phone_code: &'a str },
}

/// Request body for `/auth/signup`.
#[derive(Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub(crate) enum SignUpRequest<'a> {
    PhoneCode { phone: &'a str },
}

/// Successful response from `/auth/signin`.
///
/// No Debug derive: both fields are bearer secrets.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Error response body, parsed best-effort for diagnostics.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sign_in_grants_carry_the_grant_type_tag() {
        let body = serde_json::to_value(SignInRequest::RefreshToken {
            refresh_token: "R1",
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"grant_type": "refresh_token", "refresh_token": "R1"})
        );

        let body = serde_json::to_value(SignInRequest::Basic {
            email: "alice@example.com",
            password: "secret",
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"grant_type": "basic", "email": "alice@example.com", "password": "secret"})
        );

        let body = serde_json::to_value(SignInRequest::PhoneCode {
            phone: "+7(900)123-45-67",
            phone_code: "4242",
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"grant_type": "phone_code", "phone": "+7(900)123-45-67", "phone_code": "4242"})
        );
    }

    #[test]
    fn sign_up_request_is_a_phone_code_grant() {
        let body = serde_json::to_value(SignUpRequest::PhoneCode {
            phone: "+7(900)123-45-67",
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"grant_type": "phone_code", "phone": "+7(900)123-45-67"})
        );
    }
}
