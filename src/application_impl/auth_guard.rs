//! Request guard: turns a raw `Authorization` header into a [`Subject`].
//!
//! The guard is a plain function so any server can call it before protected
//! handlers; the warp wiring lives in `api::v1::router`.

use crate::application_port::*;
use crate::domain_model::*;

const BEARER: &str = "Bearer ";

/// The token part of `Bearer <token>`, or `None` if the value is not of that shape.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// A blank header counts as absent.
pub fn authenticate(
    authorization: Option<&str>,
    codec: &dyn TokenCodec,
) -> Result<Subject, AuthError> {
    let header = authorization
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::Required)?;
    let token = bearer_token(header).ok_or(AuthError::TokenInvalid)?;
    codec.decode(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtConfig, JwtHs256Codec};
    use chrono::{Duration, Utc};

    fn codec() -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            issuer: "boardsignal.auth".to_string(),
            audience: "boardsignal-client".to_string(),
            access_ttl: Duration::minutes(30),
            signing_key: b"guard-test-key".to_vec(),
        })
    }

    #[test]
    fn missing_header_requires_auth() {
        let codec = codec();
        assert!(matches!(
            authenticate(None, &codec),
            Err(AuthError::Required)
        ));
        assert!(matches!(
            authenticate(Some("   "), &codec),
            Err(AuthError::Required)
        ));
    }

    #[test]
    fn malformed_header_is_invalid() {
        let codec = codec();
        for header in ["WrongToken", "Bearer", "Bearer   ", "Basic dXNlcjpwYXNz", "bearer abc"] {
            assert!(
                matches!(authenticate(Some(header), &codec), Err(AuthError::TokenInvalid)),
                "{header}"
            );
        }
    }

    #[test]
    fn wrong_token_is_invalid() {
        let codec = codec();
        assert!(matches!(
            authenticate(Some("Bearer WrongToken"), &codec),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn valid_bearer_resolves_subject() {
        let codec = codec();
        let subject = Subject::new("232345", Role::User);
        let token = codec.encode(&subject, Utc::now()).unwrap();
        let header = format!("Bearer {}", token.as_str());
        assert_eq!(authenticate(Some(&header), &codec).unwrap(), subject);
    }

    #[test]
    fn bearer_token_extracts_value() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Token abc"), None);
    }
}
