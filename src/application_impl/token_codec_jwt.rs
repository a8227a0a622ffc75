use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a refresh handle; 32 symbols from a 64-symbol alphabet is 192 bits.
const REFRESH_ID_LEN: usize = 32;

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub signing_key: Vec<u8>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    role: Role,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String,
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is compared against the caller's clock in decode_at
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_audience(&[cfg.audience.clone()]);
        validation.set_issuer(&[cfg.issuer.clone()]);

        JwtHs256Codec {
            encoding_key: EncodingKey::from_secret(&cfg.signing_key),
            decoding_key: DecodingKey::from_secret(&cfg.signing_key),
            validation,
            cfg,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.cfg.access_ttl
    }
}

impl TokenCodec for JwtHs256Codec {
    fn encode(&self, subject: &Subject, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        // claims carry whole seconds; issue at the second so exp never overshoots now + ttl
        let now = now.trunc_subsecs(0);
        let exp_dt = now + self.cfg.access_ttl;
        let claims = AccessClaims {
            sub: subject.user_id.0.clone(),
            role: subject.role,
            exp: exp_dt.timestamp(),
            iat: now.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok(AccessToken(token))
    }

    fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Subject, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::TokenInvalid)?;
        let claims = data.claims;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::TokenInvalid)?;
        if now > expires_at {
            return Err(AuthError::TokenInvalid);
        }
        Ok(Subject::new(claims.sub, claims.role))
    }

    fn new_refresh_id(&self) -> RefreshTokenId {
        RefreshTokenId(nanoid::nanoid!(REFRESH_ID_LEN))
    }
}
