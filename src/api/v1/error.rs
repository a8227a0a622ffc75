use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        *code
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else {
        warn!("Unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let json = warp::reply::json(&ApiError {
        message: code.to_string(),
        code,
    });
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub code: ApiErrorCode,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    #[error("Authentication is required")]
    AuthRequired,
    #[error("Access token is invalid or expired")]
    AuthTokenInvalid,
    #[error("Refresh token is invalid or expired")]
    AuthRefreshInvalid,
    #[error("User not found")]
    UserNotFound,
    #[error("Resource not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::AuthRequired
            | ApiErrorCode::AuthTokenInvalid
            | ApiErrorCode::AuthRefreshInvalid => StatusCode::UNAUTHORIZED,
            ApiErrorCode::UserNotFound | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Required => ApiErrorCode::AuthRequired,
            AuthError::TokenInvalid => ApiErrorCode::AuthTokenInvalid,
            AuthError::RefreshInvalid => ApiErrorCode::AuthRefreshInvalid,
            AuthError::UserNotFound => ApiErrorCode::UserNotFound,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_keep_their_code() {
        for error in [
            AuthError::Required,
            AuthError::TokenInvalid,
            AuthError::RefreshInvalid,
        ] {
            let expected = error.code();
            let code = ApiErrorCode::from(error);
            assert_eq!(code.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(serde_json::to_value(code).unwrap(), expected);
        }
    }

    #[test]
    fn store_faults_are_not_auth_failures() {
        let code = ApiErrorCode::from(AuthError::Store("connection refused".to_string()));
        assert_eq!(code, ApiErrorCode::InternalError);
        assert_eq!(code.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
