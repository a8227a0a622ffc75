use super::cookies::clear_refresh_cookie;
use super::error::*;
use crate::application_port::{AuthService, UserService};
use crate::domain_model::{AccessToken, RefreshTokenId, Subject};
use crate::logger::*;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use warp::http::header::SET_COOKIE;
use warp::{self, reject};

fn require_refresh_id(id: Option<RefreshTokenId>) -> Result<RefreshTokenId, warp::Rejection> {
    id.filter(|id| !id.as_str().is_empty())
        .ok_or_else(|| reject::custom(ApiErrorCode::AuthRequired))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReissueResponse {
    pub access_token: AccessToken,
}

pub async fn reissue(
    refresh_id: Option<RefreshTokenId>,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let refresh_id = require_refresh_id(refresh_id)?;
    let access_token = auth_service
        .reissue_access_token(&refresh_id, Utc::now())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ReissueResponse { access_token }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub logout_result: bool,
}

pub async fn logout(
    subject: Subject,
    refresh_id: Option<RefreshTokenId>,
    auth_service: Arc<dyn AuthService>,
    cookie_secure: bool,
) -> Result<impl warp::Reply, warp::Rejection> {
    let refresh_id = require_refresh_id(refresh_id)?;
    let logout_result = auth_service
        .logout(&refresh_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    debug!(user_id = %subject.user_id, logout_result, "logout");

    let reply = warp::reply::json(&LogoutResponse { logout_result });
    Ok(warp::reply::with_header(
        reply,
        SET_COOKIE,
        clear_refresh_cookie(cookie_secure).to_string(),
    ))
}

pub async fn login_user_info(
    subject: Subject,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let profile = user_service
        .profile(&subject.user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&profile))
}
