use super::cookies::refresh_id_from_headers;
use super::error::*;
use super::handler;
use crate::application_port::{AuthError, AuthService};
use crate::domain_model::{RefreshTokenId, Subject};
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::HeaderMap;
use warp::http::header::AUTHORIZATION;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // Authorization may carry an expired token here; it is not verified.
    let reissue = warp::path("auth")
        .and(warp::path("reissue"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_refresh_id())
        .and(with(server.auth_service.clone()))
        .and_then(handler::reissue);

    let logout = warp::path("auth")
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_verification(server.auth_service.clone()))
        .and(with_refresh_id())
        .and(with(server.auth_service.clone()))
        .and(with_value(server.cookie_secure))
        .and_then(handler::logout);

    let login_user_info = warp::path("auth")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.user_service.clone()))
        .and_then(handler::login_user_info);

    reissue.or(logout).or(login_user_info)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_value<T>(value: T) -> impl Filter<Extract = (T,), Error = Infallible> + Clone
where
    T: Clone + Send + Sync + 'static,
{
    warp::any().map(move || value.clone())
}

/// Guard filter: resolves the `Authorization` header into a [`Subject`] or
/// rejects with the matching auth code. A value that is not visible ASCII is
/// a malformed credential, not a missing one.
pub fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (Subject,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let auth_service = auth_service.clone();
        async move {
            headers
                .get(AUTHORIZATION)
                .map(|value| value.to_str().map_err(|_| AuthError::TokenInvalid))
                .transpose()
                .and_then(|header| auth_service.authenticate(header))
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}

fn with_refresh_id() -> impl Filter<Extract = (Option<RefreshTokenId>,), Error = Infallible> + Clone
{
    warp::header::headers_cloned().map(|headers: HeaderMap| refresh_id_from_headers(&headers))
}
