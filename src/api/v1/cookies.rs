use crate::domain_model::RefreshTokenId;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use warp::http::HeaderMap;
use warp::http::header::COOKIE;

pub const REFRESH_COOKIE_NAME: &str = "RefreshToken_Id";

/// Cookie carrying the refresh handle back to the client after issuance.
pub fn refresh_cookie(id: &RefreshTokenId, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, id.as_str().to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Removal cookie sent on logout.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// The refresh handle from the request's `Cookie` headers, `None` if no such
/// cookie was sent. Bytes that are not valid UTF-8 are replaced rather than
/// dropped, so a garbled handle still reaches the store and matches nothing.
pub fn refresh_id_from_headers(headers: &HeaderMap) -> Option<RefreshTokenId> {
    headers
        .get_all(COOKIE)
        .iter()
        .flat_map(|value| {
            let raw = String::from_utf8_lossy(value.as_bytes()).into_owned();
            Cookie::split_parse(raw)
                .filter_map(Result::ok)
                .collect::<Vec<_>>()
        })
        .find(|cookie| cookie.name() == REFRESH_COOKIE_NAME)
        .map(|cookie| RefreshTokenId(cookie.value().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::http::HeaderValue;

    fn headers(values: &[&[u8]]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for value in values {
            map.append(COOKIE, HeaderValue::from_bytes(value).unwrap());
        }
        map
    }

    #[test]
    fn finds_refresh_id_among_other_cookies() {
        let map = headers(&[b"theme=dark; RefreshToken_Id=abc123; lang=ko".as_slice()]);
        assert_eq!(refresh_id_from_headers(&map), Some(RefreshTokenId::from("abc123")));

        let map = headers(&[b"theme=dark".as_slice(), b"RefreshToken_Id=xyz".as_slice()]);
        assert_eq!(refresh_id_from_headers(&map), Some(RefreshTokenId::from("xyz")));
    }

    #[test]
    fn no_refresh_cookie_is_none() {
        assert_eq!(refresh_id_from_headers(&HeaderMap::new()), None);
        assert_eq!(refresh_id_from_headers(&headers(&[b"theme=dark".as_slice()])), None);
    }

    #[test]
    fn non_ascii_refresh_cookie_is_kept() {
        let map = headers(&["RefreshToken_Id=가짜".as_bytes()]);
        assert_eq!(refresh_id_from_headers(&map), Some(RefreshTokenId::from("가짜")));

        let map = headers(&[b"RefreshToken_Id=\xff\xfe".as_slice()]);
        let id = refresh_id_from_headers(&map).unwrap();
        assert!(!id.as_str().is_empty());
    }

    #[test]
    fn refresh_cookie_is_http_only() {
        let cookie = refresh_cookie(
            &RefreshTokenId::from("abc"),
            chrono::Duration::days(14),
            true,
        );
        let header = cookie.to_string();
        assert!(header.starts_with("RefreshToken_Id=abc"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
        assert!(header.contains("Max-Age=1209600"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let header = clear_refresh_cookie(false).to_string();
        assert!(header.starts_with("RefreshToken_Id="));
        assert!(header.contains("Max-Age=0"));
        assert!(!header.contains("Secure"));
    }
}
