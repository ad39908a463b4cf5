//! Request extractors

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use flaregate_cloud::Credentials;
use flaregate_cloudflare::api::{AUTH_EMAIL_HEADER, AUTH_KEY_HEADER};
use serde::de::DeserializeOwned;

/// `axum::Json` whose rejections render as `{detail}` with 422
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `axum::extract::Query` with the same rejection shape as [`ApiJson`]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Credentials for this request.
///
/// A complete `X-Auth-Email` / `X-Auth-Key` pair wins and leaves the shared
/// session untouched; otherwise the session's pair is used. Fails with 401
/// before any upstream call when neither is available.
pub struct RequestCredentials(pub Credentials);

impl FromRequestParts<AppState> for RequestCredentials {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(credentials) = header_credentials(&parts.headers)? {
            return Ok(Self(credentials));
        }
        Ok(Self(state.session.require()?))
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn header_credentials(headers: &HeaderMap) -> Result<Option<Credentials>, ApiError> {
    match (
        header_value(headers, AUTH_EMAIL_HEADER),
        header_value(headers, AUTH_KEY_HEADER),
    ) {
        (Some(email), Some(key)) => Ok(Some(Credentials::new(email, key)?)),
        (None, None) => Ok(None),
        _ => Err(ApiError::unauthorized(format!(
            "Both {AUTH_EMAIL_HEADER} and {AUTH_KEY_HEADER} headers are required"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_pair() {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-email", HeaderValue::from_static("ops@example.com"));
        headers.insert("x-auth-key", HeaderValue::from_static("key"));

        let creds = header_credentials(&headers).unwrap().unwrap();
        assert_eq!(creds.identity(), "ops@example.com");
        assert_eq!(creds.secret(), "key");
    }

    #[test]
    fn test_no_headers_falls_back() {
        assert!(header_credentials(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn test_half_pair_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-email", HeaderValue::from_static("ops@example.com"));

        let err = header_credentials(&headers).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
