use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use cliptube_core::UserData;

use crate::{context::ServerContext, errors::ServerError};

/// The authenticated user of a request, resolved from the access token
pub struct Session {
    pub user: UserData,
}

/// Pulls the access token out of the Authorization header,
/// falling back to the accessToken cookie.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|x| x.to_str().ok())
        .and_then(|x| {
            let mut split = x.split_ascii_whitespace();

            match (split.next(), split.next()) {
                (Some("Bearer"), Some(token)) => Some(token.to_string()),
                _ => None,
            }
        });

    let from_cookie = || {
        parts
            .headers
            .get(header::COOKIE)
            .and_then(|x| x.to_str().ok())
            .and_then(|cookies| {
                cookies
                    .split(';')
                    .map(str::trim)
                    .find_map(|pair| pair.strip_prefix("accessToken="))
                    .map(str::to_string)
            })
    };

    from_header.or_else(from_cookie)
}

#[async_trait]
impl FromRequestParts<ServerContext> for Session {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);

        let token = token_from_parts(parts)
            .ok_or_else(|| ServerError::Unauthorized("Missing access token".to_string()))?;

        let user = context.app.auth.session(&token).await?;

        Ok(Self { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(name: header::HeaderName, value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(name, value)
            .body(())
            .expect("request builds")
            .into_parts();

        parts
    }

    #[test]
    fn bearer_header_is_preferred() {
        let parts = parts_with(header::AUTHORIZATION, "Bearer abc123");
        assert_eq!(token_from_parts(&parts), Some("abc123".to_string()));
    }

    #[test]
    fn cookie_is_the_fallback() {
        let parts = parts_with(header::COOKIE, "theme=dark; accessToken=xyz; lang=en");
        assert_eq!(token_from_parts(&parts), Some("xyz".to_string()));
    }

    #[test]
    fn malformed_authorization_is_ignored() {
        let parts = parts_with(header::AUTHORIZATION, "Basic abc123");
        assert_eq!(token_from_parts(&parts), None);
    }
}
