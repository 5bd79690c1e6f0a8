use crate::server::{ServerError, SessionSettings};
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::Cookie;
use std::sync::Arc;
use time::UtcDateTime;
use tracing::debug;
use yatube_common::model::{
    auth::{SessionToken, SessionTokenHash},
    user::User,
};
use yatube_db::client::DbClient;

pub const SESSION_COOKIE: &str = "session";

/// The logged-in user of a request.
///
/// As a required extractor it rejects anonymous requests with a redirect to
/// the login page; as `Option<AuthenticatedUser>` it never rejects for a
/// missing or stale session.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedUser {
    user: User,
    token_hash: SessionTokenHash,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn into_user(self) -> User {
        self.user
    }

    #[must_use]
    pub fn token_hash(&self) -> &SessionTokenHash {
        &self.token_hash
    }

    async fn from_session<S>(parts: &mut Parts, state: &S) -> Result<Option<Self>, ServerError>
    where
        Arc<DbClient>: FromRef<S>,
        S: Send + Sync,
    {
        let cookies = match <TypedHeader<Cookie> as FromRequestParts<S>>::from_request_parts(
            parts, state,
        )
        .await
        {
            Ok(TypedHeader(cookies)) => cookies,
            Err(rejection) if rejection.is_missing() => return Ok(None),
            Err(rejection) => return Err(ServerError::InvalidCookieHeader(rejection)),
        };

        let Some(raw_token) = cookies.get(SESSION_COOKIE) else {
            return Ok(None);
        };

        let token: SessionToken = match raw_token.parse() {
            Ok(token) => token,
            Err(err) => {
                debug!(error = %err, "Ignoring malformed session cookie");
                return Ok(None);
            }
        };

        let token_hash = token.hash()?;
        let db = Arc::<DbClient>::from_ref(state);

        let Some(session) = db.fetch_session(&token_hash).await? else {
            return Ok(None);
        };

        if session.user != token.user_id {
            debug!(user = %token.user_id, "Ignoring session of another user");
            return Ok(None);
        }

        if session.is_expired_at(UtcDateTime::now()) {
            db.delete_session(&token_hash).await?;
            debug!(user = %token.user_id, "Deleted expired session");
            return Ok(None);
        }

        let user = db.fetch_user(session.user).await?;

        Ok(user.map(|user| Self { user, token_hash }))
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_owned(), ToString::to_string);

        Self::from_session(parts, state)
            .await?
            .ok_or(ServerError::LoginRequired { next })
    }
}

impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Self::from_session(parts, state).await
    }
}

/// `Set-Cookie` value carrying a freshly issued session token.
#[must_use]
pub fn session_cookie(token: &SessionToken, settings: SessionSettings) -> String {
    let token = token.as_token_str();
    match settings.lifetime {
        Some(lifetime) => format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            lifetime.whole_seconds()
        ),
        None => format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"),
    }
}

/// `Set-Cookie` value that makes the browser drop its session.
#[must_use]
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use crate::server::{
        SessionSettings,
        auth::{expired_session_cookie, session_cookie},
    };
    use time::Duration;
    use yatube_common::{
        model::{Id, auth::SessionToken},
        util::PositiveDuration,
    };

    #[test]
    fn cookie_attributes() {
        let token = SessionToken::generate_random(Id::new(3));

        let cookie = session_cookie(&token, SessionSettings::default());
        assert!(cookie.starts_with(&format!("session={}", token.as_token_str())));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Max-Age"));

        let settings = SessionSettings {
            lifetime: Some(PositiveDuration::new_unchecked(Duration::days(14))),
        };
        assert!(session_cookie(&token, settings).ends_with("Max-Age=1209600"));

        assert!(expired_session_cookie().ends_with("Max-Age=0"));
    }
}
