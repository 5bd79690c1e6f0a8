use crate::server::routes::auth::LoginPath;
use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{FormRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use axum_extra::{routing::TypedPath, typed_header::TypedHeaderRejection};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::{fmt::Display, sync::Arc};
use thiserror::Error;
use tracing::{debug, error};
use yatube_common::{
    model::{
        Id,
        auth::{PasswordHashError, SessionTokenHashError},
        post::PostMarker,
    },
    util::PositiveDuration,
};
use yatube_db::client::{DbClient, DbError};

pub mod auth;
mod extract;
mod routes;
mod views;

pub type ServerRouter = Router<ServerState>;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct SessionSettings {
    pub lifetime: Option<PositiveDuration>,
}

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    pub session_settings: SessionSettings,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

/// Characters of a `next` path left readable in the login redirect.
const NEXT_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[must_use]
pub fn login_url(next: &str) -> String {
    format!(
        "{}?next={}",
        LoginPath::PATH,
        utf8_percent_encode(next, NEXT_PATH)
    )
}

/// A `302 Found` redirect.
pub fn found(location: impl Display) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query string rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming form rejected: {0}")]
    FormRejection(#[from] FormRejection),
    #[error("Cookie header was invalid: {0}")]
    InvalidCookieHeader(TypedHeaderRejection),
    #[error("The session token could not be hashed: {0}")]
    SessionTokenHash(#[from] SessionTokenHashError),
    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("User with handle {0} was not found.")]
    UserByHandleNotFound(String),
    #[error("Group with slug {0} was not found.")]
    GroupBySlugNotFound(String),
    #[error("Login required to access {next}")]
    LoginRequired { next: String },
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::UserByHandleNotFound(_)
            | ServerError::GroupBySlugNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::LoginRequired { .. } => StatusCode::FOUND,
            ServerError::QueryRejection(_)
            | ServerError::FormRejection(_)
            | ServerError::InvalidCookieHeader(_) => StatusCode::BAD_REQUEST,
            ServerError::SessionTokenHash(_)
            | ServerError::PasswordHash(_)
            | ServerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let ServerError::LoginRequired { next } = &self {
            debug!(%next, "Redirecting anonymous user to login");
            return found(login_url(next));
        }

        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        (status, views::error::error_page(status)).into_response()
    }
}
