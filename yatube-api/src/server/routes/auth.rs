use crate::server::{
    Result, ServerError, ServerRouter, SessionSettings,
    auth::{AuthenticatedUser, expired_session_cookie, session_cookie},
    extract::{Form, Query},
    found,
    routes::posts::IndexPath,
    views::{
        self,
        auth::{LoginContext, SignupContext},
    },
};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::routing::{RouterExt, TypedPath};
use maud::Markup;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use yatube_common::{
    form::{SignupErrors, SignupForm},
    model::{
        Id,
        auth::{Session, SessionToken, hash_password, verify_password},
        user::{CreateUser, UserMarker},
    },
};
use yatube_db::client::{DbClient, DbError};

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(login_form)
        .typed_post(login)
        .typed_get(signup_form)
        .typed_post(signup)
        .typed_post(logout)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/login/", rejection(ServerError))]
pub struct LoginPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/signup/", rejection(ServerError))]
pub struct SignupPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/logout/", rejection(ServerError))]
pub struct LogoutPath();

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(default)]
struct LoginForm {
    handle: String,
    password: String,
    next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|next| {
        next.starts_with('/')
            && !next.starts_with("//")
            && !next.starts_with("/\\")
            && next.chars().all(|c| c.is_ascii_graphic())
    })
}

async fn start_session(
    db: &DbClient,
    settings: SessionSettings,
    user_id: Id<UserMarker>,
) -> Result<String> {
    let token = SessionToken::generate_random(user_id);
    let session = Session {
        user: user_id,
        token_hash: token.hash()?,
        created_at: time::UtcDateTime::now(),
        expires_after: settings.lifetime,
    };
    db.create_session(&session).await?;

    Ok(session_cookie(&token, settings))
}

async fn login_form(LoginPath(): LoginPath, Query(query): Query<LoginQuery>) -> Markup {
    views::auth::login(&LoginContext {
        handle: String::new(),
        next: query.next,
        failed: false,
    })
}

async fn login(
    LoginPath(): LoginPath,
    State(db): State<Arc<DbClient>>,
    State(settings): State<SessionSettings>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let credentials = db.fetch_credentials(form.handle.trim()).await?;

    let Some(credentials) =
        credentials.filter(|credentials| verify_password(&form.password, &credentials.password_hash))
    else {
        debug!(handle = %form.handle, "Rejected login");
        let context = LoginContext {
            handle: form.handle,
            next: form.next,
            failed: true,
        };
        return Ok(views::auth::login(&context).into_response());
    };

    let cookie = start_session(&db, settings, credentials.user.id).await?;
    info!(user = %credentials.user.id, "User logged in");

    let target = safe_next(form.next.as_deref()).unwrap_or(IndexPath::PATH);
    Ok(([(header::SET_COOKIE, cookie)], found(target)).into_response())
}

async fn signup_form(SignupPath(): SignupPath) -> Markup {
    views::auth::signup(&SignupContext {
        handle: String::new(),
        errors: SignupErrors::default(),
    })
}

async fn signup(
    SignupPath(): SignupPath,
    State(db): State<Arc<DbClient>>,
    State(settings): State<SessionSettings>,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let handle = match form.validate() {
        Ok(handle) => handle,
        Err(errors) => {
            let context = SignupContext {
                handle: form.handle,
                errors,
            };
            return Ok(views::auth::signup(&context).into_response());
        }
    };

    let new_user = CreateUser {
        handle,
        password_hash: hash_password(&form.password)?,
    };

    let user = match db.create_user(&new_user).await {
        Ok(user) => user,
        Err(DbError::HandleTaken(_)) => {
            let context = SignupContext {
                handle: form.handle,
                errors: SignupErrors::handle_taken(),
            };
            return Ok(views::auth::signup(&context).into_response());
        }
        Err(err) => return Err(err.into()),
    };

    info!(user = %user.id, handle = %user.handle, "User signed up");

    let cookie = start_session(&db, settings, user.id).await?;
    Ok(([(header::SET_COOKIE, cookie)], found(IndexPath::PATH)).into_response())
}

async fn logout(
    LogoutPath(): LogoutPath,
    State(db): State<Arc<DbClient>>,
    viewer: Option<AuthenticatedUser>,
) -> Result<Response> {
    if let Some(viewer) = viewer {
        db.delete_session(viewer.token_hash()).await?;
        info!(user = %viewer.user().id, "User logged out");
    }

    Ok((
        [(header::SET_COOKIE, expired_session_cookie())],
        found(IndexPath::PATH),
    )
        .into_response())
}
