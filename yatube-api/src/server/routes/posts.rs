use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    extract::{Form, PageQuery, Query},
    found,
    views::{
        self,
        posts::{GroupListContext, IndexContext, PostDetailContext, PostFormContext, ProfileContext},
    },
};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::routing::{RouterExt, TypedPath};
use maud::Markup;
use serde::Deserialize;
use std::sync::Arc;
use yatube_common::{
    form::{PostForm, PostFormErrors},
    model::{
        Id,
        post::{Post, PostMarker},
    },
};
use yatube_db::client::{DbClient, PostFilter};

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(index)
        .typed_get(group_posts)
        .typed_get(profile)
        .typed_get(post_detail)
        .typed_get(post_create_form)
        .typed_post(post_create)
        .typed_get(post_edit_form)
        .typed_post(post_edit)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/", rejection(ServerError))]
pub struct IndexPath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/group/{slug}/", rejection(ServerError))]
pub struct GroupPostsPath {
    pub slug: String,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/profile/{username}/", rejection(ServerError))]
pub struct ProfilePath {
    pub username: String,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{post_id}/", rejection(ServerError))]
pub struct PostDetailPath {
    pub post_id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/create/", rejection(ServerError))]
pub struct PostCreatePath();

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{post_id}/edit/", rejection(ServerError))]
pub struct PostEditPath {
    pub post_id: Id<PostMarker>,
}

async fn index(
    IndexPath(): IndexPath,
    State(db): State<Arc<DbClient>>,
    viewer: Option<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> Result<Markup> {
    let page = db.fetch_posts_page(PostFilter::All, query.page()).await?;

    let context = IndexContext { page };
    Ok(views::posts::index(
        viewer.as_ref().map(AuthenticatedUser::user),
        &context,
    ))
}

async fn group_posts(
    GroupPostsPath { slug }: GroupPostsPath,
    State(db): State<Arc<DbClient>>,
    viewer: Option<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> Result<Markup> {
    let group = db
        .fetch_group_by_slug(&slug)
        .await?
        .ok_or(ServerError::GroupBySlugNotFound(slug))?;

    let page = db
        .fetch_posts_page(PostFilter::Group(group.id), query.page())
        .await?;

    let context = GroupListContext { group, page };
    Ok(views::posts::group_list(
        viewer.as_ref().map(AuthenticatedUser::user),
        &context,
    ))
}

async fn profile(
    ProfilePath { username }: ProfilePath,
    State(db): State<Arc<DbClient>>,
    viewer: Option<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> Result<Markup> {
    let author = db
        .fetch_user_by_handle(&username)
        .await?
        .ok_or(ServerError::UserByHandleNotFound(username))?;

    let page = db
        .fetch_posts_page(PostFilter::Author(author.id), query.page())
        .await?;
    let post_count = page.count();

    let context = ProfileContext {
        author,
        post_count,
        page,
    };
    Ok(views::posts::profile(
        viewer.as_ref().map(AuthenticatedUser::user),
        &context,
    ))
}

async fn post_detail(
    PostDetailPath { post_id }: PostDetailPath,
    State(db): State<Arc<DbClient>>,
    viewer: Option<AuthenticatedUser>,
) -> Result<Markup> {
    let post = fetch_post(&db, post_id).await?;
    let post_count = db.count_posts(PostFilter::Author(post.author.id)).await?;

    let context = PostDetailContext { post, post_count };
    Ok(views::posts::post_detail(
        viewer.as_ref().map(AuthenticatedUser::user),
        &context,
    ))
}

async fn post_create_form(
    PostCreatePath(): PostCreatePath,
    user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
) -> Result<Markup> {
    let context = PostFormContext {
        form: PostForm::default(),
        errors: PostFormErrors::default(),
        groups: db.fetch_groups().await?,
        post_id: None,
    };

    Ok(views::posts::post_form(Some(user.user()), &context))
}

async fn post_create(
    PostCreatePath(): PostCreatePath,
    user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let groups = db.fetch_groups().await?;

    match form.validate(&groups) {
        Ok(content) => {
            db.create_post(&content, user.user().id).await?;

            Ok(found(ProfilePath {
                username: user.user().handle.get().to_owned(),
            }))
        }
        Err(errors) => {
            let context = PostFormContext {
                form,
                errors,
                groups,
                post_id: None,
            };

            Ok(views::posts::post_form(Some(user.user()), &context).into_response())
        }
    }
}

async fn post_edit_form(
    PostEditPath { post_id }: PostEditPath,
    user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
) -> Result<Response> {
    let post = fetch_post(&db, post_id).await?;
    if post.author.id != user.user().id {
        return Ok(found(PostDetailPath { post_id }));
    }

    let context = PostFormContext {
        form: PostForm::from_content(&post.content()),
        errors: PostFormErrors::default(),
        groups: db.fetch_groups().await?,
        post_id: Some(post_id),
    };

    Ok(views::posts::post_form(Some(user.user()), &context).into_response())
}

async fn post_edit(
    PostEditPath { post_id }: PostEditPath,
    user: AuthenticatedUser,
    State(db): State<Arc<DbClient>>,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let post = fetch_post(&db, post_id).await?;
    if post.author.id != user.user().id {
        return Ok(found(PostDetailPath { post_id }));
    }

    let groups = db.fetch_groups().await?;

    match form.validate(&groups) {
        Ok(content) => {
            db.update_post(post_id, &content).await?;

            Ok(found(PostDetailPath { post_id }))
        }
        Err(errors) => {
            let context = PostFormContext {
                form,
                errors,
                groups,
                post_id: Some(post_id),
            };

            Ok(views::posts::post_form(Some(user.user()), &context).into_response())
        }
    }
}

async fn fetch_post(db: &DbClient, post_id: Id<PostMarker>) -> Result<Post> {
    let post = db
        .fetch_post(post_id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(post_id))?;

    Ok(post)
}
