use crate::record::{
    FullPostRecord, GroupRecord, SessionRecord, UserCredentialsRecord, UserRecord,
};
use sqlx::{
    PgPool,
    migrate::{MigrateError, Migrator},
    query, query_as, query_scalar,
};
use thiserror::Error;
use time::PrimitiveDateTime;
use tracing::{debug, info};
use yatube_common::{
    model::{
        Id, ModelValidationError,
        auth::{Session, SessionTokenHash},
        group::{CreateGroup, Group, GroupMarker, GroupSlug},
        post::{Post, PostContent, PostMarker},
        user::{CreateUser, User, UserCredentials, UserHandle, UserMarker},
    },
    page::{POSTS_PER_PAGE, Page, Paginator},
};

pub static MIGRATOR: Migrator = sqlx::migrate!();

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("The handle {0} is already taken")]
    HandleTaken(UserHandle),
    #[error("The group slug {0} is already taken")]
    SlugTaken(GroupSlug),
    #[error("Post with id {0} does not exist")]
    PostMissing(Id<PostMarker>),
    #[error("Applying migrations failed: {0}")]
    Migrate(#[from] MigrateError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Which posts a listing shows.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub enum PostFilter {
    #[default]
    All,
    Group(Id<GroupMarker>),
    Author(Id<UserMarker>),
}

impl PostFilter {
    fn group(self) -> Option<i64> {
        match self {
            PostFilter::Group(group) => Some(group.get()),
            PostFilter::All | PostFilter::Author(_) => None,
        }
    }

    fn author(self) -> Option<i64> {
        match self {
            PostFilter::Author(author) => Some(author.get()),
            PostFilter::All | PostFilter::Group(_) => None,
        }
    }
}

macro_rules! full_post_select {
    () => {
        "
        SELECT
            p.post_id,
            p.text,
            p.pub_date,
            u.user_id,
            u.handle,
            g.group_id,
            g.title AS group_title,
            g.slug AS group_slug,
            g.description AS group_description
        FROM
            posts.posts p
            JOIN users.users u ON u.user_id = p.user_id
            LEFT JOIN posts.groups g ON g.group_id = p.group_id
        "
    };
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.handle
            FROM
                users.users
            WHERE
                users.user_id = $1
            ",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    pub async fn fetch_user_by_handle(&self, handle: &str) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.handle
            FROM
                users.users
            WHERE
                users.handle = $1
            ",
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    pub async fn fetch_credentials(&self, handle: &str) -> Result<Option<UserCredentials>> {
        let record = query_as::<_, UserCredentialsRecord>(
            "
            SELECT
                users.user_id,
                users.handle,
                users.password_hash
            FROM
                users.users
            WHERE
                users.handle = $1
            ",
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;

        let credentials = record.map(UserCredentials::try_from).transpose()?;
        Ok(credentials)
    }

    pub async fn create_user(&self, user: &CreateUser) -> Result<User> {
        let user_id = query_scalar::<_, i64>(
            "
            INSERT INTO users.users (handle, password_hash)
            VALUES ($1, $2)
            RETURNING users.user_id
            ",
        )
        .bind(user.handle.get())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DbError::HandleTaken(user.handle.clone())
            } else {
                err.into()
            }
        })?;

        debug!(%user_id, handle = %user.handle, "Created user");

        Ok(User {
            id: user_id.into(),
            handle: user.handle.clone(),
        })
    }

    pub async fn fetch_groups(&self) -> Result<Vec<Group>> {
        let records = query_as::<_, GroupRecord>(
            "
            SELECT
                groups.group_id,
                groups.title,
                groups.slug,
                groups.description
            FROM
                posts.groups
            ORDER BY
                groups.title
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let groups = records
            .into_iter()
            .map(Group::try_from)
            .collect::<Result<_, _>>()?;
        Ok(groups)
    }

    pub async fn fetch_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let record = query_as::<_, GroupRecord>(
            "
            SELECT
                groups.group_id,
                groups.title,
                groups.slug,
                groups.description
            FROM
                posts.groups
            WHERE
                groups.slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        let group = record.map(Group::try_from).transpose()?;
        Ok(group)
    }

    pub async fn create_group(&self, group: &CreateGroup) -> Result<Group> {
        let group_id = query_scalar::<_, i64>(
            "
            INSERT INTO posts.groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING groups.group_id
            ",
        )
        .bind(&group.title)
        .bind(group.slug.get())
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DbError::SlugTaken(group.slug.clone())
            } else {
                err.into()
            }
        })?;

        Ok(Group {
            id: group_id.into(),
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        })
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, FullPostRecord>(concat!(
            full_post_select!(),
            "
            WHERE
                p.post_id = $1
            "
        ))
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    pub async fn count_posts(&self, filter: PostFilter) -> Result<u64> {
        let count = query_scalar::<_, i64>(
            "
            SELECT
                COUNT(*)
            FROM
                posts.posts
            WHERE
                ($1::BIGINT IS NULL OR posts.group_id = $1)
                AND ($2::BIGINT IS NULL OR posts.user_id = $2)
            ",
        )
        .bind(filter.group())
        .bind(filter.author())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.cast_unsigned())
    }

    /// Fetches one page of posts, newest first.
    ///
    /// `page` is the raw `?page=` value; see [`Paginator::page_number`].
    pub async fn fetch_posts_page(
        &self,
        filter: PostFilter,
        page: Option<&str>,
    ) -> Result<Page<Post>> {
        let paginator = Paginator::new(self.count_posts(filter).await?, POSTS_PER_PAGE);
        let number = paginator.page_number(page);
        let window = paginator.window(number);

        let records = query_as::<_, FullPostRecord>(concat!(
            full_post_select!(),
            "
            WHERE
                ($1::BIGINT IS NULL OR p.group_id = $1)
                AND ($2::BIGINT IS NULL OR p.user_id = $2)
            ORDER BY
                p.pub_date DESC,
                p.post_id DESC
            LIMIT $3
            OFFSET $4
            "
        ))
        .bind(filter.group())
        .bind(filter.author())
        .bind(window.limit.cast_signed())
        .bind(window.offset.cast_signed())
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(paginator.page(number, posts))
    }

    pub async fn create_post(
        &self,
        post: &PostContent,
        author: Id<UserMarker>,
    ) -> Result<Id<PostMarker>> {
        let post_id = query_scalar::<_, i64>(
            "
            INSERT INTO posts.posts (text, user_id, group_id)
            VALUES ($1, $2, $3)
            RETURNING posts.post_id
            ",
        )
        .bind(&post.text)
        .bind(author.get())
        .bind(post.group.map(Id::get))
        .fetch_one(&self.pool)
        .await?;

        debug!(%post_id, %author, "Created post");

        Ok(post_id.into())
    }

    pub async fn update_post(&self, post_id: Id<PostMarker>, post: &PostContent) -> Result<()> {
        let result = query(
            "
            UPDATE posts.posts
            SET
                text = $2,
                group_id = $3
            WHERE
                posts.post_id = $1
            ",
        )
        .bind(post_id.get())
        .bind(&post.text)
        .bind(post.group.map(Id::get))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::PostMissing(post_id));
        }

        debug!(%post_id, "Updated post");

        Ok(())
    }

    pub async fn create_session(&self, session: &Session) -> Result<()> {
        query(
            "
            INSERT INTO users.sessions (token_hash, user_id, created_at, expires_after_seconds)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&session.token_hash.0[..])
        .bind(session.user.get())
        .bind(PrimitiveDateTime::new(
            session.created_at.date(),
            session.created_at.time(),
        ))
        .bind(
            session
                .expires_after
                .map(|expires_after| expires_after.whole_seconds()),
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn fetch_session(&self, token_hash: &SessionTokenHash) -> Result<Option<Session>> {
        let record = query_as::<_, SessionRecord>(
            "
            SELECT
                sessions.user_id,
                sessions.token_hash,
                sessions.created_at,
                sessions.expires_after_seconds
            FROM
                users.sessions
            WHERE
                sessions.token_hash = $1
            ",
        )
        .bind(&token_hash.0[..])
        .fetch_optional(&self.pool)
        .await?;

        let session = record.map(Session::try_from).transpose()?;
        Ok(session)
    }

    pub async fn delete_session(&self, token_hash: &SessionTokenHash) -> Result<()> {
        query(
            "
            DELETE FROM users.sessions
            WHERE
                sessions.token_hash = $1
            ",
        )
        .bind(&token_hash.0[..])
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
