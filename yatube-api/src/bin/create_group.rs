//! Adds a post group. Reads `DATABASE_URL`, `GROUP_TITLE`, `GROUP_SLUG` and
//! `GROUP_DESCRIPTION` from the environment or `.env`.

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;
use yatube_api::config::{ConfigError, install_tracing, load_env};
use yatube_common::model::group::{
    CreateGroup, GroupSlug, InvalidGroupSlugError, InvalidGroupTitleError,
};
use yatube_db::client::{DbClient, DbError};

#[derive(Debug, Error)]
enum CreateGroupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Slug(#[from] InvalidGroupSlugError),
    #[error(transparent)]
    Title(#[from] InvalidGroupTitleError),
    #[error("Error connecting to the database: {0}")]
    DbConnect(sqlx::Error),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct GroupEnv {
    database_url: String,
    group_title: String,
    group_slug: String,
    #[serde(default)]
    group_description: String,
}

#[tokio::main]
async fn main() -> Result<(), CreateGroupError> {
    install_tracing();
    let env: GroupEnv = load_env()?;

    let group = CreateGroup::new(
        env.group_title,
        GroupSlug::new(env.group_slug)?,
        env.group_description,
    )?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&env.database_url)
        .await
        .map_err(CreateGroupError::DbConnect)?;
    let db_client = DbClient::new(pool);
    db_client.migrate().await?;

    let group = db_client.create_group(&group).await?;
    info!(id = %group.id, slug = %group.slug, "Created group");

    Ok(())
}
