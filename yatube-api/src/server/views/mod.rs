pub mod auth;
pub mod error;
pub mod layout;
pub mod pagination;
pub mod posts;
