//! Page skeleton shared by every view.

use crate::server::routes::{
    auth::{LoginPath, LogoutPath, SignupPath},
    posts::{IndexPath, PostCreatePath},
};
use axum_extra::routing::TypedPath;
use maud::{DOCTYPE, Markup, html};
use yatube_common::model::user::User;

pub const SITE_NAME: &str = "Yatube";

#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    viewer: Option<&'a User>,
}

impl<'a> BaseLayout<'a> {
    /// `viewer` is the logged-in user, `None` for anonymous visitors.
    #[must_use]
    pub fn new(title: &'a str, viewer: Option<&'a User>) -> Self {
        Self { title, viewer }
    }

    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (self.title) " | " (SITE_NAME) }
                }
                body {
                    (self.render_header())
                    main class="container" {
                        (content)
                    }
                    footer class="container" {
                        p { "© " (SITE_NAME) }
                    }
                }
            }
        }
    }

    fn render_header(&self) -> Markup {
        html! {
            header class="container" {
                nav {
                    a class="brand" href=(IndexPath::PATH) { (SITE_NAME) }
                    ul {
                        li { a href=(IndexPath::PATH) { "Home" } }
                        @if let Some(viewer) = self.viewer {
                            li { a href=(PostCreatePath::PATH) { "New post" } }
                            li { a href=(super::posts::profile_href(viewer)) { "@" (viewer.handle.get()) } }
                            li {
                                form action=(LogoutPath::PATH) method="post" {
                                    button type="submit" { "Log out" }
                                }
                            }
                        } @else {
                            li { a href=(LoginPath::PATH) { "Log in" } }
                            li { a href=(SignupPath::PATH) { "Sign up" } }
                        }
                    }
                }
            }
        }
    }
}
