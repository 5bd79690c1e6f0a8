use crate::server::{
    routes::auth::{LoginPath, SignupPath},
    views::layout::BaseLayout,
};
use axum_extra::routing::TypedPath;
use maud::{Markup, html};
use std::fmt::Display;
use yatube_common::form::SignupErrors;

pub struct LoginContext {
    pub handle: String,
    pub next: Option<String>,
    pub failed: bool,
}

pub struct SignupContext {
    pub handle: String,
    pub errors: SignupErrors,
}

fn field_error(error: Option<impl Display>) -> Markup {
    html! {
        @if let Some(error) = error {
            p class="error" { (error.to_string()) }
        }
    }
}

#[must_use]
pub fn login(context: &LoginContext) -> Markup {
    let content = html! {
        h1 { "Log in" }
        @if context.failed {
            p class="error" {
                "Please enter a correct username and password. Note that both fields may be case-sensitive."
            }
        }
        form action=(LoginPath::PATH) method="post" {
            @if let Some(next) = &context.next {
                input type="hidden" name="next" value=(next);
            }
            div class="field" {
                label for="id_handle" { "Username" }
                input id="id_handle" type="text" name="handle" value=(context.handle) required autofocus;
            }
            div class="field" {
                label for="id_password" { "Password" }
                input id="id_password" type="password" name="password" required;
            }
            button type="submit" { "Log in" }
        }
        p { "No account yet? " a href=(SignupPath::PATH) { "Sign up" } }
    };

    BaseLayout::new("Log in", None).render(content)
}

#[must_use]
pub fn signup(context: &SignupContext) -> Markup {
    let errors = &context.errors;

    let content = html! {
        h1 { "Sign up" }
        form action=(SignupPath::PATH) method="post" {
            div class="field" {
                label for="id_handle" { "Username" }
                input id="id_handle" type="text" name="handle" value=(context.handle) required autofocus;
                (field_error(errors.handle))
                small { "Letters, digits and @/./+/-/_ only." }
            }
            div class="field" {
                label for="id_password" { "Password" }
                input id="id_password" type="password" name="password" required;
                (field_error(errors.password))
            }
            div class="field" {
                label for="id_password_confirmation" { "Password confirmation" }
                input id="id_password_confirmation" type="password" name="password_confirmation" required;
                (field_error(errors.password_confirmation))
            }
            button type="submit" { "Sign up" }
        }
    };

    BaseLayout::new("Sign up", None).render(content)
}
