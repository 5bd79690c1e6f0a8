use crate::server::{routes::posts::IndexPath, views::layout::BaseLayout};
use axum::http::StatusCode;
use axum_extra::routing::TypedPath;
use maud::{Markup, html};

#[must_use]
pub fn error_page(status: StatusCode) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    let explanation = match status {
        StatusCode::NOT_FOUND => "The page you were looking for does not exist.",
        StatusCode::BAD_REQUEST => "The request could not be understood.",
        _ => "Something went wrong on our side. Please try again later.",
    };

    let content = html! {
        h1 { (status.as_u16()) " " (title) }
        p { (explanation) }
        a href=(IndexPath::PATH) { "Back to the main page" }
    };

    BaseLayout::new(title, None).render(content)
}
