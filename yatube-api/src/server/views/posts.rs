use crate::server::{
    routes::posts::{
        GroupPostsPath, IndexPath, PostCreatePath, PostDetailPath, PostEditPath, ProfilePath,
    },
    views::{layout::BaseLayout, pagination::Pagination},
};
use axum_extra::routing::TypedPath;
use maud::{Markup, html};
use time::{format_description::BorrowedFormatItem, macros::format_description};
use yatube_common::{
    form::{PostForm, PostFormErrors},
    model::{
        Id,
        group::Group,
        post::{Post, PostMarker},
        user::User,
    },
    page::Page,
};

const PUB_DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[day].[month].[year] [hour]:[minute]");

pub struct IndexContext {
    pub page: Page<Post>,
}

pub struct GroupListContext {
    pub group: Group,
    pub page: Page<Post>,
}

pub struct ProfileContext {
    pub author: User,
    pub post_count: u64,
    pub page: Page<Post>,
}

pub struct PostDetailContext {
    pub post: Post,
    /// Number of posts by the post's author.
    pub post_count: u64,
}

pub struct PostFormContext {
    pub form: PostForm,
    pub errors: PostFormErrors,
    pub groups: Vec<Group>,
    /// Set when editing; the form then submits to the post's edit page.
    pub post_id: Option<Id<PostMarker>>,
}

impl PostFormContext {
    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.post_id.is_some()
    }
}

#[must_use]
pub fn profile_href(user: &User) -> String {
    ProfilePath {
        username: user.handle.get().to_owned(),
    }
    .to_string()
}

#[must_use]
pub fn group_href(group: &Group) -> String {
    GroupPostsPath {
        slug: group.slug.get().to_owned(),
    }
    .to_string()
}

#[must_use]
pub fn post_href(post_id: Id<PostMarker>) -> String {
    PostDetailPath { post_id }.to_string()
}

fn pub_date(post: &Post) -> String {
    post.pub_date.format(PUB_DATE_FORMAT).unwrap_or_default()
}

/// One post in a listing. `show_group` is off on the group's own page.
fn post_card(post: &Post, show_group: bool) -> Markup {
    html! {
        article class="post" {
            ul class="post-meta" {
                li {
                    "Author: "
                    a href=(profile_href(&post.author)) { (post.author.handle.get()) }
                }
                li { "Published: " (pub_date(post)) }
            }
            p { (post.text) }
            a href=(post_href(post.id)) { "details" }
            @if show_group {
                @if let Some(group) = &post.group {
                    " "
                    a href=(group_href(group)) { "all posts of the group " (group.title) }
                }
            }
        }
    }
}

fn post_list(page: &Page<Post>, base_url: &str, show_group: bool) -> Markup {
    html! {
        @for (index, post) in page.iter().enumerate() {
            @if index > 0 {
                hr;
            }
            (post_card(post, show_group))
        }
        (Pagination::new(base_url, page))
    }
}

#[must_use]
pub fn index(viewer: Option<&User>, context: &IndexContext) -> Markup {
    let content = html! {
        h1 { "Latest updates" }
        (post_list(&context.page, IndexPath::PATH, true))
    };

    BaseLayout::new("Latest updates", viewer).render(content)
}

#[must_use]
pub fn group_list(viewer: Option<&User>, context: &GroupListContext) -> Markup {
    let group = &context.group;
    let title = format!("Posts of the group {group}");

    let content = html! {
        h1 { (group.title) }
        p class="description" { (group.description) }
        @if context.page.is_empty() {
            p { "No posts in this group yet." }
        }
        (post_list(&context.page, &group_href(group), false))
    };

    BaseLayout::new(&title, viewer).render(content)
}

#[must_use]
pub fn profile(viewer: Option<&User>, context: &ProfileContext) -> Markup {
    let author = &context.author;
    let title = format!("Profile of {}", author.handle);

    let content = html! {
        h1 { "All posts of " (author.handle.get()) }
        h3 { "Total posts: " (context.post_count) }
        (post_list(&context.page, &profile_href(author), true))
    };

    BaseLayout::new(&title, viewer).render(content)
}

#[must_use]
pub fn post_detail(viewer: Option<&User>, context: &PostDetailContext) -> Markup {
    let post = &context.post;
    let title = format!("Post {post}");
    let is_author = viewer.is_some_and(|viewer| viewer.id == post.author.id);

    let content = html! {
        div class="post-detail" {
            aside {
                ul {
                    li { "Published: " (pub_date(post)) }
                    @if let Some(group) = &post.group {
                        li {
                            "Group: " (group.title) " "
                            a href=(group_href(group)) { "all posts of the group" }
                        }
                    }
                    li { "Author: " (post.author.handle.get()) }
                    li { "Total posts by the author: " span class="post-count" { (context.post_count) } }
                    li { a href=(profile_href(&post.author)) { "all posts of the user" } }
                }
            }
            article {
                p { (post.text) }
                @if is_author {
                    a class="button" href=(PostEditPath { post_id: post.id }.to_string()) { "edit" }
                }
            }
        }
    };

    BaseLayout::new(&title, viewer).render(content)
}

#[must_use]
pub fn post_form(viewer: Option<&User>, context: &PostFormContext) -> Markup {
    let (title, action, submit) = match context.post_id {
        Some(post_id) => (
            "Edit post",
            PostEditPath { post_id }.to_string(),
            "Save",
        ),
        None => (
            "New post",
            PostCreatePath::PATH.to_owned(),
            "Add",
        ),
    };
    let selected_group = context.form.selected_group();

    let content = html! {
        h1 { (title) }
        form action=(action) method="post" {
            div class="field" {
                label for="id_text" { "Post text" span class="required" { "*" } }
                textarea id="id_text" name="text" rows="10" required { (context.form.text) }
                @if let Some(error) = context.errors.text {
                    p class="error" { (error.to_string()) }
                }
                small { "Text of the new post" }
            }
            div class="field" {
                label for="id_group" { "Group" }
                select id="id_group" name="group" {
                    option value="" selected[selected_group.is_none()] { "---------" }
                    @for group in &context.groups {
                        option value=(group.id.get()) selected[selected_group == Some(group.id)] { (group.title) }
                    }
                }
                @if let Some(error) = context.errors.group {
                    p class="error" { (error.to_string()) }
                }
                small { "Group the post will belong to" }
            }
            button type="submit" { (submit) }
        }
    };

    BaseLayout::new(title, viewer).render(content)
}
