use crate::server::ServerRouter;

pub mod auth;
pub mod posts;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .merge(posts::routes())
        .merge(auth::routes())
}

#[cfg(test)]
mod tests {
    use crate::server::{ServerState, SessionSettings, auth::SESSION_COOKIE, routes};
    use axum::{
        Router,
        body::Body,
        http::{Request, Response, StatusCode, header},
    };
    use sqlx::{PgPool, postgres::PgPoolOptions};
    use std::sync::Arc;
    use time::{Duration, UtcDateTime};
    use tower::ServiceExt;
    use yatube_common::{
        model::{
            Id,
            auth::{Session, SessionToken, hash_password},
            group::{CreateGroup, Group, GroupSlug},
            post::{PostContent, PostMarker},
            user::{CreateUser, User, UserHandle},
        },
        util::PositiveDuration,
    };
    use yatube_db::client::{DbClient, MIGRATOR, PostFilter};

    fn app_over(db: DbClient) -> Router {
        let state = ServerState {
            db_client: Arc::new(db),
            session_settings: SessionSettings::default(),
        };

        routes().with_state(state)
    }

    /// Router over a pool that never connects; only usable for requests that
    /// are answered before any query runs.
    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://yatube@localhost/yatube")
            .unwrap();

        app_over(DbClient::new(pool))
    }

    async fn send(request: Request<Body>) -> Response<Body> {
        app().oneshot(request).await.unwrap()
    }

    async fn get(uri: &str) -> Response<Body> {
        send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    fn location(response: &Response<Body>) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    async fn body(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn unknown_route() {
        let response = get("/unexisting_page/").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body(response).await.contains("404 Not Found"));
    }

    #[tokio::test]
    async fn malformed_post_id() {
        assert_eq!(get("/posts/abc/").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/posts/abc/edit/").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_redirects_anonymous() {
        let response = get("/create/").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/auth/login/?next=/create/");

        let response = send(
            Request::post("/create/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("text=hello"))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/auth/login/?next=/create/");
    }

    #[tokio::test]
    async fn edit_redirects_anonymous() {
        let response = get("/posts/1/edit/").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/auth/login/?next=/posts/1/edit/");
    }

    #[tokio::test]
    async fn malformed_session_cookie_is_anonymous() {
        let response = send(
            Request::get("/create/")
                .header(header::COOKIE, "session=garbage; theme=dark")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/auth/login/?next=/create/");
    }

    #[tokio::test]
    async fn login_page_carries_next() {
        let response = get("/auth/login/?next=/create/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            body(response)
                .await
                .contains(r#"<input type="hidden" name="next" value="/create/">"#)
        );
    }

    #[tokio::test]
    async fn signup_page() {
        let response = get("/auth/signup/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains(r#"name="password_confirmation""#));
    }

    #[tokio::test]
    async fn anonymous_logout_clears_cookie() {
        let response = send(Request::post("/auth/logout/").body(Body::empty()).unwrap()).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/");
        assert!(
            response.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );
    }

    /// Test fixture over a freshly migrated database.
    struct Site {
        db: DbClient,
        app: Router,
    }

    impl Site {
        fn new(pool: PgPool) -> Self {
            let db = DbClient::new(pool);
            let app = app_over(db.clone());
            Self { db, app }
        }

        async fn user(&self, handle: &str) -> User {
            let new_user = CreateUser {
                handle: UserHandle::new(handle.to_owned()).unwrap(),
                password_hash: hash_password("war and peace").unwrap(),
            };

            self.db.create_user(&new_user).await.unwrap()
        }

        async fn group(&self, slug: &str) -> Group {
            let new_group = CreateGroup::new(
                format!("Group {slug}"),
                GroupSlug::new(slug.to_owned()).unwrap(),
                "description".to_owned(),
            )
            .unwrap();

            self.db.create_group(&new_group).await.unwrap()
        }

        async fn post(
            &self,
            author: &User,
            group: Option<&Group>,
            text: &str,
        ) -> Id<PostMarker> {
            let content = PostContent {
                text: text.to_owned(),
                group: group.map(|group| group.id),
            };

            self.db.create_post(&content, author.id).await.unwrap()
        }

        /// Stores a session for `user` and returns the matching `Cookie` header.
        async fn session(&self, user: &User, created_at: UtcDateTime) -> (String, Session) {
            let token = SessionToken::generate_random(user.id);
            let session = Session {
                user: user.id,
                token_hash: token.hash().unwrap(),
                created_at,
                expires_after: Some(PositiveDuration::new_unchecked(Duration::days(1))),
            };
            self.db.create_session(&session).await.unwrap();

            (format!("{SESSION_COOKIE}={}", token.as_token_str()), session)
        }

        async fn login(&self, user: &User) -> String {
            self.session(user, UtcDateTime::now()).await.0
        }

        async fn send(&self, request: Request<Body>) -> Response<Body> {
            self.app.clone().oneshot(request).await.unwrap()
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
            let mut request = Request::get(uri);
            if let Some(cookie) = cookie {
                request = request.header(header::COOKIE, cookie);
            }

            self.send(request.body(Body::empty()).unwrap()).await
        }

        async fn post_form(&self, uri: &str, cookie: Option<&str>, form: &str) -> Response<Body> {
            let mut request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(cookie) = cookie {
                request = request.header(header::COOKIE, cookie);
            }

            self.send(request.body(Body::from(form.to_owned())).unwrap())
                .await
        }

        async fn page(&self, uri: &str) -> String {
            let response = self.get(uri, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            body(response).await
        }
    }

    fn articles(html: &str) -> usize {
        html.matches("<article").count()
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    async fn listings_paginate(pool: PgPool) {
        let site = Site::new(pool);
        let author = site.user("author").await;
        let g1 = site.group("g1").await;
        site.group("g2").await;
        for index in 0..13 {
            site.post(&author, Some(&g1), &format!("post {index}")).await;
        }

        let first = site.page("/").await;
        assert_eq!(articles(&first), 10);
        assert!(first.contains("<p>post 12</p>"));
        assert!(!first.contains("<p>post 0</p>"));

        let second = site.page("/?page=2").await;
        assert_eq!(articles(&second), 3);
        assert!(second.contains("<p>post 0</p>"));
        assert!(!second.contains("<p>post 12</p>"));

        assert_eq!(articles(&site.page("/?page=1&page=2").await), 3);
        assert_eq!(articles(&site.page("/?page=99").await), 3);
        assert_eq!(articles(&site.page("/?page=abc").await), 10);

        assert_eq!(articles(&site.page("/group/g1/").await), 10);
        assert_eq!(articles(&site.page("/group/g1/?page=2").await), 3);

        let empty_group = site.page("/group/g2/").await;
        assert_eq!(articles(&empty_group), 0);
        assert!(empty_group.contains("No posts in this group yet."));

        let profile = site.page("/profile/author/?page=2").await;
        assert_eq!(articles(&profile), 3);
        assert!(profile.contains("Total posts: 13"));

        assert_eq!(
            site.get("/group/missing/", None).await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            site.get("/profile/nobody/", None).await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            site.get("/posts/999/", None).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    async fn created_post_appears_in_listings(pool: PgPool) {
        let site = Site::new(pool);
        let author = site.user("author").await;
        let g1 = site.group("g1").await;
        site.group("g2").await;
        let cookie = site.login(&author).await;

        let form = site.get("/create/", Some(&cookie)).await;
        assert_eq!(form.status(), StatusCode::OK);
        assert!(body(form).await.contains(r#"name="text""#));

        let response = site
            .post_form(
                "/create/",
                Some(&cookie),
                &format!("text=Fresh+post&group={}", g1.id),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/profile/author/");

        assert!(site.page("/").await.contains("<p>Fresh post</p>"));
        assert!(site.page("/group/g1/").await.contains("<p>Fresh post</p>"));
        assert!(!site.page("/group/g2/").await.contains("<p>Fresh post</p>"));

        let profile = site.page("/profile/author/").await;
        assert!(profile.contains("<p>Fresh post</p>"));
        assert!(profile.contains("Total posts: 1"));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    async fn invalid_create_rerenders_form(pool: PgPool) {
        let site = Site::new(pool);
        let author = site.user("author").await;
        let cookie = site.login(&author).await;

        let response = site
            .post_form("/create/", Some(&cookie), "text=+++&group=42")
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(html.contains("This field is required."));
        assert!(html.contains("Select a valid choice."));

        let without_body = site
            .send(
                Request::post("/create/")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(without_body.status(), StatusCode::OK);
        assert!(body(without_body).await.contains("This field is required."));

        assert_eq!(site.db.count_posts(PostFilter::All).await.unwrap(), 0);
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    async fn author_edits_post(pool: PgPool) {
        let site = Site::new(pool);
        let author = site.user("author").await;
        let g1 = site.group("g1").await;
        let g2 = site.group("g2").await;
        let post_id = site.post(&author, Some(&g1), "before").await;
        let cookie = site.login(&author).await;
        let edit_path = format!("/posts/{post_id}/edit/");

        let form = site.get(&edit_path, Some(&cookie)).await;
        assert_eq!(form.status(), StatusCode::OK);
        let html = body(form).await;
        assert!(html.contains(">before</textarea>"));
        assert!(html.contains(&format!(r#"action="{edit_path}""#)));

        let response = site
            .post_form(
                &edit_path,
                Some(&cookie),
                &format!("text=after&group={}", g2.id),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), format!("/posts/{post_id}/"));

        let post = site.db.fetch_post(post_id).await.unwrap().unwrap();
        assert_eq!(post.text, "after");
        assert_eq!(post.group, Some(g2));

        let detail = body(site.get(&format!("/posts/{post_id}/"), Some(&cookie)).await).await;
        assert!(detail.contains("<p>after</p>"));
        assert!(detail.contains(r#"<span class="post-count">1</span>"#));
        assert!(detail.contains(&format!(r#"href="{edit_path}""#)));
        assert!(!site.page("/group/g1/").await.contains("<p>after</p>"));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    async fn non_author_cannot_edit(pool: PgPool) {
        let site = Site::new(pool);
        let author = site.user("author").await;
        let other = site.user("other").await;
        let post_id = site.post(&author, None, "original").await;
        let cookie = site.login(&other).await;
        let edit_path = format!("/posts/{post_id}/edit/");
        let detail_path = format!("/posts/{post_id}/");

        let form = site.get(&edit_path, Some(&cookie)).await;
        assert_eq!(form.status(), StatusCode::FOUND);
        assert_eq!(location(&form), detail_path);

        let response = site
            .post_form(&edit_path, Some(&cookie), "text=changed&group=")
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), detail_path);

        let post = site.db.fetch_post(post_id).await.unwrap().unwrap();
        assert_eq!(post.text, "original");

        let missing = site.get("/posts/999/edit/", Some(&cookie)).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    async fn expired_session_is_deleted(pool: PgPool) {
        let site = Site::new(pool);
        let author = site.user("author").await;
        let (cookie, session) = site
            .session(&author, UtcDateTime::now() - Duration::days(2))
            .await;

        let response = site.get("/create/", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/auth/login/?next=/create/");

        assert_eq!(
            site.db.fetch_session(&session.token_hash).await.unwrap(),
            None
        );
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    async fn signup_login_logout(pool: PgPool) {
        let site = Site::new(pool);
        let credentials = "handle=leo&password=war+and+peace&password_confirmation=war+and+peace";

        let response = site.post_form("/auth/signup/", None, credentials).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_owned();
        assert!(cookie.starts_with("session="));

        let create = site.get("/create/", Some(&cookie)).await;
        assert_eq!(create.status(), StatusCode::OK);

        let taken = site.post_form("/auth/signup/", None, credentials).await;
        assert_eq!(taken.status(), StatusCode::OK);
        assert!(body(taken).await.contains("A user with that username already exists."));

        let wrong = site
            .post_form("/auth/login/", None, "handle=leo&password=nope")
            .await;
        assert_eq!(wrong.status(), StatusCode::OK);
        assert!(body(wrong).await.contains("Please enter a correct username and password."));

        let login = site
            .post_form(
                "/auth/login/",
                None,
                "handle=leo&password=war+and+peace&next=%2Fcreate%2F",
            )
            .await;
        assert_eq!(login.status(), StatusCode::FOUND);
        assert_eq!(location(&login), "/create/");

        let logout = site.post_form("/auth/logout/", Some(&cookie), "").await;
        assert_eq!(logout.status(), StatusCode::FOUND);
        let after = site.get("/create/", Some(&cookie)).await;
        assert_eq!(after.status(), StatusCode::FOUND);
        assert_eq!(location(&after), "/auth/login/?next=/create/");
    }
}
