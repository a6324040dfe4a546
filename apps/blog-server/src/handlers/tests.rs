use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Post, User};
use blogicum_core::ports::{BaseRepository, PasswordService, PostRepository, TokenService};
use blogicum_core::visibility::PostFilter;
use blogicum_core::PageRequest;
use blogicum_infra::{Argon2PasswordService, InMemoryDatabase, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

const PASSWORD: &str = "s3cret-pass";

struct Site {
    state: AppState,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl Site {
    fn new() -> Self {
        Self {
            state: AppState::in_memory(InMemoryDatabase::new()),
            tokens: Arc::new(JwtTokenService::new(JwtConfig {
                secret: "handler-tests".to_string(),
                ..JwtConfig::default()
            })),
            passwords: Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap()),
        }
    }

    /// A stored user and a bearer token for them.
    async fn user(&self, username: &str) -> (User, String) {
        let hash = self.passwords.hash(PASSWORD).unwrap();
        let user = self
            .state
            .users
            .create(User::new(username.to_string(), hash))
            .await
            .unwrap();
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        (user, token)
    }

    async fn category(&self, slug: &str, is_published: bool) -> Category {
        let mut category = Category::new(slug.to_uppercase(), String::new(), slug.to_string());
        category.is_published = is_published;
        self.state.categories.create(category).await.unwrap()
    }

    async fn post(&self, author: &User, category: &Category, title: &str, is_published: bool) -> Post {
        let post = Post::new(
            author.id,
            category.id,
            title.to_string(),
            "Some text".to_string(),
            Utc::now() - TimeDelta::hours(1),
        )
        .published(is_published);
        self.state.posts.create(post).await.unwrap()
    }

    async fn comment(&self, author: &User, post: &Post, text: &str) -> Comment {
        self.state
            .comments
            .create(Comment::new(post.id, author.id, text.to_string()))
            .await
            .unwrap()
    }
}

macro_rules! app {
    ($site:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($site.state.clone()))
                .app_data(web::Data::new($site.tokens.clone()))
                .app_data(web::Data::new($site.passwords.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn get(uri: &str, token: Option<&str>) -> test::TestRequest {
    authorized(test::TestRequest::get().uri(uri), token)
}

fn post(uri: &str, token: Option<&str>, body: Value) -> test::TestRequest {
    authorized(test::TestRequest::post().uri(uri).set_json(body), token)
}

fn authorized(req: test::TestRequest, token: Option<&str>) -> test::TestRequest {
    match token {
        Some(token) => req.insert_header((header::AUTHORIZATION, format!("Bearer {token}"))),
        None => req,
    }
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn titles(listing: &Value) -> Vec<String> {
    listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

fn post_body(category: &Category, title: &str) -> Value {
    json!({
        "title": title,
        "text": "Body",
        "pub_date": Utc::now() - TimeDelta::minutes(5),
        "category": category.id,
    })
}

#[actix_rt::test]
async fn test_draft_is_only_listed_on_its_authors_profile() {
    let site = Site::new();
    let (alice, alice_token) = site.user("alice").await;
    let (_bob, bob_token) = site.user("bob").await;
    let travel = site.category("travel", true).await;
    site.post(&alice, &travel, "Published", true).await;
    let draft = site.post(&alice, &travel, "Draft", false).await;
    let app = app!(site);

    let index: Value = test::call_and_read_body_json(&app, get("/", Some(bob_token.as_str())).to_request()).await;
    assert_eq!(titles(&index["posts"]), vec!["Published"]);

    let category: Value =
        test::call_and_read_body_json(&app, get("/category/travel/", Some(bob_token.as_str())).to_request()).await;
    assert_eq!(category["category"]["slug"], "travel");
    assert_eq!(titles(&category["posts"]), vec!["Published"]);

    let own: Value =
        test::call_and_read_body_json(&app, get("/profile/alice/", Some(alice_token.as_str())).to_request()).await;
    assert_eq!(own["posts"]["total"], 2);
    assert!(titles(&own["posts"]).contains(&"Draft".to_string()));

    let other: Value =
        test::call_and_read_body_json(&app, get("/profile/alice/", Some(bob_token.as_str())).to_request()).await;
    assert_eq!(titles(&other["posts"]), vec!["Published"]);

    let uri = format!("/posts/{}/", draft.id);
    let resp = test::call_service(&app, get(&uri, Some(bob_token.as_str())).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = test::call_service(&app, get(&uri, Some(alice_token.as_str())).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_scheduled_post_is_hidden_until_its_date() {
    let site = Site::new();
    let (alice, _) = site.user("alice").await;
    let travel = site.category("travel", true).await;
    let mut scheduled = site.post(&alice, &travel, "Tomorrow", true).await;
    scheduled.pub_date = Utc::now() + TimeDelta::days(1);
    site.state.posts.update(scheduled).await.unwrap();
    let app = app!(site);

    let index: Value = test::call_and_read_body_json(&app, get("/", None).to_request()).await;
    assert_eq!(index["posts"]["total"], 0);
}

#[actix_rt::test]
async fn test_unpublished_category_is_not_found() {
    let site = Site::new();
    let (alice, alice_token) = site.user("alice").await;
    let hidden = site.category("hidden", false).await;
    let post = site.post(&alice, &hidden, "In hiding", true).await;
    let app = app!(site);

    for token in [None, Some(alice_token.as_str())] {
        let resp = test::call_service(&app, get("/category/hidden/", token).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let index: Value = test::call_and_read_body_json(&app, get("/", None).to_request()).await;
    assert_eq!(index["posts"]["total"], 0);

    // The author still reaches it through their profile and the detail page.
    let uri = format!("/posts/{}/", post.id);
    let resp = test::call_service(&app, get(&uri, Some(alice_token.as_str())).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_listings_paginate_by_ten() {
    let site = Site::new();
    let (alice, _) = site.user("alice").await;
    let travel = site.category("travel", true).await;
    for i in 0..23 {
        site.post(&alice, &travel, &format!("Post {i}"), true).await;
    }
    let app = app!(site);

    let first: Value = test::call_and_read_body_json(&app, get("/", None).to_request()).await;
    assert_eq!(first["posts"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(first["posts"]["num_pages"], 3);
    assert_eq!(first["posts"]["has_next"], true);
    assert_eq!(first["posts"]["has_previous"], false);

    let last: Value = test::call_and_read_body_json(&app, get("/?page=3", None).to_request()).await;
    assert_eq!(last["posts"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(last["posts"]["has_next"], false);

    for uri in ["/?page=4", "/?page=0", "/category/travel/?page=9"] {
        let resp = test::call_service(&app, get(uri, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn test_empty_index_has_a_first_page() {
    let site = Site::new();
    let app = app!(site);

    let index: Value = test::call_and_read_body_json(&app, get("/", None).to_request()).await;
    assert_eq!(index["posts"]["page"], 1);
    assert_eq!(index["posts"]["num_pages"], 1);
    assert!(index["posts"]["items"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_create_post_stamps_the_session_user() {
    let site = Site::new();
    let (alice, alice_token) = site.user("alice").await;
    let (bob, _) = site.user("bob").await;
    let travel = site.category("travel", true).await;
    let app = app!(site);

    let mut body = post_body(&travel, "Mine");
    body["author"] = json!(bob.id);
    let resp = test::call_service(&app, post("/posts/create/", Some(alice_token.as_str()), body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/alice/");

    let now = Utc::now();
    let alices = site
        .state
        .posts
        .select_posts(&PostFilter::profile(alice.id, Some(alice.id), now), PageRequest::posts(None))
        .await
        .unwrap();
    assert_eq!(alices.total, 1);
    assert_eq!(alices.items[0].post.author_id, alice.id);
    assert_eq!(alices.items[0].post.title, "Mine");

    let bobs = site
        .state
        .posts
        .select_posts(&PostFilter::profile(bob.id, Some(bob.id), now), PageRequest::posts(None))
        .await
        .unwrap();
    assert_eq!(bobs.total, 0);
}

#[actix_rt::test]
async fn test_invalid_post_form_lists_field_errors() {
    let site = Site::new();
    let (_alice, alice_token) = site.user("alice").await;
    let app = app!(site);

    let body = json!({ "title": "  ", "text": "Body", "category": Uuid::new_v4() });
    let resp = test::call_service(&app, post("/posts/create/", Some(alice_token.as_str()), body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["status"], 422);
    for field in ["title", "pub_date", "category"] {
        assert!(problem["errors"][field].is_array(), "missing error for {field}");
    }
    assert!(problem["errors"]["text"].is_null());
}

#[actix_rt::test]
async fn test_malformed_post_values_are_field_errors() {
    let site = Site::new();
    let (_alice, alice_token) = site.user("alice").await;
    let travel = site.category("travel", true).await;
    let app = app!(site);

    let body = json!({ "title": "Trip", "text": "Body", "pub_date": "yesterday", "category": travel.id });
    let resp = test::call_service(&app, post("/posts/create/", Some(alice_token.as_str()), body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["errors"]["pub_date"][0], "Enter a valid date/time.");

    let mut body = post_body(&travel, "Trip");
    body["category"] = json!("travel");
    let resp = test::call_service(&app, post("/posts/create/", Some(alice_token.as_str()), body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem: Value = test::read_body_json(resp).await;
    assert!(problem["errors"]["category"].is_array());
    assert!(problem["errors"]["pub_date"].is_null());
}

#[actix_rt::test]
async fn test_unreadable_body_gets_a_problem_response() {
    let site = Site::new();
    let (_alice, alice_token) = site.user("alice").await;
    let app = app!(site);

    let req = authorized(
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(header::ContentType::json())
            .set_payload("{not json"),
        Some(alice_token.as_str()),
    );
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["status"], 400);

    let req = authorized(
        test::TestRequest::post().uri("/posts/create/").set_json(json!({ "title": ["not", "text"] })),
        Some(alice_token.as_str()),
    );
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem: Value = test::read_body_json(resp).await;
    assert!(problem["errors"]["__all__"].is_array());
}

#[actix_rt::test]
async fn test_anonymous_mutations_redirect_to_login() {
    let site = Site::new();
    let (alice, _) = site.user("alice").await;
    let travel = site.category("travel", true).await;
    let target = site.post(&alice, &travel, "Target", true).await;
    let comment = site.comment(&alice, &target, "Hello").await;
    let app = app!(site);

    let edit = format!("/posts/{}/edit/", target.id);
    let delete_comment = format!("/posts/{}/delete_comment/{}/", target.id, comment.id);

    let requests = [
        post("/posts/create/", None, post_body(&travel, "Sneaky")),
        get("/posts/create/", None),
        post(&edit, None, post_body(&travel, "Changed")),
        post(&format!("/posts/{}/comment/", target.id), None, json!({ "text": "hi" })),
        post(&delete_comment, None, json!({})),
        get("/edit_profile/", None),
    ];

    for req in requests {
        let req = req.to_request();
        let path = req.path().to_string();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{path}");
        assert_eq!(location(&resp), format!("/auth/login/?next={path}"));
    }

    let unchanged = site.state.posts.find_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Target");
    assert!(site.state.comments.find_by_id(comment.id).await.unwrap().is_some());
}

#[actix_rt::test]
async fn test_non_author_is_sent_back_to_the_post() {
    let site = Site::new();
    let (alice, _) = site.user("alice").await;
    let (_bob, bob_token) = site.user("bob").await;
    let travel = site.category("travel", true).await;
    let target = site.post(&alice, &travel, "Target", true).await;
    let comment = site.comment(&alice, &target, "Original").await;
    let app = app!(site);

    let detail = format!("/posts/{}/", target.id);
    let edit_comment = format!("/posts/{}/edit_comment/{}/", target.id, comment.id);
    let delete_comment = format!("/posts/{}/delete_comment/{}/", target.id, comment.id);

    let requests = [
        get(&format!("/posts/{}/edit/", target.id), Some(bob_token.as_str())),
        post(&format!("/posts/{}/edit/", target.id), Some(bob_token.as_str()), post_body(&travel, "Defaced")),
        get(&format!("/posts/{}/delete/", target.id), Some(bob_token.as_str())),
        post(&format!("/posts/{}/delete/", target.id), Some(bob_token.as_str()), json!({})),
        get(&edit_comment, Some(bob_token.as_str())),
        post(&edit_comment, Some(bob_token.as_str()), json!({ "text": "Defaced" })),
        post(&delete_comment, Some(bob_token.as_str()), json!({})),
    ];

    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), detail);
    }

    let post = site.state.posts.find_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(post.title, "Target");
    let comment = site.state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(comment.text, "Original");
}

#[actix_rt::test]
async fn test_author_edits_and_deletes_a_post() {
    let site = Site::new();
    let (alice, alice_token) = site.user("alice").await;
    let travel = site.category("travel", true).await;
    let target = site.post(&alice, &travel, "Before", true).await;
    let app = app!(site);

    let edit = format!("/posts/{}/edit/", target.id);
    let form: Value = test::call_and_read_body_json(&app, get(&edit, Some(alice_token.as_str())).to_request()).await;
    assert_eq!(form["intent"], "edit");
    assert_eq!(form["form"]["title"], "Before");

    let resp = test::call_service(&app, post(&edit, Some(alice_token.as_str()), post_body(&travel, "After")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", target.id));
    let stored = site.state.posts.find_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "After");
    assert_eq!(stored.author_id, alice.id);

    let delete = format!("/posts/{}/delete/", target.id);
    let confirm: Value = test::call_and_read_body_json(&app, get(&delete, Some(alice_token.as_str())).to_request()).await;
    assert_eq!(confirm["intent"], "delete");

    let resp = test::call_service(&app, post(&delete, Some(alice_token.as_str()), json!({})).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/alice/");
    assert!(site.state.posts.find_by_id(target.id).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_missing_post_is_not_found_for_its_author_actions() {
    let site = Site::new();
    let (_alice, alice_token) = site.user("alice").await;
    let app = app!(site);

    let uri = format!("/posts/{}/edit/", Uuid::new_v4());
    let resp = test::call_service(&app, get(&uri, Some(alice_token.as_str())).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_comment_lifecycle() {
    let site = Site::new();
    let (alice, _) = site.user("alice").await;
    let (_bob, bob_token) = site.user("bob").await;
    let travel = site.category("travel", true).await;
    let target = site.post(&alice, &travel, "Discuss", true).await;
    let app = app!(site);

    let detail = format!("/posts/{}/", target.id);
    let resp = test::call_service(
        &app,
        post(&format!("{detail}comment/"), Some(bob_token.as_str()), json!({ "text": "First!" })).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), detail);

    let page: Value = test::call_and_read_body_json(&app, get(&detail, Some(bob_token.as_str())).to_request()).await;
    assert_eq!(page["post"]["comment_count"], 1);
    assert_eq!(page["comments"][0]["author"], "bob");
    assert_eq!(page["comment_form"]["text"], "");
    let comment_id = page["comments"][0]["id"].as_str().unwrap().to_string();

    let edit = format!("{detail}edit_comment/{comment_id}/");
    let resp = test::call_service(&app, post(&edit, Some(bob_token.as_str()), json!({ "text": "Edited" })).to_request()).await;
    assert_eq!(location(&resp), detail);

    let delete = format!("{detail}delete_comment/{comment_id}/");
    let confirm: Value = test::call_and_read_body_json(&app, get(&delete, Some(bob_token.as_str())).to_request()).await;
    assert_eq!(confirm["intent"], "delete");
    assert_eq!(confirm["form"]["text"], "Edited");

    let resp = test::call_service(&app, post(&delete, Some(bob_token.as_str()), json!({})).to_request()).await;
    assert_eq!(location(&resp), detail);

    let page: Value = test::call_and_read_body_json(&app, get(&detail, None).to_request()).await;
    assert!(page["comments"].as_array().unwrap().is_empty());
    assert!(page["comment_form"].is_null());
}

#[actix_rt::test]
async fn test_blank_comment_is_rejected() {
    let site = Site::new();
    let (alice, alice_token) = site.user("alice").await;
    let travel = site.category("travel", true).await;
    let target = site.post(&alice, &travel, "Discuss", true).await;
    let app = app!(site);

    let uri = format!("/posts/{}/comment/", target.id);
    let resp = test::call_service(&app, post(&uri, Some(alice_token.as_str()), json!({ "text": "   " })).to_request()).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn test_comment_on_hidden_post_is_not_found() {
    let site = Site::new();
    let (alice, _) = site.user("alice").await;
    let (_bob, bob_token) = site.user("bob").await;
    let travel = site.category("travel", true).await;
    let draft = site.post(&alice, &travel, "Draft", false).await;
    let app = app!(site);

    for post_id in [draft.id, Uuid::new_v4()] {
        let uri = format!("/posts/{post_id}/comment/");
        let resp = test::call_service(&app, post(&uri, Some(bob_token.as_str()), json!({ "text": "hi" })).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_rt::test]
async fn test_comment_under_another_post_is_not_found() {
    let site = Site::new();
    let (alice, alice_token) = site.user("alice").await;
    let travel = site.category("travel", true).await;
    let first = site.post(&alice, &travel, "First", true).await;
    let second = site.post(&alice, &travel, "Second", true).await;
    let comment = site.comment(&alice, &first, "On the first").await;
    let app = app!(site);

    let uri = format!("/posts/{}/edit_comment/{}/", second.id, comment.id);
    let resp = test::call_service(&app, get(&uri, Some(alice_token.as_str())).to_request()).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_register_then_login() {
    let site = Site::new();
    let app = app!(site);

    let registration = json!({ "username": "carol", "password1": PASSWORD, "password2": PASSWORD });
    let resp = test::call_service(&app, post("/auth/registration/", None, registration.clone()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let resp = test::call_service(&app, post("/auth/registration/", None, registration).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem: Value = test::read_body_json(resp).await;
    assert!(problem["errors"]["username"].is_array());

    let login = json!({ "username": "carol", "password": PASSWORD });
    let auth: Value = test::call_and_read_body_json(&app, post("/auth/login/", None, login).to_request()).await;
    assert_eq!(auth["token_type"], "Bearer");
    let token = auth["access_token"].as_str().unwrap();

    let form: Value = test::call_and_read_body_json(&app, get("/edit_profile/", Some(token)).to_request()).await;
    assert_eq!(form["form"]["username"], "carol");

    let wrong = json!({ "username": "carol", "password": "not-the-password" });
    let resp = test::call_service(&app, post("/auth/login/", None, wrong).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let unknown = json!({ "username": "nobody", "password": PASSWORD });
    let resp = test::call_service(&app, post("/auth/login/", None, unknown).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_registration_checks_passwords() {
    let site = Site::new();
    let app = app!(site);

    let body = json!({ "username": "dave", "password1": "12345678901", "password2": "12345678901" });
    let resp = test::call_service(&app, post("/auth/registration/", None, body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem: Value = test::read_body_json(resp).await;
    assert!(problem["errors"]["password2"].is_array());
}

#[actix_rt::test]
async fn test_edit_profile_renames_the_session_user() {
    let site = Site::new();
    let (alice, alice_token) = site.user("alice").await;
    site.user("bob").await;
    let app = app!(site);

    let taken = json!({ "username": "bob" });
    let resp = test::call_service(&app, post("/edit_profile/", Some(alice_token.as_str()), taken).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let changes = json!({ "username": "alicia", "email": "alicia@example.com", "first_name": "Alicia" });
    let resp = test::call_service(&app, post("/edit_profile/", Some(alice_token.as_str()), changes).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/alicia/");

    let profile: Value = test::call_and_read_body_json(&app, get("/profile/alicia/", None).to_request()).await;
    assert_eq!(profile["profile"]["id"], json!(alice.id));
    assert_eq!(profile["profile"]["first_name"], "Alicia");

    let resp = test::call_service(&app, get("/profile/alice/", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_bad_token_means_anonymous() {
    let site = Site::new();
    let app = app!(site);

    let resp = test::call_service(&app, get("/edit_profile/", Some("not-a-jwt")).to_request()).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/edit_profile/");
}

#[actix_rt::test]
async fn test_health_check() {
    let site = Site::new();
    let app = app!(site);

    let health: Value = test::call_and_read_body_json(&app, get("/health/", None).to_request()).await;

    assert_eq!(health["status"], "ok");
}

#[actix_rt::test]
async fn test_login_redirect_lands_on_the_login_form() {
    let site = Site::new();
    let app = app!(site);

    let resp = test::call_service(&app, get("/posts/create/", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = test::call_service(&app, get(&location(&resp), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["intent"], "create");
    assert_eq!(page["form"]["username"], "");
    assert_eq!(page["next"], "/posts/create/");

    let page: Value =
        test::call_and_read_body_json(&app, get("/auth/login/?next=//evil.example/", None).to_request()).await;
    assert!(page["next"].is_null());

    let page: Value = test::call_and_read_body_json(&app, get("/auth/registration/", None).to_request()).await;
    assert_eq!(page["form"]["password1"], "");
}

#[actix_rt::test]
async fn test_unknown_pages_get_a_problem_response() {
    let site = Site::new();
    let app = app!(site);

    for uri in ["/no/such/page/", "/posts/123/", "/posts/123/edit/", "/?page=abc"] {
        let resp = test::call_service(&app, get(uri, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        let problem: Value = test::read_body_json(resp).await;
        assert_eq!(problem["status"], 404, "{uri}");
    }

    let problem: Value = test::call_and_read_body_json(&app, get("/?page=abc", None).to_request()).await;
    assert_eq!(problem["detail"], "Invalid page.");
}
