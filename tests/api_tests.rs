use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{Value, json};
use storerate::config::Config;
use storerate::db::Storage;
use storerate::domain::Role;
use storerate::entities::{ratings, stores, users};
use storerate::models::NewUser;
use storerate::services::auth_service_impl::create_account;
use storerate::state::SharedState;
use tower::ServiceExt;

const PASSWORD: &str = "Secret#123";

struct TestApp {
    router: Router,
    storage: Storage,
    config: Config,
}

impl TestApp {
    async fn spawn() -> Self {
        let mut config = Config::default();
        config.general.database_path = "sqlite::memory:".to_string();
        config.security.argon2_memory_cost_kib = 1024;
        config.security.argon2_time_cost = 1;

        let storage = Storage::new("sqlite::memory:")
            .await
            .expect("Failed to open database");
        let shared = SharedState::with_storage(config.clone(), storage.clone());
        let state = storerate::api::create_app_state(Arc::new(shared), None);

        Self {
            router: storerate::api::router(state),
            storage,
            config,
        }
    }

    /// Creates an account directly and logs it in, returning the bearer token.
    async fn account(&self, name: &str, email: &str, role: Role) -> String {
        create_account(
            &self.storage,
            &self.config.security,
            NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
                address: "12 Market Street".to_string(),
                role,
            },
        )
        .await
        .expect("Failed to create account");

        self.login(email).await
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create_store(&self, owner_token: &str, name: &str) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/stores/create",
                Some(owner_token),
                Some(json!({
                    "name": name,
                    "email": format!("{}@shops.test", name.to_lowercase().replace(' ', "")),
                    "address": "1 High Street",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "store creation failed: {body}");
        body["data"]["store"]["id"].as_i64().unwrap()
    }

    async fn rate(&self, token: &str, store_id: i64, rating: i64) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/ratings/submit",
            Some(token),
            Some(json!({ "store_id": store_id, "rating": rating, "comment": "ok" })),
        )
        .await
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_signup_and_profile() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(
            "POST",
            "/auth/signup",
            None,
            Some(json!({
                "name": "Alexandra Wilhelmina Jones",
                "email": "alex@example.com",
                "password": PASSWORD,
                "address": "7 Elm Road",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("password").is_none());
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app.send("GET", "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "alex@example.com");

    let (status, body) = app
        .send(
            "POST",
            "/auth/signup",
            None,
            Some(json!({
                "name": "Alexandra Wilhelmina Jones",
                "email": "alex@example.com",
                "password": PASSWORD,
                "address": "7 Elm Road",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(
            "POST",
            "/auth/signup",
            None,
            Some(json!({
                "name": "Short",
                "email": "not-an-email",
                "password": "weak",
                "address": "7 Elm Road",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::spawn().await;
    app.account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;

    let (status, body) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "user@example.com", "password": "Wrong#1234" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_authentication_required() {
    let app = TestApp::spawn().await;

    let (status, _) = app.send("GET", "/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/auth/profile", Some("not-a-real-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Anonymous callers are rejected before the body is validated
    let (status, _) = app
        .send(
            "POST",
            "/ratings/submit",
            None,
            Some(json!({ "store_id": 1, "rating": 9 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_enforcement() {
    let app = TestApp::spawn().await;
    let user = app
        .account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;

    let (status, _) = app
        .send("GET", "/admin/dashboard", Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            "POST",
            "/stores/create",
            Some(&user),
            Some(json!({ "name": "Nope", "email": "nope@shops.test", "address": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send("GET", "/does/not/exist", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["path"], "/does/not/exist");
}

#[tokio::test]
async fn test_rating_lifecycle() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    let user = app
        .account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;
    let store_id = app.create_store(&owner, "Corner Bakery").await;

    let (status, body) = app.rate(&user, store_id, 5).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["store_stats"]["average_rating"], "5.0");
    assert_eq!(body["data"]["store_stats"]["total_ratings"], 1);
    assert_eq!(body["data"]["store_stats"]["star_breakdown"]["five_star"], 1);
    let rating_id = body["data"]["rating"]["id"].as_i64().unwrap();

    // A second submission hands back the existing rating
    let (status, body) = app.rate(&user, store_id, 2).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["data"]["existing_rating"]["id"], rating_id);
    assert_eq!(body["data"]["existing_rating"]["rating"], 5);

    let (_, body) = app
        .send("GET", &format!("/stores/{store_id}"), None, None)
        .await;
    assert_eq!(body["data"]["store"]["rating_info"]["total_ratings"], 1);
    assert_eq!(body["data"]["store"]["rating_info"]["average_rating"], "5.0");

    let (status, body) = app
        .send(
            "PUT",
            &format!("/ratings/{rating_id}"),
            Some(&user),
            Some(json!({ "rating": 3, "comment": "changed my mind" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["store_stats"]["average_rating"], "3.0");

    let (status, body) = app
        .send("GET", &format!("/stores/{store_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["store"]["rating_info"]["average_rating"], "3.0");
    assert_eq!(
        body["data"]["store"]["rating_info"]["star_breakdown"]["three_star"],
        1
    );

    let (status, body) = app
        .send("DELETE", &format!("/ratings/{rating_id}"), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted_rating"]["store_name"], "Corner Bakery");
    assert_eq!(body["data"]["updated_store_stats"]["total_ratings"], 0);
    assert_eq!(body["data"]["updated_store_stats"]["average_rating"], "0.0");
}

#[tokio::test]
async fn test_rating_out_of_range() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    let user = app
        .account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;
    let store_id = app.create_store(&owner, "Corner Bakery").await;

    let (status, _) = app.rate(&user, store_id, 6).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.rate(&user, 9999, 4).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_author_may_change_rating() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    let admin = app
        .account("Platform Administrator", "admin@example.com", Role::Admin)
        .await;
    let author = app
        .account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;
    let other = app
        .account("Another Person Of The Town", "other@example.com", Role::User)
        .await;
    let store_id = app.create_store(&owner, "Corner Bakery").await;

    let (_, body) = app.rate(&author, store_id, 4).await;
    let rating_id = body["data"]["rating"]["id"].as_i64().unwrap();
    let uri = format!("/ratings/{rating_id}");

    for token in [other.as_str(), admin.as_str(), owner.as_str()] {
        let (status, _) = app
            .send("PUT", &uri, Some(token), Some(json!({ "rating": 1 })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send("DELETE", &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, body) = app.send("GET", &uri, Some(&author), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"]["rating"], 4);
}

#[tokio::test]
async fn test_store_listing_filters_and_sorting() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    app.create_store(&owner, "Anna's Books").await;
    app.create_store(&owner, "Hardware Depot").await;
    app.create_store(&owner, "SUSANNA Flowers").await;

    let (status, body) = app
        .send("GET", "/stores/all?name=anna&sortBy=name&sortOrder=asc", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    let names: Vec<&str> = body["data"]["stores"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Anna's Books", "SUSANNA Flowers"]);
    assert_eq!(body["data"]["filters_applied"]["name"], "anna");
    assert_eq!(body["data"]["sorting"]["sort_by"], "name");
    assert_eq!(body["data"]["sorting"]["sort_order"], "asc");

    // Unknown sort columns fall back to the default
    let (status, body) = app
        .send("GET", "/stores/all?sortBy=password;drop", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["sorting"]["sort_by"], "created_at");
    assert_eq!(body["data"]["sorting"]["sort_order"], "desc");
}

#[tokio::test]
async fn test_store_listing_includes_own_rating() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    let user = app
        .account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;
    let store_id = app.create_store(&owner, "Corner Bakery").await;
    app.rate(&user, store_id, 4).await;

    let (_, body) = app.send("GET", "/stores/all", Some(&user), None).await;
    assert_eq!(body["data"]["stores"][0]["user_rating"]["rating"], 4);
    assert_eq!(body["data"]["stores"][0]["rating_info"]["average_rating"], "4.0");

    let (_, body) = app.send("GET", "/stores/all", None, None).await;
    assert!(body["data"]["stores"][0]["user_rating"].is_null());
}

#[tokio::test]
async fn test_admin_creates_owner_and_store() {
    let app = TestApp::spawn().await;
    let admin = app
        .account("Platform Administrator", "admin@example.com", Role::Admin)
        .await;
    app.account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;

    let (status, body) = app
        .send(
            "POST",
            "/admin/users/create",
            Some(&admin),
            Some(json!({
                "name": "Newly Appointed Store Owner",
                "email": "newowner@example.com",
                "password": PASSWORD,
                "address": "3 Mill Lane",
                "role": "store_owner",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["role"], "store_owner");
    let owner_id = body["data"]["user"]["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            "POST",
            "/admin/stores/create",
            Some(&admin),
            Some(json!({
                "name": "Mill Lane Grocers",
                "email": "grocers@shops.test",
                "address": "3 Mill Lane",
                "ownerId": owner_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(
        body["data"]["store"]["owner_name"],
        "Newly Appointed Store Owner"
    );

    let (_, body) = app
        .send("GET", "/admin/users?role=user", Some(&admin), None)
        .await;
    assert_eq!(body["data"]["total"], 1);
    let user_id = body["data"]["users"][0]["id"].as_i64().unwrap();

    let (status, _) = app
        .send(
            "POST",
            "/admin/stores/create",
            Some(&admin),
            Some(json!({
                "name": "Should Fail",
                "email": "fail@shops.test",
                "address": "nowhere",
                "owner_id": user_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send("GET", "/admin/dashboard", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dashboard"]["total_stores"], 1);
}

#[tokio::test]
async fn test_owner_dashboard() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    let first = app
        .account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;
    let second = app
        .account("Another Person Of The Town", "other@example.com", Role::User)
        .await;

    let rated = app.create_store(&owner, "Corner Bakery").await;
    app.create_store(&owner, "Empty Shop").await;

    app.rate(&first, rated, 5).await;
    app.rate(&second, rated, 4).await;

    let (status, body) = app
        .send("GET", "/store-owner/dashboard", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let overview = &body["data"]["overview"];
    assert_eq!(overview["total_stores"], 2);
    assert_eq!(overview["total_ratings_received"], 2);
    // The unrated store does not drag the average down
    assert_eq!(overview["overall_average_rating"], "4.5");

    let (status, body) = app
        .send("GET", "/store-owner/ratings/users", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["stores_included"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .send("GET", "/store-owner/dashboard", Some(&first), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_change_password_rotates_token() {
    let app = TestApp::spawn().await;
    let token = app
        .account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;

    let (status, body) = app
        .send(
            "PUT",
            "/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": PASSWORD, "newPassword": "Another#456" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let new_token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = app.send("GET", "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/auth/profile", Some(&new_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

/// Outside any trailing statistics window.
const LONG_AGO: &str = "2000-01-01T00:00:00.000000Z";

#[tokio::test]
async fn test_store_changes_are_owner_only() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    let rival = app
        .account("Owner Of The Rival Shop", "rival@example.com", Role::StoreOwner)
        .await;
    let admin = app
        .account("Platform Administrator", "admin@example.com", Role::Admin)
        .await;
    let store_id = app.create_store(&owner, "Corner Bakery").await;
    let uri = format!("/stores/{store_id}");

    for token in [rival.as_str(), admin.as_str()] {
        let (status, _) = app
            .send("PUT", &uri, Some(token), Some(json!({ "name": "Taken Over" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send("DELETE", &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (_, body) = app.send("GET", &uri, None, None).await;
    assert_eq!(body["data"]["store"]["name"], "Corner Bakery");

    let (status, body) = app
        .send("PUT", &uri, Some(&owner), Some(json!({ "name": "Corner Patisserie" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["store"]["name"], "Corner Patisserie");

    let (status, _) = app.send("DELETE", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_store_email() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    app.create_store(&owner, "Corner Bakery").await;
    let second = app.create_store(&owner, "Hardware Depot").await;

    let (status, body) = app
        .send(
            "POST",
            "/stores/create",
            Some(&owner),
            Some(json!({
                "name": "Another Bakery",
                "email": "cornerbakery@shops.test",
                "address": "2 High Street",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/stores/{second}"),
            Some(&owner),
            Some(json!({ "email": "cornerbakery@shops.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app
        .send("GET", &format!("/stores/{second}"), None, None)
        .await;
    assert_eq!(body["data"]["store"]["email"], "hardwaredepot@shops.test");
}

#[tokio::test]
async fn test_average_ties_round_up() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    let store_id = app.create_store(&owner, "Corner Bakery").await;

    let mut last = Value::Null;
    for (i, stars) in [4, 4, 4, 5].into_iter().enumerate() {
        let token = app
            .account(
                &format!("Regular Person Number {i} Here"),
                &format!("rater{i}@example.com"),
                Role::User,
            )
            .await;
        let (status, body) = app.rate(&token, store_id, stars).await;
        assert_eq!(status, StatusCode::CREATED);
        last = body;
    }

    // 17 / 4 = 4.25
    assert_eq!(last["data"]["store_stats"]["average_rating"], "4.3");
    assert_eq!(last["data"]["store_stats"]["total_ratings"], 4);
}

#[tokio::test]
async fn test_store_listing_folds_non_ascii_case() {
    let app = TestApp::spawn().await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    app.create_store(&owner, "École Café").await;
    app.create_store(&owner, "Hardware Depot").await;

    for query in ["name=%C3%A9cole", "name=CAF%C3%89", "name=cole"] {
        let (status, body) = app
            .send("GET", &format!("/stores/all?{query}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1, "query {query}");
        assert_eq!(body["data"]["stores"][0]["name"], "École Café");
    }
}

#[tokio::test]
async fn test_admin_dashboard_window() {
    let app = TestApp::spawn().await;
    let admin = app
        .account("Platform Administrator", "admin@example.com", Role::Admin)
        .await;
    let owner = app
        .account("Owner Of Several Shops", "owner@example.com", Role::StoreOwner)
        .await;
    let user = app
        .account("Regular Person Of The Town", "user@example.com", Role::User)
        .await;
    let fresh = app.create_store(&owner, "Corner Bakery").await;
    let old = app.create_store(&owner, "Hardware Depot").await;

    app.rate(&user, fresh, 5).await;
    let (_, body) = app.rate(&user, old, 2).await;
    let old_rating = body["data"]["rating"]["id"].as_i64().unwrap();

    let conn = &app.storage.conn;
    stores::Entity::update_many()
        .col_expr(stores::Column::CreatedAt, Expr::value(LONG_AGO))
        .filter(stores::Column::Id.eq(old))
        .exec(conn)
        .await
        .unwrap();
    ratings::Entity::update_many()
        .col_expr(ratings::Column::CreatedAt, Expr::value(LONG_AGO))
        .filter(ratings::Column::Id.eq(old_rating))
        .exec(conn)
        .await
        .unwrap();
    users::Entity::update_many()
        .col_expr(users::Column::CreatedAt, Expr::value(LONG_AGO))
        .filter(users::Column::Email.eq("user@example.com"))
        .exec(conn)
        .await
        .unwrap();

    let (status, body) = app
        .send("GET", "/admin/dashboard", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let dashboard = &body["data"]["dashboard"];
    assert_eq!(dashboard["total_users"], 3);
    assert_eq!(dashboard["total_stores"], 2);
    assert_eq!(dashboard["total_ratings"], 2);
    assert_eq!(dashboard["average_platform_rating"], "3.5");

    let recent = &dashboard["recent_activity"];
    assert_eq!(recent["users_this_month"], 2);
    assert_eq!(recent["stores_this_month"], 1);
    assert_eq!(recent["ratings_this_month"], 1);
}
