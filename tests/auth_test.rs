//! Registration and login gating: pending accounts cannot log in until
//! approved, and duplicate or malformed registrations are refused.

mod common;

use common::{signup, start_server};
use serde_json::json;

#[tokio::test]
async fn pending_account_cannot_log_in() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    signup(&server.base_url, "alice", "alice@example.test").await;

    let resp = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({"username": "alice", "password": "hunter22"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert_eq!(resp.text().await.unwrap(), "Account pending admin approval");
}

#[tokio::test]
async fn approved_account_logs_in_and_uses_the_api() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let user_id = signup(&server.base_url, "carol", "carol@example.test").await;

    let resp = client
        .post(format!(
            "{}/api/admin/approve-user/{user_id}",
            server.base_url
        ))
        .bearer_auth(server.admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({"username": "carol", "password": "hunter22"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["status"], "approved");
    let token = body["token"].as_str().unwrap().to_string();

    // The issued token opens the data API
    let resp = client
        .get(format!("{}/api/data", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let data: serde_json::Value = resp.json().await.unwrap();
    assert!(data["patients"].is_array());
    assert!(data["staff"].is_array());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let user_id = signup(&server.base_url, "dave", "dave@example.test").await;
    client
        .post(format!(
            "{}/api/admin/approve-user/{user_id}",
            server.base_url
        ))
        .bearer_auth(server.admin_token())
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({"username": "dave", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Unknown usernames get the same answer
    let resp = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({"username": "nobody", "password": "hunter22"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    signup(&server.base_url, "erin", "erin@example.test").await;

    let resp = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "username": "erin",
            "email": "other@example.test",
            "password": "hunter22",
            "fullName": "Erin Two",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let resp = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "username": "erin2",
            "email": "erin@example.test",
            "password": "hunter22",
            "fullName": "Erin Two",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn signup_requires_all_fields() {
    let server = start_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "username": "frank",
            "email": "",
            "password": "hunter22",
            "fullName": "Frank",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn protected_routes_refuse_missing_or_non_admin_tokens() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/data", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let staff_token = server.token_for("staff-1", "bob", "staff");
    let resp = client
        .get(format!("{}/api/admin/users", server.base_url))
        .bearer_auth(&staff_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}
