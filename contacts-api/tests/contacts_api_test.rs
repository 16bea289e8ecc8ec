//! API tests for the contact endpoints
//!
//! CRUD, ownership isolation between users, search filters, pagination and
//! upcoming birthdays. Date-window edge cases are covered by the gateway's
//! unit tests with an injected date; here the window is anchored on today.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Duration, Utc};
use common::{contact_json, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_contacts_require_auth() {
    let ctx = TestContext::new();

    let (status, _) = ctx.get("/contacts", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.get("/contacts", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_contact_crud_round_trip() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("owner", "owner@example.com").await;

    let (status, created) = ctx
        .post(
            "/contacts",
            Some(&token),
            contact_json("John", "Doe", "john@example.com", "1990-05-15"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["first_name"], "John");
    assert_eq!(created["birthday"], "1990-05-15");
    assert!(created.get("user_id").is_none());

    let (status, fetched) = ctx.get(&format!("/contacts/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let mut replacement = contact_json("Johnny", "Doe", "johnny@example.com", "1991-06-16");
    replacement["additional_data"] = json!("Met at conference");
    let (status, updated) = ctx
        .put(&format!("/contacts/{}", id), Some(&token), replacement)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["first_name"], "Johnny");
    assert_eq!(updated["additional_data"], "Met at conference");

    let (status, body) = ctx.delete(&format!("/contacts/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact deleted successfully");

    let (status, _) = ctx.get(&format!("/contacts/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contacts_are_isolated_between_users() {
    let ctx = TestContext::new();
    let (_, alice) = ctx.signup("alice", "alice@example.com").await;
    let (_, bob) = ctx.signup("bob", "bob@example.com").await;

    let (_, contact) = ctx
        .post(
            "/contacts",
            Some(&alice),
            contact_json("Secret", "Friend", "friend@example.com", "1990-01-01"),
        )
        .await;
    let uri = format!("/contacts/{}", contact["id"]);

    let (status, body) = ctx.get(&uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Contact not found");

    let (status, _) = ctx
        .put(
            &uri,
            Some(&bob),
            contact_json("Hijacked", "Friend", "friend@example.com", "1990-01-01"),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.delete(&uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bobs) = ctx.get("/contacts", Some(&bob)).await;
    assert_eq!(bobs, json!([]));

    let (status, still_there) = ctx.get(&uri, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(still_there["first_name"], "Secret");
}

#[tokio::test]
async fn test_non_numeric_contact_id_is_validation_error() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("owner", "owner@example.com").await;

    let (status, body) = ctx.get("/contacts/abc", Some(&token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = ctx
        .put(
            "/contacts/abc",
            Some(&token),
            contact_json("John", "Doe", "john@example.com", "1990-05-15"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = ctx.delete("/contacts/abc", Some(&token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_contact_validation() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("owner", "owner@example.com").await;

    let (status, body) = ctx
        .post(
            "/contacts",
            Some(&token),
            contact_json("John", "Doe", "not-an-email", "1990-05-15"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "email");

    let (status, _) = ctx
        .post(
            "/contacts",
            Some(&token),
            contact_json("John", "Doe", "john@example.com", "1990-13-45"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_search_filters_case_insensitive() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("owner", "owner@example.com").await;

    for (first, last, email) in [
        ("Anna", "Smith", "anna@work.com"),
        ("Joanna", "Brown", "jo@home.org"),
        ("Bob", "Smithson", "bob@work.com"),
    ] {
        ctx.post(
            "/contacts",
            Some(&token),
            contact_json(first, last, email, "1990-01-01"),
        )
        .await;
    }

    let (status, found) = ctx.get("/contacts?first_name=ANN", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["first_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Anna", "Joanna"]);

    let (_, found) = ctx
        .get("/contacts?last_name=smith&email=WORK", Some(&token))
        .await;
    assert_eq!(found.as_array().unwrap().len(), 2);

    // LIKE wildcards are matched literally
    let (_, found) = ctx.get("/contacts?email=%25", Some(&token)).await;
    assert_eq!(found, json!([]));
}

#[tokio::test]
async fn test_pagination() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("owner", "owner@example.com").await;

    for i in 0..5 {
        ctx.post(
            "/contacts",
            Some(&token),
            contact_json(&format!("Person{}", i), "Test", &format!("p{}@example.com", i), "1990-01-01"),
        )
        .await;
    }

    let (_, page) = ctx.get("/contacts?skip=1&limit=2", Some(&token)).await;
    let names: Vec<&str> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["first_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Person1", "Person2"]);

    let (status, _) = ctx.get("/contacts?limit=-1", Some(&token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = ctx.get("/contacts?skip=abc", Some(&token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upcoming_birthdays_endpoint() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signup("owner", "owner@example.com").await;

    // Year 2000 is a leap year, so Feb 29 stays representable
    let today = Utc::now().date_naive();
    let soon = today.with_year(2000).unwrap();
    let later = (today + Duration::days(30)).with_year(2000).unwrap();

    ctx.post(
        "/contacts",
        Some(&token),
        contact_json("Soon", "Birthday", "soon@example.com", &soon.to_string()),
    )
    .await;
    ctx.post(
        "/contacts",
        Some(&token),
        contact_json("Later", "Birthday", "later@example.com", &later.to_string()),
    )
    .await;

    let (status, upcoming) = ctx.get("/contacts/birthdays/upcoming", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = upcoming
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["first_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Soon"]);
}
