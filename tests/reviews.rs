//! Smoke tests against a locally running server.
//!
//! These need `cargo run` with a seeded database on port 8000, so they are
//! ignored by default: `cargo test -- --ignored` runs them.

use reqwest::StatusCode;
use serde_json::json;

const BASE_URL: &str = "http://localhost:8000/api";

#[tokio::test]
#[ignore = "requires a running server and a seeded database"]
async fn creating_a_review_for_a_missing_restaurant_is_rejected() {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/reviews", BASE_URL))
        .header("Authorization", "Bearer test-session")
        .json(&json!({
            "rating": 5,
            "comment": "Great food",
            "restaurant_id": "no-such-restaurant"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running server and a seeded database"]
async fn restaurant_review_listing_only_returns_approved_reviews() {
    let client = reqwest::Client::new();

    let restaurants = client
        .get(format!("{}/restaurants", BASE_URL))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    let Some(restaurant_id) = restaurants["items"][0]["id"].as_str() else {
        return;
    };

    let reviews = client
        .get(format!("{}/restaurants/{}/reviews", BASE_URL, restaurant_id))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    for review in reviews.as_array().unwrap() {
        assert_eq!(review["is_approved"], json!(true));
    }
}

#[tokio::test]
#[ignore = "requires a running server and a seeded database"]
async fn out_of_range_ratings_are_rejected() {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/reviews", BASE_URL))
        .header("Authorization", "Bearer test-session")
        .json(&json!({
            "rating": 6,
            "restaurant_id": "no-such-restaurant"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
