#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, unreachable_pub, clippy::similar_names)]
use axum::http::StatusCode;
use serde_json::Value;
mod common;

async fn first_id(app: &common::TestApp) -> String {
    let grid = app.grid(&[]).await;
    grid["data"][0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_add_then_list() {
    let app = common::TestApp::spawn().await;

    let body = app.add_message("A", "hi").await;
    assert_eq!(body["result"], "success");
    assert_eq!(body["message"], "The message successfully added!");

    let grid = app.grid(&[("start", "0"), ("length", "15")]).await;
    assert_eq!(grid["draw"], "1");
    assert_eq!(grid["recordsTotal"], 1);
    assert_eq!(grid["recordsFiltered"], 1);
    assert_eq!(grid["data"].as_array().unwrap().len(), 1);
    assert_eq!(grid["data"][0]["author"], "A");
    assert_eq!(grid["data"][0]["message"], "hi");
    assert_eq!(grid["data"][0]["_seq"], 1);
    assert!(grid["data"][0].get("deleted").is_none());
}

#[tokio::test]
async fn test_add_rejects_short_message() {
    let app = common::TestApp::spawn().await;

    let body = app.add_message("A", "h").await;
    assert_eq!(body["result"], "warning");
    assert_eq!(body["message"], "Please check your data entered!");
    assert_eq!(body["errors"]["message"][0], "Field must be at least 2 characters long.");
    assert_eq!(body["form"]["author"], "A");

    let grid = app.grid(&[]).await;
    assert_eq!(grid["recordsTotal"], 0);
}

#[tokio::test]
async fn test_add_rejects_blank_author() {
    let app = common::TestApp::spawn().await;

    let body = app.add_message("   ", "hello").await;
    assert_eq!(body["result"], "warning");
    assert!(body["errors"]["author"].is_array());
}

#[tokio::test]
async fn test_add_form_page() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/add", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Messages :: Add"));
    assert!(html.contains("Add a message"));
}

#[tokio::test]
async fn test_add_from_browser_redirects_to_listing() {
    let app = common::TestApp::spawn().await;

    let resp = app
        .client
        .post(format!("{}/add", app.server_url))
        .form(&[("author", "A"), ("message", "hi")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");
}

#[tokio::test]
async fn test_invalid_browser_submission_rerenders_form() {
    let app = common::TestApp::spawn().await;

    let resp = app
        .client
        .post(format!("{}/add", app.server_url))
        .form(&[("author", "A"), ("message", "h")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Please check your data entered!"));
    assert!(html.contains("Field must be at least 2 characters long."));
}

#[tokio::test]
async fn test_modal_form_has_no_chrome() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/add?format=modal", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Add a message"));
    assert!(!html.contains("<html"));
}

#[tokio::test]
async fn test_edit_updates_live_message() {
    let app = common::TestApp::spawn().await;
    app.add_message("A", "hi").await;
    let id = first_id(&app).await;

    let body = app.post_json("/edit", &[("id", &id), ("author", "B"), ("message", "hello")]).await;
    assert_eq!(body["result"], "success");
    assert_eq!(body["message"], "The message successfully updated!");
    assert_eq!(body["form"]["author"], "B");

    let grid = app.grid(&[]).await;
    assert_eq!(grid["data"][0]["author"], "B");
    assert_eq!(grid["data"][0]["message"], "hello");
    assert_eq!(grid["recordsTotal"], 1);
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = common::TestApp::spawn().await;
    app.add_message("Alice", "hi there").await;
    let id = first_id(&app).await;

    let resp = app.client.get(format!("{}/edit?id={id}", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Messages :: Edit"));
    assert!(html.contains("Alice"));
    assert!(html.contains("hi there"));
}

#[tokio::test]
async fn test_edit_unknown_id_is_not_found() {
    let app = common::TestApp::spawn().await;

    let body = app.post_json("/edit", &[("id", "42"), ("author", "B"), ("message", "hello")]).await;
    assert_eq!(body["result"], "warning");
    assert_eq!(body["message"], "The message not found or deleted!");

    let body = app.post_json("/edit", &[("id", "not-a-number")]).await;
    assert_eq!(body["result"], "warning");
}

#[tokio::test]
async fn test_edit_validation_keeps_stored_message() {
    let app = common::TestApp::spawn().await;
    app.add_message("A", "hi").await;
    let id = first_id(&app).await;

    let body = app.post_json("/edit", &[("id", &id), ("author", "B"), ("message", "x")]).await;
    assert_eq!(body["result"], "warning");
    assert_eq!(body["message"], "Please check your data entered!");

    let grid = app.grid(&[]).await;
    assert_eq!(grid["data"][0]["author"], "A");
}

#[tokio::test]
async fn test_soft_delete_hides_message_everywhere() {
    let app = common::TestApp::spawn().await;
    app.add_message("A", "hi").await;
    app.add_message("B", "there").await;
    let id = first_id(&app).await;

    let body = app.post_json("/delete", &[("id", &id)]).await;
    assert_eq!(body["result"], "dark");
    assert_eq!(body["message"], "The message successfully deleted!");

    let grid = app.grid(&[]).await;
    assert_eq!(grid["recordsTotal"], 1);
    assert_eq!(common::authors(&grid), vec!["B"]);

    let body = app.post_json("/delete", &[("id", &id)]).await;
    assert_eq!(body["result"], "warning");
    assert_eq!(body["message"], "The message not found or deleted!");

    let body = app.post_json("/edit", &[("id", &id), ("author", "C"), ("message", "again")]).await;
    assert_eq!(body["result"], "warning");

    let body: Value =
        app.client.get(format!("{}/info?id={id}", app.server_url)).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["result"], "warning");

    // The row itself is retained.
    let deleted: bool = sqlx::query_scalar("SELECT deleted FROM messages WHERE id = ?")
        .bind(id.parse::<i64>().unwrap())
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(deleted);
}

#[tokio::test]
async fn test_delete_from_browser_redirects() {
    let app = common::TestApp::spawn().await;
    app.add_message("A", "hi").await;
    let id = first_id(&app).await;

    let resp = app.client.get(format!("{}/delete?id={id}", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app.client.get(format!("{}/delete?id={id}", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.grid(&[]).await["recordsTotal"], 0);
}

#[tokio::test]
async fn test_info_returns_escaped_fields() {
    let app = common::TestApp::spawn().await;
    app.add_message("<b>x</b>", "it's \"quoted\"").await;
    let id = first_id(&app).await;

    let body: Value =
        app.client.get(format!("{}/info?id={id}", app.server_url)).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["result"], "success");
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["author"], "&lt;b&gt;x&lt;/b&gt;");
    assert_eq!(body["data"]["message"], "it&#39;s &#34;quoted&#34;");
}

#[tokio::test]
async fn test_listing_page_without_draw() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Author"));
    assert!(html.contains("Message"));
}
