//! メール送信エンドポイントの統合テスト
//!
//! `/sendCustomEmail` と `/sendTemplateEmail` は 200 / 400 / 405 / 500 のみを返し、
//! エラー本文はプレーンテキスト。

mod helpers;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use helpers::TestApp;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

#[tokio::test]
async fn test_カスタムメール_送信成功でメッセージidを返す() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/sendCustomEmail",
            json!({"to": "owner@example.com", "subject": "Hello", "html": "<p>Hi</p>"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["messageId"].as_str().is_some());
    assert_eq!(body["response"], "250 OK");
    assert_eq!(app.sender.sent_to("owner@example.com").len(), 1);
}

#[rstest]
#[case::to欠落(json!({"subject": "Hello", "html": "<p>Hi</p>"}))]
#[case::subject欠落(json!({"to": "owner@example.com", "html": "<p>Hi</p>"}))]
#[case::html欠落(json!({"to": "owner@example.com", "subject": "Hello"}))]
#[tokio::test]
async fn test_カスタムメール_必須項目が無ければ400(#[case] body: Value) {
    let app = TestApp::new();

    let (status, text) = app.request(Method::POST, "/sendCustomEmail", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.starts_with("Missing required field"));
    assert!(app.sender.sent_emails().is_empty());
}

#[tokio::test]
async fn test_カスタムメール_jsonでない本文は400() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/sendCustomEmail")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("to=owner@example.com"))
        .unwrap();

    let (status, text) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.starts_with("Invalid JSON body"));
}

#[rstest]
#[case::get(Method::GET)]
#[case::put(Method::PUT)]
#[case::delete(Method::DELETE)]
#[tokio::test]
async fn test_post以外は405(#[case] method: Method) {
    let app = TestApp::new();

    let (custom, _) = app.request(method.clone(), "/sendCustomEmail", None).await;
    let (template, _) = app.request(method, "/sendTemplateEmail", None).await;

    assert_eq!(custom, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(template, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_送信失敗は500でエラー文字列を返す() {
    let app = TestApp::new();
    app.sender.fail_for("bounce@example.com");

    let (status, text) = app
        .request(
            Method::POST,
            "/sendCustomEmail",
            Some(json!({"to": "bounce@example.com", "subject": "Hello", "html": "<p>Hi</p>"})),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(text.contains("bounce@example.com"));
}

#[tokio::test]
async fn test_テンプレートメール_動的データを差し込んで送る() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/sendTemplateEmail",
            json!({
                "to": "owner@example.com",
                "subject": "Welcome to PawCare",
                "templateId": "welcome",
                "dynamic_template_data": {"name": "Meera"},
                "cc": "ops@pawcare.example.com"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let sent = app.sender.sent_to("owner@example.com");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Welcome to PawCare");
    assert!(sent[0].html_body.contains("Meera"));
    assert_eq!(sent[0].cc, vec!["ops@pawcare.example.com"]);
}

#[tokio::test]
async fn test_テンプレートメール_未知のテンプレートidは400() {
    let app = TestApp::new();

    let (status, text) = app
        .request(
            Method::POST,
            "/sendTemplateEmail",
            Some(json!({"to": "owner@example.com", "subject": "Hi", "templateId": "missing"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.contains("missing"));
}

#[tokio::test]
async fn test_プリフライトにcorsヘッダーを返す() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/sendCustomEmail")
        .header(header::ORIGIN, "https://shop.pawcare.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_ヘルスチェック() {
    let app = TestApp::new();

    let (status, body) = app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_レスポンスにリクエストidを付与する() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
