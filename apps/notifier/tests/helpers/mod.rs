//! 統合テスト用ハーネス
//!
//! インメモリのストアとモックの送信を Router・トリガーに接続する。
//! チェンジフィードに溜まったイベントは [`TestApp::drain`] で同期的に処理する。

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use pawcare_domain::clock::{Clock, FixedClock};
use pawcare_infra::{
    ChangeFeed,
    ChangeStream,
    DocumentStore,
    mock::{InMemoryDocumentStore, MockNotificationSender},
};
use pawcare_notifier::{
    app_builder::{AppDependencies, build_app},
    usecase::{Mailer, NotificationTriggers, ScheduledEmailSweeper, TemplateRenderer},
};
use serde_json::Value;
use tower::ServiceExt;

pub const BUSINESS_EMAIL: &str = "ops@pawcare.example.com";
pub const BASE_URL: &str = "https://pawcare.example.com";

/// 2026-02-01T00:00:00Z
pub const NOW: i64 = 1_769_904_000;

pub struct TestApp {
    pub router:   Router,
    pub store:    InMemoryDocumentStore,
    pub sender:   MockNotificationSender,
    pub triggers: NotificationTriggers,
    pub sweeper:  ScheduledEmailSweeper,
    stream:       ChangeStream,
}

impl TestApp {
    pub fn new() -> Self {
        Self::at(NOW)
    }

    /// 時計を固定した時刻で構築する
    pub fn at(timestamp: i64) -> Self {
        let (feed, stream) = ChangeFeed::channel();
        let store = InMemoryDocumentStore::with_change_feed(feed);
        let sender = MockNotificationSender::new();
        let shared_store: Arc<dyn DocumentStore> = Arc::new(store.clone());
        let renderer = Arc::new(TemplateRenderer::new().unwrap());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_timestamp(timestamp));
        let mailer = Arc::new(Mailer::new(
            shared_store.clone(),
            Arc::new(sender.clone()),
            renderer.clone(),
            BASE_URL.to_string(),
        ));
        let triggers = NotificationTriggers::new(
            shared_store.clone(),
            mailer.clone(),
            BUSINESS_EMAIL.to_string(),
            clock.clone(),
        );
        let sweeper = ScheduledEmailSweeper::new(shared_store.clone(), mailer, clock.clone());
        let router = build_app(AppDependencies {
            store: shared_store,
            sender: Arc::new(sender.clone()),
            renderer,
            clock,
        });

        Self {
            router,
            store,
            sender,
            triggers,
            sweeper,
            stream,
        }
    }

    /// 配信済みのイベントをすべてトリガーに渡す
    ///
    /// トリガーの書き込みが新たなイベントを生む場合もあるため、空になるまで繰り返す。
    pub async fn drain(&mut self) {
        while let Some(event) = self.stream.try_next() {
            self.triggers.handle(event).await;
        }
    }

    /// JSON ボディでリクエストを送り、ステータスと本文を返す
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, text) = self.request(Method::POST, uri, Some(body)).await;
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, text) = self.request(Method::GET, uri, None).await;
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }
}
