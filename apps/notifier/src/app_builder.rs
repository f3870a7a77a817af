//! # Notifier アプリケーション構築
//!
//! ユースケース・State の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化・バックグラウンドタスク起動・サーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use pawcare_domain::clock::Clock;
use pawcare_infra::{DocumentStore, notification::NotificationSender};
use pawcare_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    handler::{
        DashboardState,
        EmailState,
        RecordState,
        ReviewState,
        StatusState,
        bulk_update_order_status,
        create_appointment,
        create_booking,
        create_order,
        create_prescription,
        get_order_summary,
        health_check,
        list_review_requests,
        respond_review_request,
        send_custom_email,
        send_template_email,
        update_appointment_status,
        update_booking_status,
        update_order_status,
    },
    usecase::{
        DashboardUseCaseImpl,
        EmailUseCaseImpl,
        RecordUseCaseImpl,
        ReviewUseCaseImpl,
        StatusUseCaseImpl,
        TemplateRenderer,
    },
};

/// ルーターが依存するコンポーネント
///
/// トリガー・スイーパーと同じインスタンスを共有する。
#[derive(Clone)]
pub struct AppDependencies {
    pub store:    Arc<dyn DocumentStore>,
    pub sender:   Arc<dyn NotificationSender>,
    pub renderer: Arc<TemplateRenderer>,
    pub clock:    Arc<dyn Clock>,
}

/// ブラウザのクライアントから呼ばれるため、オリジンを問わず許可する
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// State の組み立てとルーター定義を行う
pub fn build_app(deps: AppDependencies) -> Router {
    let email_state = Arc::new(EmailState {
        usecase: EmailUseCaseImpl::new(deps.sender.clone(), deps.renderer.clone()),
    });
    let record_state = Arc::new(RecordState {
        usecase: RecordUseCaseImpl::new(deps.store.clone(), deps.clock.clone()),
    });
    let status_state = Arc::new(StatusState {
        usecase: StatusUseCaseImpl::new(deps.store.clone(), deps.clock.clone()),
    });
    let review_state = Arc::new(ReviewState {
        usecase: ReviewUseCaseImpl::new(deps.store.clone(), deps.clock.clone()),
    });
    let dashboard_state = Arc::new(DashboardState {
        usecase: DashboardUseCaseImpl::new(deps.store.clone()),
    });

    Router::new()
        .route("/health", get(health_check))
        // メール送信 API（POST 以外は 405）
        .route("/sendCustomEmail", post(send_custom_email))
        .route("/sendTemplateEmail", post(send_template_email))
        .with_state(email_state)
        // レコード作成 API
        .route("/orders", post(create_order))
        .route("/appointments", post(create_appointment))
        .route("/doctorPrescriptions", post(create_prescription))
        .route("/bookings/{kind}", post(create_booking))
        .with_state(record_state)
        // ステータス変更 API
        .route("/admin/orders/bulk-status", post(bulk_update_order_status))
        .route("/admin/orders/{order_id}/status", post(update_order_status))
        .route(
            "/admin/bookings/{kind}/{booking_id}/status",
            post(update_booking_status),
        )
        .route(
            "/admin/appointments/{appointment_id}/status",
            post(update_appointment_status),
        )
        .with_state(status_state)
        // レビュー依頼 API
        .route("/admin/review-requests", get(list_review_requests))
        .route(
            "/review-requests/{review_request_id}/respond",
            post(respond_review_request),
        )
        .with_state(review_state)
        // ダッシュボード API
        .route("/admin/dashboard/orders", get(get_order_summary))
        .with_state(dashboard_state)
        // レイヤー順序: 下に書いたものが外側
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: スパンに request_id を含める
        // 3. CorsLayer: プリフライトに応答
        // 4. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
