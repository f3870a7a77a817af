//! # ステータス変更ハンドラ
//!
//! 管理画面からのステータス変更エンドポイント。ここではメールを送らず、
//! 書き込みによるドキュメントイベントでトリガーが送信する。
//!
//! ```text
//! POST /admin/orders/{id}/status               {status, courierDetails?}
//! POST /admin/orders/bulk-status               {ids, status}
//! POST /admin/bookings/{kind}/{id}/status      {status}
//! POST /admin/appointments/{id}/status         {status}
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use pawcare_domain::{collection::BookingKind, order::CourierDetails};
use pawcare_shared::ApiResponse;
use serde::Deserialize;

use crate::{
    error::NotifierError,
    usecase::{BulkStatusReport, StatusChangeOutcome, StatusUseCaseImpl},
};

/// ステータス変更ハンドラーの State
pub struct StatusState {
    pub usecase: StatusUseCaseImpl,
}

/// 注文ステータス変更リクエスト
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status:          String,
    #[serde(default)]
    pub courier_details: Option<CourierDetails>,
}

/// 一括ステータス変更リクエスト
#[derive(Debug, Deserialize)]
pub struct BulkUpdateStatusRequest {
    pub ids:    Vec<String>,
    pub status: String,
}

/// 予約・診察予約のステータス変更リクエスト
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[tracing::instrument(skip_all, fields(%order_id))]
pub async fn update_order_status(
    State(state): State<Arc<StatusState>>,
    Path(order_id): Path<String>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<StatusChangeOutcome>>, NotifierError> {
    let outcome = state
        .usecase
        .set_order_status(&order_id, &req.status, req.courier_details)
        .await?;
    Ok(Json(ApiResponse::new(outcome)))
}

#[tracing::instrument(skip_all)]
pub async fn bulk_update_order_status(
    State(state): State<Arc<StatusState>>,
    Json(req): Json<BulkUpdateStatusRequest>,
) -> Result<Json<ApiResponse<BulkStatusReport>>, NotifierError> {
    let report = state
        .usecase
        .bulk_set_order_status(&req.ids, &req.status)
        .await?;
    Ok(Json(ApiResponse::new(report)))
}

#[tracing::instrument(skip_all, fields(%kind, %booking_id))]
pub async fn update_booking_status(
    State(state): State<Arc<StatusState>>,
    Path((kind, booking_id)): Path<(String, String)>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<StatusChangeOutcome>>, NotifierError> {
    let kind = BookingKind::parse(&kind)?;
    let outcome = state
        .usecase
        .set_booking_status(kind, &booking_id, &req.status)
        .await?;
    Ok(Json(ApiResponse::new(outcome)))
}

#[tracing::instrument(skip_all, fields(%appointment_id))]
pub async fn update_appointment_status(
    State(state): State<Arc<StatusState>>,
    Path(appointment_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<StatusChangeOutcome>>, NotifierError> {
    let outcome = state
        .usecase
        .set_appointment_status(&appointment_id, &req.status)
        .await?;
    Ok(Json(ApiResponse::new(outcome)))
}
