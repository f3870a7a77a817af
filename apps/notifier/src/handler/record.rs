//! # レコード作成ハンドラ
//!
//! 顧客向けフォームからの作成エンドポイント。作成後の通知はトリガーが送る。
//!
//! ```text
//! POST /orders
//! POST /appointments
//! POST /doctorPrescriptions
//! POST /bookings/{kind}
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pawcare_domain::collection::BookingKind;
use pawcare_shared::ApiResponse;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::NotifierError,
    usecase::{NewRecord, RecordUseCaseImpl},
};

/// レコード作成ハンドラーの State
pub struct RecordState {
    pub usecase: RecordUseCaseImpl,
}

/// 作成結果 DTO
#[derive(Debug, Serialize)]
pub struct CreatedDto {
    pub id: String,
}

async fn create(state: &RecordState, record: NewRecord, body: Value) -> Result<Response, NotifierError> {
    let Value::Object(data) = body else {
        return Err(NotifierError::BadRequest(
            "リクエストボディは JSON オブジェクトである必要があります".to_string(),
        ));
    };
    let document = state.usecase.create(record, data).await?;
    let response = ApiResponse::new(CreatedDto { id: document.id });
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[tracing::instrument(skip_all)]
pub async fn create_order(
    State(state): State<Arc<RecordState>>,
    Json(body): Json<Value>,
) -> Result<Response, NotifierError> {
    create(&state, NewRecord::Order, body).await
}

#[tracing::instrument(skip_all)]
pub async fn create_appointment(
    State(state): State<Arc<RecordState>>,
    Json(body): Json<Value>,
) -> Result<Response, NotifierError> {
    create(&state, NewRecord::Appointment, body).await
}

#[tracing::instrument(skip_all)]
pub async fn create_prescription(
    State(state): State<Arc<RecordState>>,
    Json(body): Json<Value>,
) -> Result<Response, NotifierError> {
    create(&state, NewRecord::Prescription, body).await
}

/// トリミング・預かり予約を作成する
#[tracing::instrument(skip_all, fields(%kind))]
pub async fn create_booking(
    State(state): State<Arc<RecordState>>,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, NotifierError> {
    let kind = BookingKind::parse(&kind)?;
    create(&state, NewRecord::Booking(kind), body).await
}
