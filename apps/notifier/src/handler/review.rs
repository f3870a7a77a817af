//! # レビュー依頼ハンドラ
//!
//! ```text
//! GET  /admin/review-requests?responded={bool}
//! POST /review-requests/{id}/respond
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use pawcare_domain::review_request::ReviewRequest;
use pawcare_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{error::NotifierError, usecase::ReviewUseCaseImpl};

/// レビュー依頼ハンドラーの State
pub struct ReviewState {
    pub usecase: ReviewUseCaseImpl,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequestQuery {
    pub responded: Option<bool>,
}

/// レビュー依頼 DTO
///
/// ドメインモデルはストアのフィールドだけを持つため、ID を付けて返す。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestDto {
    pub id: String,
    #[serde(flatten)]
    pub request: ReviewRequest,
}

impl From<ReviewRequest> for ReviewRequestDto {
    fn from(request: ReviewRequest) -> Self {
        Self {
            id: request.id.clone(),
            request,
        }
    }
}

#[tracing::instrument(skip_all)]
pub async fn list_review_requests(
    State(state): State<Arc<ReviewState>>,
    Query(query): Query<ReviewRequestQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewRequestDto>>>, NotifierError> {
    let requests = state.usecase.list(query.responded).await?;
    Ok(Json(ApiResponse::new(
        requests.into_iter().map(ReviewRequestDto::from).collect(),
    )))
}

#[tracing::instrument(skip_all, fields(%review_request_id))]
pub async fn respond_review_request(
    State(state): State<Arc<ReviewState>>,
    Path(review_request_id): Path<String>,
) -> Result<Json<ApiResponse<ReviewRequestDto>>, NotifierError> {
    let request = state.usecase.respond(&review_request_id).await?;
    Ok(Json(ApiResponse::new(request.into())))
}
