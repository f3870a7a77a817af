//! # ダッシュボードハンドラ
//!
//! ```text
//! GET /admin/dashboard/orders
//! ```

use std::sync::Arc;

use axum::{Json, extract::State};
use pawcare_shared::ApiResponse;

use crate::{
    error::NotifierError,
    usecase::{DashboardUseCaseImpl, OrderSummary},
};

/// ダッシュボードハンドラーの State
pub struct DashboardState {
    pub usecase: DashboardUseCaseImpl,
}

/// 注文の集計を取得する
#[tracing::instrument(skip_all)]
pub async fn get_order_summary(
    State(state): State<Arc<DashboardState>>,
) -> Result<Json<ApiResponse<OrderSummary>>, NotifierError> {
    let summary = state.usecase.order_summary().await?;
    Ok(Json(ApiResponse::new(summary)))
}
