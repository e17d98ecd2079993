//! Redemption endpoint

use axum::{extract::State, http::StatusCode, Extension, Json};
use meal_core::{AllocationId, RedemptionRequest};

use crate::caller::CallerContext;
use crate::dto::{RedeemRequest, RedemptionResponse};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Redeem one portion for a scanned student at the caller's school
pub async fn redeem(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(req): ApiJson<RedeemRequest>,
) -> ApiResult<(StatusCode, Json<RedemptionResponse>)> {
    let school_id = caller.require_school()?;

    let receipt = state
        .redemption
        .redeem(
            &school_id,
            RedemptionRequest {
                student_token: req.student_token,
                allocation_id: AllocationId::new(req.allocation_id),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(receipt.into())))
}
