//! Allocation management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use meal_core::ledger::AllocationRegistry;
use meal_core::{
    AllocationId, AllocationUpdate, AvailabilitySummary, MealError, MenuId, NewAllocation, SchoolId,
    Scope,
};

use crate::caller::CallerContext;
use crate::dto::{
    parse_date, AllocationDetailResponse, AllocationResponse, CreateAllocationRequest,
    DeleteResponse, PaginatedResponse, PaginationQuery, UpdateAllocationRequest,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Create an allocation for a school of the caller's government
pub async fn create_allocation(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(req): ApiJson<CreateAllocationRequest>,
) -> ApiResult<(StatusCode, Json<AllocationDetailResponse>)> {
    let government_id = caller.require_government()?;
    let service_date = parse_date(&req.date)?;

    let allocation = state
        .allocations
        .create(
            &government_id,
            NewAllocation {
                school_id: SchoolId::new(req.school_id),
                menu_id: MenuId::new(req.menu_id),
                quantity: req.quantity,
                service_date,
            },
        )
        .await?;
    let detail = state.allocations.describe(allocation).await?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// List allocations visible to the caller, newest service date first
pub async fn list_allocations(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<PaginationQuery>,
) -> ApiResult<Json<PaginatedResponse<AllocationResponse>>> {
    let request = query.to_request();
    let page = match caller.scope() {
        Scope::Government(government_id) => {
            state
                .allocations
                .find_by_government(&government_id, request)
                .await?
        }
        Scope::School(school_id) => state.allocations.find_by_school(&school_id, request).await?,
    };

    Ok(Json(page.into()))
}

/// Get one allocation with its school and menu
pub async fn get_allocation(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(allocation_id): Path<String>,
) -> ApiResult<Json<AllocationDetailResponse>> {
    let allocation_id = AllocationId::new(allocation_id);
    let allocation = state
        .allocations
        .find_in_scope(&allocation_id, &caller.scope())
        .await?
        .ok_or_else(|| MealError::AllocationNotFound(allocation_id.to_string()))?;
    let detail = state.allocations.describe(allocation).await?;

    Ok(Json(detail.into()))
}

/// Change quantity and/or service date
pub async fn update_allocation(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(allocation_id): Path<String>,
    ApiJson(req): ApiJson<UpdateAllocationRequest>,
) -> ApiResult<Json<AllocationResponse>> {
    let government_id = caller.require_government()?;
    let service_date = req.date.as_deref().map(parse_date).transpose()?;

    let allocation = state
        .allocations
        .update(
            &government_id,
            &AllocationId::new(allocation_id),
            AllocationUpdate {
                quantity: req.quantity,
                service_date,
            },
        )
        .await?;

    Ok(Json(allocation.into()))
}

/// Delete an allocation that has no claims
pub async fn delete_allocation(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(allocation_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let government_id = caller.require_government()?;
    let allocation_id = AllocationId::new(allocation_id);

    state
        .allocations
        .delete(&government_id, &allocation_id)
        .await?;

    Ok(Json(DeleteResponse {
        deleted: true,
        id: allocation_id.0,
    }))
}

/// Distribution summary of one allocation
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(allocation_id): Path<String>,
) -> ApiResult<Json<AvailabilitySummary>> {
    let summary = state
        .availability
        .summary(&AllocationId::new(allocation_id), &caller.scope())
        .await?;

    Ok(Json(summary))
}
