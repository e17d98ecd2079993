//! Aggregate read endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use meal_core::{
    MenuUtilization, SchoolId, SchoolPerformance, Scope, StudentId, StudentMealStats, TrendReport,
};

use crate::caller::CallerContext;
use crate::error::ApiResult;
use crate::state::AppState;

/// Participation report for one school in the caller's scope
pub async fn school_performance(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(school_id): Path<String>,
) -> ApiResult<Json<SchoolPerformance>> {
    let report = state
        .analytics
        .school_performance(&caller.scope(), &SchoolId::new(school_id))
        .await?;
    Ok(Json(report))
}

/// Menu utilization across the caller's scope
pub async fn menu_utilization(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Json<Vec<MenuUtilization>>> {
    Ok(Json(state.analytics.menu_utilization(&caller.scope()).await?))
}

/// Meal history of a student at the caller's school
pub async fn student_history(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<StudentMealStats>> {
    let school_id = caller.require_school()?;
    let stats = state
        .analytics
        .student_history(&Scope::School(school_id), &StudentId::new(student_id))
        .await?;
    Ok(Json(stats))
}

/// Daily and monthly claim trend for the caller's scope
pub async fn trends(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Json<TrendReport>> {
    Ok(Json(state.analytics.trends(&caller.scope()).await?))
}
