//! API route handlers

pub mod allocation;
pub mod analytics;
pub mod health;
pub mod redemption;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::caller::require_caller;
use crate::state::AppState;

/// Create the API router
///
/// Health probes answer at the root and under `/api/v1` without a caller;
/// every other route requires the caller headers.
pub fn create_router(state: AppState) -> Router {
    let probes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check));

    let ledger = Router::new()
        // Redemption
        .route("/redemptions", post(redemption::redeem))
        // Allocations
        .route(
            "/allocations",
            post(allocation::create_allocation).get(allocation::list_allocations),
        )
        .route(
            "/allocations/:allocation_id",
            get(allocation::get_allocation)
                .patch(allocation::update_allocation)
                .delete(allocation::delete_allocation),
        )
        .route(
            "/allocations/:allocation_id/summary",
            get(allocation::get_summary),
        )
        // Analytics
        .route("/analytics/schools/:school_id", get(analytics::school_performance))
        .route("/analytics/menus", get(analytics::menu_utilization))
        .route("/analytics/students/:student_id", get(analytics::student_history))
        .route("/analytics/trends", get(analytics::trends))
        .route_layer(middleware::from_fn(require_caller));

    Router::new()
        .merge(probes.clone())
        .nest("/api/v1", probes.merge(ledger))
        .with_state(state)
}
