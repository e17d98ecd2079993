//! Meal API Server
//!
//! Provides REST APIs for the school meal claim ledger. Callers are
//! authenticated upstream and identified by the `X-Caller-Id` and
//! `X-Caller-Role` headers.
//!
//! ## Endpoints
//!
//! ### Probes
//! - GET /health, GET /ready (also under /api/v1)
//!
//! ### Redemption (school)
//! - POST /api/v1/redemptions - Redeem one portion for a scanned student
//!
//! ### Allocations
//! - POST /api/v1/allocations - Create allocation (government)
//! - GET /api/v1/allocations - List allocations in scope
//! - GET /api/v1/allocations/:allocation_id - Get allocation
//! - PATCH /api/v1/allocations/:allocation_id - Update quantity or date (government)
//! - DELETE /api/v1/allocations/:allocation_id - Delete allocation (government)
//! - GET /api/v1/allocations/:allocation_id/summary - Distribution summary
//!
//! ### Analytics
//! - GET /api/v1/analytics/schools/:school_id - School performance
//! - GET /api/v1/analytics/menus - Menu utilization
//! - GET /api/v1/analytics/students/:student_id - Student meal history (school)
//! - GET /api/v1/analytics/trends - Daily and monthly trend

pub mod caller;
pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

pub use caller::*;
pub use dto::*;
pub use error::*;
pub use extract::ApiJson;
pub use routes::*;
pub use server::*;
pub use state::*;
