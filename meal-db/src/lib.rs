//! Meal Database Layer
//!
//! SQLite persistence for the claim ledger and the services built on it.
//!
//! # Guarantees held by the schema
//!
//! - `claim_events` is append-only: UPDATE and DELETE abort in triggers
//! - `UNIQUE (student_id, allocation_id)` on `claim_events`
//! - `UNIQUE (school_id, menu_id, service_date)` on `allocations`
//! - claims are inserted by one conditional statement under `BEGIN IMMEDIATE`,
//!   so the count of events per allocation never exceeds its quantity
//!
//! # Usage
//!
//! ```ignore
//! use meal_db::{DbConfig, MealDatabase};
//!
//! async fn example() {
//!     let db = MealDatabase::open(&DbConfig::new("meal.db")).unwrap();
//!     db.init_schema().await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod repos;
pub mod schema;
pub mod services;

pub use config::DbConfig;
pub use error::*;
pub use repos::*;
pub use schema::MEAL_SCHEMA;
pub use services::{
    AllocationService, AnalyticsService, AvailabilityService, IdentityService, MealServices,
    RedemptionService, ServiceSettings, WindowCounter,
};
