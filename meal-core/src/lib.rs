//! Meal Core - Allocation Quota & Claim Ledger
//!
//! This crate provides the core types and interfaces for the school meal
//! distribution ledger. A provincial authority grants a school a fixed quota
//! (an *allocation*) of portions of one menu for one service date; school
//! terminals redeem that quota against individual students.
//!
//! The crate holds no I/O:
//! - Domain records (allocations, claim events, reference data)
//! - The error taxonomy shared by every layer
//! - Token parsing for student identity tokens
//! - Calendar windows and the counting filter reused by every aggregate
//! - Availability and rollup arithmetic
//! - Ledger traits implemented by the storage crate
//!
//! # Source of truth
//!
//! The claim ledger is append-only and every count reported anywhere is
//! derived from it at read time. There is no mutable counter.

pub mod analytics;
pub mod availability;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod token;
pub mod types;

pub use analytics::*;
pub use availability::*;
pub use calendar::*;
pub use clock::*;
pub use error::*;
pub use token::*;
pub use types::*;
