//! Ledger interfaces
//!
//! The meal ledger is split into four collaborators:
//! - Allocation Registry: quota records per (school, menu, date)
//! - Identity Resolver: token to student, scoped to a school
//! - Claim Ledger: append-only redemption events
//! - Reference Directory: read access to governments, schools, menus, students
//!
//! The storage crate implements every trait; the availability calculator,
//! redemption orchestrator and rollup engine are composed on top of them.

mod claims;
mod identity;
mod reference;
mod registry;

pub use claims::*;
pub use identity::*;
pub use reference::*;
pub use registry::*;
