//! Core type definitions for the claim ledger
//!
//! All types follow these naming conventions:
//! - snake_case for field names
//! - *_id suffix for primary keys and references
//! - *_at suffix for instants, *_date for calendar dates

mod allocation;
mod claim;
mod ids;
mod page;
mod redemption;
mod reference;
mod scope;

pub use allocation::*;
pub use claim::*;
pub use ids::*;
pub use page::*;
pub use redemption::*;
pub use reference::*;
pub use scope::*;
