//! Identity Resolver - student tokens

use async_trait::async_trait;

use crate::error::MealResult;
use crate::types::{SchoolId, Student};

/// Identity Resolver trait
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a scanned token to a student of `school_id`.
    ///
    /// A malformed token fails with `InvalidTokenFormat` before any lookup.
    /// A student number that exists only at another school fails with
    /// `StudentNotFound`.
    async fn resolve(&self, token: &str, school_id: &SchoolId) -> MealResult<Student>;
}
