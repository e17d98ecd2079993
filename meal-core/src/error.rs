//! Error types for Meal Core
//!
//! Every failure the ledger can report belongs to one [`ErrorKind`]. The API
//! layer maps kinds to HTTP statuses; the reason code travels to the client.

use chrono::NaiveDate;
use thiserror::Error;

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input, checked before any lookup or mutation
    Validation,
    /// Missing record, or a record outside the caller's scope
    NotFound,
    /// Uniqueness or referential conflict
    Conflict,
    /// Business rule: no portions left
    QuotaExhausted,
    /// Unexpected storage or connectivity failure
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::QuotaExhausted => "quota_exhausted",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meal ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MealError {
    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Quantity must be a positive integer, got {0}")]
    InvalidQuantity(i64),

    #[error("Service date {date} is before today ({today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Student not found")]
    StudentNotFound,

    #[error("Allocation not found: {0}")]
    AllocationNotFound(String),

    #[error("Invalid reference: {entity} {id}")]
    InvalidReference { entity: &'static str, id: String },

    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Allocation already exists for school {school_id}, menu {menu_id} on {date}")]
    DuplicateAllocation {
        school_id: String,
        menu_id: String,
        date: NaiveDate,
    },

    #[error("Student {student_id} already claimed allocation {allocation_id}")]
    AlreadyClaimed {
        student_id: String,
        allocation_id: String,
    },

    #[error("Allocation {allocation_id} has {claims} claim(s)")]
    HasClaims { allocation_id: String, claims: u32 },

    #[error("Quantity {requested} is below the {distributed} portion(s) already distributed")]
    QuantityBelowDistributed { requested: u32, distributed: u32 },

    #[error("No portions left on allocation {0}")]
    QuotaExhausted(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl MealError {
    /// Get the taxonomy bucket of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTokenFormat
            | Self::InvalidQuantity(_)
            | Self::DateInPast { .. }
            | Self::Validation(_) => ErrorKind::Validation,
            Self::StudentNotFound
            | Self::AllocationNotFound(_)
            | Self::InvalidReference { .. }
            | Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateAllocation { .. }
            | Self::AlreadyClaimed { .. }
            | Self::HasClaims { .. }
            | Self::QuantityBelowDistributed { .. } => ErrorKind::Conflict,
            Self::QuotaExhausted(_) => ErrorKind::QuotaExhausted,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Get the stable reason code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTokenFormat => "INVALID_TOKEN_FORMAT",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::DateInPast { .. } => "INVALID_DATE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StudentNotFound => "STUDENT_NOT_FOUND",
            Self::AllocationNotFound(_) => "ALLOCATION_NOT_FOUND",
            Self::InvalidReference { .. } => "INVALID_REFERENCE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DuplicateAllocation { .. } => "DUPLICATE_ALLOCATION",
            Self::AlreadyClaimed { .. } => "ALREADY_CLAIMED",
            Self::HasClaims { .. } => "HAS_CLAIMS",
            Self::QuantityBelowDistributed { .. } => "QUANTITY_BELOW_DISTRIBUTED",
            Self::QuotaExhausted(_) => "QUOTA_EXHAUSTED",
            Self::Storage(_) => "INTERNAL_ERROR",
        }
    }

    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create an invalid reference error
    pub fn invalid_reference(entity: &'static str, id: impl Into<String>) -> Self {
        Self::InvalidReference {
            entity,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

/// Result type alias for ledger operations
pub type MealResult<T> = Result<T, MealError>;
