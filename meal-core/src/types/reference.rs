//! Reference records
//!
//! Governments, schools, menus and students are owned by other parts of the
//! system. The ledger reads them and never mutates them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{GovernmentId, MenuId, SchoolId, StudentId};

/// Provincial authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Government {
    pub id: GovernmentId,
    pub name: String,
}

/// School under one government
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub government_id: GovernmentId,
    pub name: String,
}

/// Meal offering with a serving date and a price per portion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    pub government_id: GovernmentId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub serving_date: NaiveDate,
    pub price_per_portion: Decimal,
}

/// Student enrolled at one school
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub school_id: SchoolId,
    /// Number encoded in the student's scannable token
    pub student_number: String,
    pub name: String,
    pub class_name: String,
    pub grade: String,
}
