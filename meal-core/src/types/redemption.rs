//! Redemption request and receipt

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocation::Allocation;
use super::claim::ClaimEvent;
use super::ids::{AllocationId, ClaimId, StudentId};
use super::reference::{Menu, Student};
use crate::availability::available_for_display;

/// One scan at a school terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    pub student_token: String,
    pub allocation_id: AllocationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub id: ClaimId,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: StudentId,
    pub name: String,
    pub student_number: String,
    pub class_name: String,
    pub grade: String,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            student_number: student.student_number.clone(),
            class_name: student.class_name.clone(),
            grade: student.grade.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSummary {
    pub name: String,
    pub description: Option<String>,
    pub price_per_portion: Decimal,
}

impl From<&Menu> for MenuSummary {
    fn from(menu: &Menu) -> Self {
        Self {
            name: menu.name.clone(),
            description: menu.description.clone(),
            price_per_portion: menu.price_per_portion,
        }
    }
}

/// Allocation counts recomputed after a committed claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCounts {
    pub id: AllocationId,
    pub service_date: NaiveDate,
    pub total_quantity: u32,
    pub distributed_count: u64,
    pub remaining_quantity: u64,
}

impl AllocationCounts {
    pub fn new(allocation: &Allocation, distributed_count: u64) -> Self {
        Self {
            id: allocation.id.clone(),
            service_date: allocation.service_date,
            total_quantity: allocation.quantity,
            distributed_count,
            remaining_quantity: available_for_display(allocation.quantity, distributed_count),
        }
    }
}

/// Successful redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionReceipt {
    pub claim: ClaimReceipt,
    pub student: StudentSummary,
    pub menu: MenuSummary,
    pub allocation: AllocationCounts,
}

impl RedemptionReceipt {
    pub fn new(
        event: &ClaimEvent,
        student: &Student,
        menu: &Menu,
        allocation: &Allocation,
        distributed_count: u64,
    ) -> Self {
        Self {
            claim: ClaimReceipt {
                id: event.id.clone(),
                claimed_at: event.claimed_at,
            },
            student: StudentSummary::from(student),
            menu: MenuSummary::from(menu),
            allocation: AllocationCounts::new(allocation, distributed_count),
        }
    }
}
