//! Data Transfer Objects for API requests and responses

use chrono::{DateTime, NaiveDate, Utc};
use meal_core::{
    Allocation, AllocationDetail, Page, PageRequest, RedemptionReceipt, DEFAULT_PAGE_SIZE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", value)))
}

// ============ Redemption DTOs ============

/// Redeem request, sent by a school terminal after a scan
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub student_token: String,
    pub allocation_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimInfo {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentInfo {
    pub id: String,
    pub name: String,
    pub number: String,
    pub class: String,
    pub grade: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuInfo {
    pub name: String,
    pub description: Option<String>,
    pub price_per_portion: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllocationCountsInfo {
    pub id: String,
    pub date: NaiveDate,
    pub total_quantity: u32,
    pub distributed_count: u64,
    pub remaining_quantity: u64,
}

/// Redemption response
#[derive(Debug, Serialize, Deserialize)]
pub struct RedemptionResponse {
    pub claim: ClaimInfo,
    pub student: StudentInfo,
    pub menu: MenuInfo,
    pub allocation: AllocationCountsInfo,
}

impl From<RedemptionReceipt> for RedemptionResponse {
    fn from(receipt: RedemptionReceipt) -> Self {
        let RedemptionReceipt {
            claim,
            student,
            menu,
            allocation,
        } = receipt;
        Self {
            claim: ClaimInfo {
                id: claim.id.0,
                timestamp: claim.claimed_at,
            },
            student: StudentInfo {
                id: student.id.0,
                name: student.name,
                number: student.student_number,
                class: student.class_name,
                grade: student.grade,
            },
            menu: MenuInfo {
                name: menu.name,
                description: menu.description,
                price_per_portion: menu.price_per_portion,
            },
            allocation: AllocationCountsInfo {
                id: allocation.id.0,
                date: allocation.service_date,
                total_quantity: allocation.total_quantity,
                distributed_count: allocation.distributed_count,
                remaining_quantity: allocation.remaining_quantity,
            },
        }
    }
}

// ============ Allocation DTOs ============

/// Create allocation request
///
/// `date` is parsed by the handler so a malformed value reports
/// `INVALID_DATE` instead of a generic body rejection.
#[derive(Debug, Deserialize)]
pub struct CreateAllocationRequest {
    pub school_id: String,
    pub menu_id: String,
    pub quantity: i64,
    pub date: String,
}

/// Partial allocation update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAllocationRequest {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Allocation response
#[derive(Debug, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub id: String,
    pub school_id: String,
    pub menu_id: String,
    pub quantity: u32,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Allocation> for AllocationResponse {
    fn from(a: Allocation) -> Self {
        Self {
            id: a.id.0,
            school_id: a.school_id.0,
            menu_id: a.menu_id.0,
            quantity: a.quantity,
            date: a.service_date,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchoolInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuDetailInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_per_portion: Decimal,
}

/// Allocation with embedded school and menu summaries
#[derive(Debug, Serialize, Deserialize)]
pub struct AllocationDetailResponse {
    #[serde(flatten)]
    pub allocation: AllocationResponse,
    pub school: SchoolInfo,
    pub menu: MenuDetailInfo,
}

impl From<AllocationDetail> for AllocationDetailResponse {
    fn from(detail: AllocationDetail) -> Self {
        Self {
            allocation: detail.allocation.into(),
            school: SchoolInfo {
                id: detail.school.id.0,
                name: detail.school.name,
            },
            menu: MenuDetailInfo {
                id: detail.menu.id.0,
                name: detail.menu.name,
                description: detail.menu.description,
                price_per_portion: detail.menu.price_per_portion,
            },
        }
    }
}

/// Delete response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: String,
}

// ============ Common DTOs ============

/// Pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PaginationQuery {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// Paginated response
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

impl<T, U: Into<T>> From<Page<U>> for PaginatedResponse<T> {
    fn from(page: Page<U>) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            has_more: page.has_more,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
