//! Caller context
//!
//! Authentication happens upstream. The gateway forwards the caller as
//! `X-Caller-Id` and `X-Caller-Role`; this middleware turns them into a
//! [`CallerContext`] in the request extensions.

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use meal_core::{GovernmentId, SchoolId, Scope};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// Caller role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    /// Provincial authority; the caller id is a government id
    Government,
    /// School terminal; the caller id is a school id
    School,
}

impl std::str::FromStr for CallerRole {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "government" => Ok(Self::Government),
            "school" => Ok(Self::School),
            other => Err(ApiError::Unauthorized(format!("unknown caller role '{}'", other))),
        }
    }
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub caller_id: String,
    pub role: CallerRole,
}

impl CallerContext {
    pub fn scope(&self) -> Scope {
        match self.role {
            CallerRole::Government => Scope::Government(GovernmentId::new(self.caller_id.clone())),
            CallerRole::School => Scope::School(SchoolId::new(self.caller_id.clone())),
        }
    }

    pub fn require_government(&self) -> ApiResult<GovernmentId> {
        match self.role {
            CallerRole::Government => Ok(GovernmentId::new(self.caller_id.clone())),
            CallerRole::School => Err(ApiError::Forbidden("government role required".into())),
        }
    }

    pub fn require_school(&self) -> ApiResult<SchoolId> {
        match self.role {
            CallerRole::School => Ok(SchoolId::new(self.caller_id.clone())),
            CallerRole::Government => Err(ApiError::Forbidden("school role required".into())),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Require caller headers and store the context in request extensions
pub async fn require_caller(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let caller_id = header_value(request.headers(), CALLER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthorized("missing caller id".into()))?;
    let role: CallerRole = header_value(request.headers(), CALLER_ROLE_HEADER)
        .ok_or_else(|| ApiError::Unauthorized("missing caller role".into()))?
        .parse()?;

    request
        .extensions_mut()
        .insert(CallerContext { caller_id, role });

    Ok(next.run(request).await)
}
