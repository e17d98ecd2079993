//! Identity Resolver Service Implementation

use async_trait::async_trait;
use meal_core::ledger::{IdentityResolver, ReferenceDirectory};
use meal_core::{MealError, MealResult, SchoolId, Student, TokenFormat};
use std::sync::Arc;
use tracing::debug;

use crate::repos::MealDatabase;

/// Identity Resolver Service
pub struct IdentityService {
    database: Arc<MealDatabase>,
    token_format: TokenFormat,
}

impl IdentityService {
    pub fn new(database: Arc<MealDatabase>, token_format: TokenFormat) -> Self {
        Self {
            database,
            token_format,
        }
    }
}

#[async_trait]
impl IdentityResolver for IdentityService {
    async fn resolve(&self, token: &str, school_id: &SchoolId) -> MealResult<Student> {
        let student_number = self.token_format.parse(token).map_err(|e| {
            debug!(prefix = self.token_format.prefix(), "token does not match the expected shape");
            e
        })?;

        let student = self
            .database
            .references
            .student_by_number(school_id, student_number)
            .await?;

        match student {
            Some(student) => Ok(student),
            None => {
                debug!(school_id = %school_id, "token did not resolve to a student of this school");
                Err(MealError::StudentNotFound)
            }
        }
    }
}
