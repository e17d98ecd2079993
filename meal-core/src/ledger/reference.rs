//! Reference Directory - read access to records owned elsewhere

use async_trait::async_trait;

use crate::error::MealResult;
use crate::types::{
    Government, GovernmentId, Menu, MenuId, School, SchoolId, Student, StudentId,
};

/// Reference Directory trait
#[async_trait]
pub trait ReferenceDirectory: Send + Sync {
    async fn government(&self, id: &GovernmentId) -> MealResult<Option<Government>>;

    async fn school(&self, id: &SchoolId) -> MealResult<Option<School>>;

    async fn menu(&self, id: &MenuId) -> MealResult<Option<Menu>>;

    async fn student(&self, id: &StudentId) -> MealResult<Option<Student>>;

    /// Look up a student by number within one school only
    async fn student_by_number(
        &self,
        school_id: &SchoolId,
        student_number: &str,
    ) -> MealResult<Option<Student>>;

    /// Number of students enrolled at a school
    async fn count_students(&self, school_id: &SchoolId) -> MealResult<u64>;

    /// Schools under a government, by name
    async fn schools_of(&self, government_id: &GovernmentId) -> MealResult<Vec<School>>;
}
