//! Reference repository - governments, schools, menus, students

use async_trait::async_trait;
use meal_core::ledger::ReferenceDirectory;
use meal_core::{
    Government, GovernmentId, MealResult, Menu, MenuId, School, SchoolId, Student, StudentId,
};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{to_count, DbHandle};
use crate::error::MealDbResult;

/// Reference records loaded by the seeding path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub governments: Vec<Government>,
    #[serde(default)]
    pub schools: Vec<School>,
    #[serde(default)]
    pub menus: Vec<Menu>,
    #[serde(default)]
    pub students: Vec<Student>,
}

/// Number of records written by a seed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub governments: usize,
    pub schools: usize,
    pub menus: usize,
    pub students: usize,
}

/// Reference repository
#[derive(Clone)]
pub struct ReferenceRepo {
    db: DbHandle,
}

const SCHOOL_COLUMNS: &str = "id, government_id, name";
const MENU_COLUMNS: &str = "id, government_id, name, description, serving_date, price_per_portion";
const STUDENT_COLUMNS: &str = "id, school_id, student_number, name, class_name, grade";

impl ReferenceRepo {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }

    /// Upsert every record in one transaction, parents first
    pub async fn seed(&self, data: ReferenceData) -> MealDbResult<SeedReport> {
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                for g in &data.governments {
                    tx.execute(
                        "INSERT INTO governments (id, name) VALUES (?1, ?2)
                         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                        params![g.id.as_str(), g.name],
                    )?;
                }
                for s in &data.schools {
                    tx.execute(
                        "INSERT INTO schools (id, government_id, name) VALUES (?1, ?2, ?3)
                         ON CONFLICT(id) DO UPDATE SET
                            government_id = excluded.government_id,
                            name = excluded.name",
                        params![s.id.as_str(), s.government_id.as_str(), s.name],
                    )?;
                }
                for m in &data.menus {
                    tx.execute(
                        "INSERT INTO menus (id, government_id, name, description, serving_date, price_per_portion)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT(id) DO UPDATE SET
                            government_id = excluded.government_id,
                            name = excluded.name,
                            description = excluded.description,
                            serving_date = excluded.serving_date,
                            price_per_portion = excluded.price_per_portion",
                        params![
                            m.id.as_str(),
                            m.government_id.as_str(),
                            m.name,
                            m.description,
                            m.serving_date,
                            m.price_per_portion.to_string(),
                        ],
                    )?;
                }
                for st in &data.students {
                    tx.execute(
                        "INSERT INTO students (id, school_id, student_number, name, class_name, grade)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT(id) DO UPDATE SET
                            school_id = excluded.school_id,
                            student_number = excluded.student_number,
                            name = excluded.name,
                            class_name = excluded.class_name,
                            grade = excluded.grade",
                        params![
                            st.id.as_str(),
                            st.school_id.as_str(),
                            st.student_number,
                            st.name,
                            st.class_name,
                            st.grade,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(SeedReport {
                    governments: data.governments.len(),
                    schools: data.schools.len(),
                    menus: data.menus.len(),
                    students: data.students.len(),
                })
            })
            .await
    }

    async fn get_government(&self, id: &GovernmentId) -> MealDbResult<Option<Government>> {
        let id = id.clone();
        self.db
            .call(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT id, name FROM governments WHERE id = ?1",
                        params![id.as_str()],
                        |row| {
                            Ok(Government {
                                id: GovernmentId::new(row.get::<_, String>(0)?),
                                name: row.get(1)?,
                            })
                        },
                    )
                    .optional()?)
            })
            .await
    }

    async fn get_school(&self, id: &SchoolId) -> MealDbResult<Option<School>> {
        let id = id.clone();
        self.db
            .call(move |conn| {
                let sql = format!("SELECT {} FROM schools WHERE id = ?1", SCHOOL_COLUMNS);
                Ok(conn
                    .query_row(&sql, params![id.as_str()], school_from_row)
                    .optional()?)
            })
            .await
    }

    async fn get_menu(&self, id: &MenuId) -> MealDbResult<Option<Menu>> {
        let id = id.clone();
        self.db
            .call(move |conn| {
                let sql = format!("SELECT {} FROM menus WHERE id = ?1", MENU_COLUMNS);
                Ok(conn
                    .query_row(&sql, params![id.as_str()], menu_from_row)
                    .optional()?)
            })
            .await
    }

    async fn get_student(&self, id: &StudentId) -> MealDbResult<Option<Student>> {
        let id = id.clone();
        self.db
            .call(move |conn| {
                let sql = format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS);
                Ok(conn
                    .query_row(&sql, params![id.as_str()], student_from_row)
                    .optional()?)
            })
            .await
    }

    async fn get_student_by_number(
        &self,
        school_id: &SchoolId,
        student_number: &str,
    ) -> MealDbResult<Option<Student>> {
        let school_id = school_id.clone();
        let student_number = student_number.to_string();
        self.db
            .call(move |conn| {
                let sql = format!(
                    "SELECT {} FROM students WHERE school_id = ?1 AND student_number = ?2",
                    STUDENT_COLUMNS
                );
                Ok(conn
                    .query_row(
                        &sql,
                        params![school_id.as_str(), student_number],
                        student_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    async fn get_student_count(&self, school_id: &SchoolId) -> MealDbResult<u64> {
        let school_id = school_id.clone();
        self.db
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM students WHERE school_id = ?1",
                    params![school_id.as_str()],
                    |row| row.get(0),
                )?;
                Ok(to_count(count))
            })
            .await
    }

    async fn list_schools(&self, government_id: &GovernmentId) -> MealDbResult<Vec<School>> {
        let government_id = government_id.clone();
        self.db
            .call(move |conn| {
                let sql = format!(
                    "SELECT {} FROM schools WHERE government_id = ?1 ORDER BY name, id",
                    SCHOOL_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![government_id.as_str()], school_from_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }
}

#[async_trait]
impl ReferenceDirectory for ReferenceRepo {
    async fn government(&self, id: &GovernmentId) -> MealResult<Option<Government>> {
        Ok(self.get_government(id).await?)
    }

    async fn school(&self, id: &SchoolId) -> MealResult<Option<School>> {
        Ok(self.get_school(id).await?)
    }

    async fn menu(&self, id: &MenuId) -> MealResult<Option<Menu>> {
        Ok(self.get_menu(id).await?)
    }

    async fn student(&self, id: &StudentId) -> MealResult<Option<Student>> {
        Ok(self.get_student(id).await?)
    }

    async fn student_by_number(
        &self,
        school_id: &SchoolId,
        student_number: &str,
    ) -> MealResult<Option<Student>> {
        Ok(self.get_student_by_number(school_id, student_number).await?)
    }

    async fn count_students(&self, school_id: &SchoolId) -> MealResult<u64> {
        Ok(self.get_student_count(school_id).await?)
    }

    async fn schools_of(&self, government_id: &GovernmentId) -> MealResult<Vec<School>> {
        Ok(self.list_schools(government_id).await?)
    }
}

fn school_from_row(row: &Row<'_>) -> rusqlite::Result<School> {
    Ok(School {
        id: SchoolId::new(row.get::<_, String>(0)?),
        government_id: GovernmentId::new(row.get::<_, String>(1)?),
        name: row.get(2)?,
    })
}

fn menu_from_row(row: &Row<'_>) -> rusqlite::Result<Menu> {
    let price: String = row.get(5)?;
    let price_per_portion = Decimal::from_str(&price)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(Menu {
        id: MenuId::new(row.get::<_, String>(0)?),
        government_id: GovernmentId::new(row.get::<_, String>(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        serving_date: row.get(4)?,
        price_per_portion,
    })
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: StudentId::new(row.get::<_, String>(0)?),
        school_id: SchoolId::new(row.get::<_, String>(1)?),
        student_number: row.get(2)?,
        name: row.get(3)?,
        class_name: row.get(4)?,
        grade: row.get(5)?,
    })
}
