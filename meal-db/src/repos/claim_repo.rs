//! Claim repository - the append-only ledger table

use async_trait::async_trait;
use chrono::FixedOffset;
use meal_core::ledger::{ClaimLedger, ClaimSpan};
use meal_core::{
    AllocationId, ClaimDetail, ClaimEvent, DailyCount, ClaimFilter, ClaimId, MealError, MealResult, MenuId,
    SchoolId, StudentId,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row, TransactionBehavior};

use super::{from_micros, to_count, to_micros, DbHandle};
use crate::error::{is_unique_violation, MealDbResult};

const CLAIM_JOIN: &str = "claim_events c
    JOIN allocations a ON a.id = c.allocation_id
    JOIN schools s ON s.id = a.school_id";

/// Claim repository
#[derive(Clone)]
pub struct ClaimRepo {
    db: DbHandle,
}

impl ClaimRepo {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }

    /// Insert `event` only while the allocation has a portion left.
    ///
    /// The quota condition is part of the INSERT itself and the statement
    /// runs under `BEGIN IMMEDIATE`, so two writers can never both take the
    /// last portion. The UNIQUE (student, allocation) constraint rejects a
    /// second claim by the same student.
    pub async fn insert_conditional(&self, event: ClaimEvent) -> MealDbResult<ClaimEvent> {
        self.db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let result = tx.execute(
                    "INSERT INTO claim_events (id, student_id, allocation_id, claimed_at)
                     SELECT ?1, ?2, a.id, ?4 FROM allocations a
                     WHERE a.id = ?3
                       AND (SELECT COUNT(*) FROM claim_events c WHERE c.allocation_id = a.id)
                           < a.quantity",
                    params![
                        event.id.as_str(),
                        event.student_id.as_str(),
                        event.allocation_id.as_str(),
                        to_micros(event.claimed_at),
                    ],
                );
                let inserted = match result {
                    Ok(n) => n,
                    Err(e) if is_unique_violation(&e) => {
                        return Err(MealError::AlreadyClaimed {
                            student_id: event.student_id.to_string(),
                            allocation_id: event.allocation_id.to_string(),
                        }
                        .into())
                    }
                    Err(e) => return Err(e.into()),
                };

                if inserted == 0 {
                    let exists: bool = tx.query_row(
                        "SELECT EXISTS(SELECT 1 FROM allocations WHERE id = ?1)",
                        params![event.allocation_id.as_str()],
                        |row| row.get(0),
                    )?;
                    let err = if exists {
                        MealError::QuotaExhausted(event.allocation_id.to_string())
                    } else {
                        MealError::AllocationNotFound(event.allocation_id.to_string())
                    };
                    return Err(err.into());
                }

                tx.commit()?;
                Ok(event)
            })
            .await
    }

    async fn scalar(&self, select: &'static str, filter: &ClaimFilter) -> MealDbResult<i64> {
        let (clause, values) = filter_clause(filter);
        self.db
            .call(move |conn| {
                let sql = format!("SELECT {} FROM {} WHERE {}", select, CLAIM_JOIN, clause);
                Ok(conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?)
            })
            .await
    }

    async fn select_daily_counts(
        &self,
        filter: &ClaimFilter,
        offset: FixedOffset,
    ) -> MealDbResult<Vec<DailyCount>> {
        let (clause, mut values) = filter_clause(filter);
        values.push(Value::Integer(i64::from(offset.local_minus_utc())));
        let offset_param = values.len();
        self.db
            .call(move |conn| {
                let sql = format!(
                    "SELECT date(c.claimed_at / 1000000 + ?{}, 'unixepoch') AS day, COUNT(*)
                     FROM {} WHERE {}
                     GROUP BY day ORDER BY day",
                    offset_param, CLAIM_JOIN, clause
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(values), |row| {
                    Ok(DailyCount {
                        date: row.get(0)?,
                        count: to_count(row.get(1)?),
                    })
                })?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }

    async fn select_recent(&self, filter: &ClaimFilter, limit: u32) -> MealDbResult<Vec<ClaimDetail>> {
        let (clause, mut values) = filter_clause(filter);
        values.push(Value::Integer(i64::from(limit)));
        let limit_param = values.len();
        self.db
            .call(move |conn| {
                let sql = format!(
                    "SELECT c.id, c.claimed_at, c.allocation_id, c.student_id, st.name,
                            a.menu_id, m.name, a.school_id
                     FROM {}
                     JOIN students st ON st.id = c.student_id
                     JOIN menus m ON m.id = a.menu_id
                     WHERE {}
                     ORDER BY c.claimed_at DESC, c.id DESC
                     LIMIT ?{}",
                    CLAIM_JOIN, clause, limit_param
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(values), detail_from_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }

    async fn select_span(&self, filter: &ClaimFilter) -> MealDbResult<ClaimSpan> {
        let (clause, values) = filter_clause(filter);
        self.db
            .call(move |conn| {
                let sql = format!(
                    "SELECT MIN(c.claimed_at), MAX(c.claimed_at) FROM {} WHERE {}",
                    CLAIM_JOIN, clause
                );
                let (first, last): (Option<i64>, Option<i64>) =
                    conn.query_row(&sql, params_from_iter(values), |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })?;
                Ok(ClaimSpan {
                    first: first.map(from_micros).transpose()?,
                    last: last.map(from_micros).transpose()?,
                })
            })
            .await
    }
}

#[async_trait]
impl ClaimLedger for ClaimRepo {
    async fn append(&self, event: ClaimEvent) -> MealResult<ClaimEvent> {
        Ok(self.insert_conditional(event).await?)
    }

    async fn count(&self, filter: &ClaimFilter) -> MealResult<u64> {
        Ok(to_count(self.scalar("COUNT(*)", filter).await?))
    }

    async fn count_students(&self, filter: &ClaimFilter) -> MealResult<u64> {
        Ok(to_count(
            self.scalar("COUNT(DISTINCT c.student_id)", filter).await?,
        ))
    }

    async fn exists(&self, student_id: &StudentId, allocation_id: &AllocationId) -> MealResult<bool> {
        let filter = ClaimFilter {
            student_id: Some(student_id.clone()),
            allocation_id: Some(allocation_id.clone()),
            ..Default::default()
        };
        Ok(self.scalar("COUNT(*)", &filter).await? > 0)
    }

    async fn daily_counts(
        &self,
        filter: &ClaimFilter,
        offset: FixedOffset,
    ) -> MealResult<Vec<DailyCount>> {
        Ok(self.select_daily_counts(filter, offset).await?)
    }

    async fn recent(&self, filter: &ClaimFilter, limit: u32) -> MealResult<Vec<ClaimDetail>> {
        Ok(self.select_recent(filter, limit).await?)
    }

    async fn span(&self, filter: &ClaimFilter) -> MealResult<ClaimSpan> {
        Ok(self.select_span(filter).await?)
    }
}

/// Translate a filter into a `WHERE` clause with numbered parameters
fn filter_clause(filter: &ClaimFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    let mut push = |column: &str, value: Value, op: &str| {
        values.push(value);
        clauses.push(format!("{} {} ?{}", column, op, values.len()));
    };

    if let Some(id) = &filter.allocation_id {
        push("c.allocation_id", Value::Text(id.to_string()), "=");
    }
    if let Some(id) = &filter.student_id {
        push("c.student_id", Value::Text(id.to_string()), "=");
    }
    if let Some(id) = &filter.school_id {
        push("a.school_id", Value::Text(id.to_string()), "=");
    }
    if let Some(id) = &filter.government_id {
        push("s.government_id", Value::Text(id.to_string()), "=");
    }
    if let Some(id) = &filter.menu_id {
        push("a.menu_id", Value::Text(id.to_string()), "=");
    }
    if let Some(range) = &filter.range {
        push("c.claimed_at", Value::Integer(to_micros(range.start)), ">=");
        push("c.claimed_at", Value::Integer(to_micros(range.end)), "<");
    }

    let clause = if clauses.is_empty() {
        "1 = 1".to_string()
    } else {
        clauses.join(" AND ")
    };
    (clause, values)
}

fn detail_from_row(row: &Row<'_>) -> rusqlite::Result<ClaimDetail> {
    Ok(ClaimDetail {
        claim_id: ClaimId::new(row.get::<_, String>(0)?),
        claimed_at: from_micros(row.get(1)?)?,
        allocation_id: AllocationId::new(row.get::<_, String>(2)?),
        student_id: StudentId::new(row.get::<_, String>(3)?),
        student_name: row.get(4)?,
        menu_id: MenuId::new(row.get::<_, String>(5)?),
        menu_name: row.get(6)?,
        school_id: SchoolId::new(row.get::<_, String>(7)?),
    })
}
