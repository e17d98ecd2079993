//! Allocation repository

use chrono::{DateTime, NaiveDate, Utc};
use meal_core::ledger::AllocationTotals;
use meal_core::{
    Allocation, AllocationId, MealError, MenuId, Page, PageRequest, SchoolId, Scope,
};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::{from_micros, to_count, to_micros, DbHandle};
use crate::error::{is_unique_violation, MealDbResult};

const ALLOCATION_COLUMNS: &str =
    "a.id, a.school_id, a.menu_id, a.quantity, a.service_date, a.created_at, a.updated_at";

/// Allocation repository
#[derive(Clone)]
pub struct AllocationRepo {
    db: DbHandle,
}

impl AllocationRepo {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }

    /// Insert a new allocation; (school, menu, date) must be unused
    pub async fn insert(&self, allocation: Allocation) -> MealDbResult<Allocation> {
        self.db
            .call(move |conn| {
                let result = conn.execute(
                    "INSERT INTO allocations
                        (id, school_id, menu_id, quantity, service_date, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        allocation.id.as_str(),
                        allocation.school_id.as_str(),
                        allocation.menu_id.as_str(),
                        allocation.quantity,
                        allocation.service_date,
                        to_micros(allocation.created_at),
                        to_micros(allocation.updated_at),
                    ],
                );
                match result {
                    Ok(_) => Ok(allocation),
                    Err(e) if is_unique_violation(&e) => Err(duplicate(&allocation).into()),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    /// Get allocation by ID
    pub async fn get(&self, id: &AllocationId) -> MealDbResult<Option<Allocation>> {
        let id = id.clone();
        self.db
            .call(move |conn| {
                let sql = format!(
                    "SELECT {} FROM allocations a WHERE a.id = ?1",
                    ALLOCATION_COLUMNS
                );
                Ok(conn
                    .query_row(&sql, params![id.as_str()], allocation_from_row)
                    .optional()?)
            })
            .await
    }

    /// Get allocation by ID if its school is visible to `scope`
    pub async fn get_in_scope(
        &self,
        id: &AllocationId,
        scope: &Scope,
    ) -> MealDbResult<Option<Allocation>> {
        let id = id.clone();
        let scope = scope.clone();
        self.db
            .call(move |conn| Ok(load_scoped(conn, &id, &scope)?))
            .await
    }

    /// List allocations visible to `scope`, newest service date first
    pub async fn list(&self, scope: &Scope, page: PageRequest) -> MealDbResult<Page<Allocation>> {
        let scope = scope.clone();
        self.db
            .call(move |conn| {
                let (clause, value) = scope_clause(&scope);
                let total: i64 = conn.query_row(
                    &format!(
                        "SELECT COUNT(*) FROM allocations a
                         JOIN schools s ON s.id = a.school_id
                         WHERE {}",
                        clause
                    ),
                    params![value],
                    |row| row.get(0),
                )?;

                let sql = format!(
                    "SELECT {} FROM allocations a
                     JOIN schools s ON s.id = a.school_id
                     WHERE {}
                     ORDER BY a.service_date DESC, a.created_at DESC, a.id
                     LIMIT ?2 OFFSET ?3",
                    ALLOCATION_COLUMNS, clause
                );
                let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
                let mut stmt = conn.prepare(&sql)?;
                let items = stmt
                    .query_map(params![value, page.limit(), offset], allocation_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(Page::new(items, to_count(total), page))
            })
            .await
    }

    /// Apply an update inside an immediate transaction.
    ///
    /// The distributed count is read under the write lock, so a quantity
    /// check cannot be invalidated by a concurrent claim.
    pub async fn update_checked(
        &self,
        scope: &Scope,
        id: &AllocationId,
        quantity: Option<u32>,
        service_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> MealDbResult<Allocation> {
        let scope = scope.clone();
        let id = id.clone();
        self.db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let current = load_scoped(&tx, &id, &scope)?
                    .ok_or_else(|| MealError::AllocationNotFound(id.to_string()))?;
                let distributed = count_claims(&tx, &id)?;

                if let Some(requested) = quantity {
                    if u64::from(requested) < distributed {
                        return Err(MealError::QuantityBelowDistributed {
                            requested,
                            distributed: clamp_u32(distributed),
                        }
                        .into());
                    }
                }
                if let Some(date) = service_date {
                    if date != current.service_date && distributed > 0 {
                        return Err(has_claims(&id, distributed).into());
                    }
                }

                let updated = Allocation {
                    quantity: quantity.unwrap_or(current.quantity),
                    service_date: service_date.unwrap_or(current.service_date),
                    updated_at: now,
                    ..current
                };
                let result = tx.execute(
                    "UPDATE allocations SET quantity = ?1, service_date = ?2, updated_at = ?3
                     WHERE id = ?4",
                    params![
                        updated.quantity,
                        updated.service_date,
                        to_micros(updated.updated_at),
                        updated.id.as_str(),
                    ],
                );
                match result {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e) => return Err(duplicate(&updated).into()),
                    Err(e) => return Err(e.into()),
                }
                tx.commit()?;
                Ok(updated)
            })
            .await
    }

    /// Delete an allocation that no claim references
    pub async fn delete_checked(&self, scope: &Scope, id: &AllocationId) -> MealDbResult<()> {
        let scope = scope.clone();
        let id = id.clone();
        self.db
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                if load_scoped(&tx, &id, &scope)?.is_none() {
                    return Err(MealError::AllocationNotFound(id.to_string()).into());
                }
                let distributed = count_claims(&tx, &id)?;
                if distributed > 0 {
                    return Err(has_claims(&id, distributed).into());
                }
                tx.execute("DELETE FROM allocations WHERE id = ?1", params![id.as_str()])?;
                tx.commit()?;
                Ok(())
            })
            .await
    }

    /// Allocation count and summed quantity visible to `scope`
    pub async fn totals(&self, scope: &Scope) -> MealDbResult<AllocationTotals> {
        let scope = scope.clone();
        self.db
            .call(move |conn| {
                let (clause, value) = scope_clause(&scope);
                let sql = format!(
                    "SELECT COUNT(*), COALESCE(SUM(a.quantity), 0) FROM allocations a
                     JOIN schools s ON s.id = a.school_id
                     WHERE {}",
                    clause
                );
                Ok(conn.query_row(&sql, params![value], totals_from_row)?)
            })
            .await
    }

    /// Totals per menu visible to `scope`
    pub async fn totals_by_menu(
        &self,
        scope: &Scope,
    ) -> MealDbResult<Vec<(MenuId, AllocationTotals)>> {
        let scope = scope.clone();
        self.db
            .call(move |conn| {
                let (clause, value) = scope_clause(&scope);
                let sql = format!(
                    "SELECT COUNT(*), COALESCE(SUM(a.quantity), 0), a.menu_id FROM allocations a
                     JOIN schools s ON s.id = a.school_id
                     WHERE {}
                     GROUP BY a.menu_id
                     ORDER BY a.menu_id",
                    clause
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![value], |row| {
                    Ok((MenuId::new(row.get::<_, String>(2)?), totals_from_row(row)?))
                })?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }
}

/// `WHERE` fragment restricting `a` (joined with `s`) to a scope, bound as `?1`
fn scope_clause(scope: &Scope) -> (&'static str, String) {
    match scope {
        Scope::Government(id) => ("s.government_id = ?1", id.to_string()),
        Scope::School(id) => ("a.school_id = ?1", id.to_string()),
    }
}

fn load_scoped(
    conn: &Connection,
    id: &AllocationId,
    scope: &Scope,
) -> rusqlite::Result<Option<Allocation>> {
    let (clause, value) = scope_clause(scope);
    let sql = format!(
        "SELECT {} FROM allocations a
         JOIN schools s ON s.id = a.school_id
         WHERE {} AND a.id = ?2",
        ALLOCATION_COLUMNS, clause
    );
    conn.query_row(&sql, params![value, id.as_str()], allocation_from_row)
        .optional()
}

fn count_claims(conn: &Connection, id: &AllocationId) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM claim_events WHERE allocation_id = ?1",
        params![id.as_str()],
        |row| row.get(0),
    )?;
    Ok(to_count(count))
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn has_claims(id: &AllocationId, claims: u64) -> MealError {
    MealError::HasClaims {
        allocation_id: id.to_string(),
        claims: clamp_u32(claims),
    }
}

fn duplicate(allocation: &Allocation) -> MealError {
    MealError::DuplicateAllocation {
        school_id: allocation.school_id.to_string(),
        menu_id: allocation.menu_id.to_string(),
        date: allocation.service_date,
    }
}

fn totals_from_row(row: &Row<'_>) -> rusqlite::Result<AllocationTotals> {
    Ok(AllocationTotals {
        allocation_count: to_count(row.get(0)?),
        total_allocated: to_count(row.get(1)?),
    })
}

pub(crate) fn allocation_from_row(row: &Row<'_>) -> rusqlite::Result<Allocation> {
    Ok(Allocation {
        id: AllocationId::new(row.get::<_, String>(0)?),
        school_id: SchoolId::new(row.get::<_, String>(1)?),
        menu_id: MenuId::new(row.get::<_, String>(2)?),
        quantity: row.get(3)?,
        service_date: row.get(4)?,
        created_at: from_micros(row.get(5)?)?,
        updated_at: from_micros(row.get(6)?)?,
    })
}
