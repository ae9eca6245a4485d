//! Payroll cycle repository.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crewpay_consultants::Consultant;
use crewpay_core::{CycleId, CycleLineItemId, DomainError, Money};
use crewpay_payroll::{CycleLineItem, PayrollCycle, WorkflowStep};

use crate::error::{StoreError, StoreResult};

#[derive(Clone)]
pub struct CycleRepo {
    pool: SqlitePool,
}

fn decode_err(e: DomainError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

fn cycle_from_row(row: &SqliteRow) -> Result<PayrollCycle, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let bonus_recipient_id: Option<String> = row.try_get("bonus_recipient_id")?;
    Ok(PayrollCycle {
        id: id.parse().map_err(decode_err)?,
        month_label: row.try_get("month_label")?,
        work_hours: row.try_get("work_hours")?,
        invoice_bonus: row
            .try_get::<Option<i64>, _>("invoice_bonus")?
            .map(Money::from_cents),
        bonus_recipient_id: bonus_recipient_id
            .map(|s| s.parse().map_err(decode_err))
            .transpose()?,
        hours_entered_at: row.try_get("hours_entered_at")?,
        invoices_sent_at: row.try_get("invoices_sent_at")?,
        payments_done_at: row.try_get("payments_done_at")?,
        archived: row.try_get("archived")?,
        created_at: row.try_get("created_at")?,
    })
}

fn line_item_from_row(row: &SqliteRow) -> Result<CycleLineItem, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let cycle_id: String = row.try_get("cycle_id")?;
    let consultant_id: String = row.try_get("consultant_id")?;
    Ok(CycleLineItem {
        id: id.parse().map_err(decode_err)?,
        cycle_id: cycle_id.parse().map_err(decode_err)?,
        consultant_id: consultant_id.parse().map_err(decode_err)?,
        rate_snapshot: Money::from_cents(row.try_get("rate_snapshot")?),
        work_hours_override: row.try_get("work_hours_override")?,
        bonus_date: row.try_get("bonus_date")?,
        bonus_announced_date: row.try_get("bonus_announced_date")?,
        adjustment: Money::from_cents(row.try_get("adjustment")?),
        adjustment_note: row.try_get("adjustment_note")?,
    })
}

impl CycleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a cycle and snapshot one line item per given (active)
    /// consultant, in one transaction. Month labels are unique.
    pub async fn create(
        &self,
        cycle: &PayrollCycle,
        consultants: &[Consultant],
    ) -> StoreResult<Vec<CycleLineItem>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::db("beginning cycle creation"))?;

        let exists: Option<(String,)> =
            sqlx::query_as("SELECT id FROM payroll_cycles WHERE month_label = ?")
                .bind(&cycle.month_label)
                .fetch_optional(&mut *tx)
                .await
                .map_err(StoreError::db("checking month label uniqueness"))?;
        if exists.is_some() {
            return Err(StoreError::validation(format!(
                "a cycle for {} already exists",
                cycle.month_label
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO payroll_cycles (
                id, month_label, work_hours, invoice_bonus, bonus_recipient_id,
                hours_entered_at, invoices_sent_at, payments_done_at, archived,
                created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(cycle.id.to_string())
        .bind(&cycle.month_label)
        .bind(cycle.work_hours)
        .bind(cycle.invoice_bonus.map(Money::cents))
        .bind(cycle.bonus_recipient_id.map(|id| id.to_string()))
        .bind(cycle.hours_entered_at)
        .bind(cycle.invoices_sent_at)
        .bind(cycle.payments_done_at)
        .bind(cycle.archived)
        .bind(cycle.created_at)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::db(format!(
            "inserting cycle {}",
            cycle.month_label
        )))?;

        let mut items = Vec::with_capacity(consultants.len());
        for consultant in consultants {
            let item = CycleLineItem::snapshot(cycle.id, consultant);
            sqlx::query(
                r#"
                INSERT INTO cycle_line_items (
                    id, cycle_id, consultant_id, rate_snapshot,
                    work_hours_override, bonus_date, bonus_announced_date,
                    adjustment, adjustment_note
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(item.id.to_string())
            .bind(item.cycle_id.to_string())
            .bind(item.consultant_id.to_string())
            .bind(item.rate_snapshot.cents())
            .bind(item.work_hours_override)
            .bind(item.bonus_date)
            .bind(item.bonus_announced_date)
            .bind(item.adjustment.cents())
            .bind(&item.adjustment_note)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::db(format!(
                "inserting line item for consultant {} in cycle {}",
                consultant.name, cycle.month_label
            )))?;
            items.push(item);
        }

        tx.commit()
            .await
            .map_err(StoreError::db("committing cycle creation"))?;
        Ok(items)
    }

    pub async fn get(&self, id: CycleId) -> StoreResult<(PayrollCycle, Vec<CycleLineItem>)> {
        let row = sqlx::query("SELECT * FROM payroll_cycles WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::db(format!("loading cycle {id}")))?
            .ok_or_else(|| StoreError::not_found(format!("cycle {id}")))?;
        let cycle =
            cycle_from_row(&row).map_err(StoreError::db(format!("decoding cycle {id}")))?;

        let rows = sqlx::query("SELECT * FROM cycle_line_items WHERE cycle_id = ? ORDER BY id")
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db(format!("loading line items of cycle {id}")))?;
        let items = rows
            .iter()
            .map(|row| {
                line_item_from_row(row).map_err(StoreError::db("decoding cycle line item row"))
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((cycle, items))
    }

    pub async fn list(&self, include_archived: bool) -> StoreResult<Vec<PayrollCycle>> {
        let sql = if include_archived {
            "SELECT * FROM payroll_cycles ORDER BY month_label DESC"
        } else {
            "SELECT * FROM payroll_cycles WHERE archived = 0 ORDER BY month_label DESC"
        };
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("listing cycles"))?;
        rows.iter()
            .map(|row| cycle_from_row(row).map_err(StoreError::db("decoding cycle row")))
            .collect()
    }

    /// Persist the full current state of a cycle header.
    pub async fn update(&self, cycle: &PayrollCycle) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payroll_cycles SET
                work_hours = ?, invoice_bonus = ?, bonus_recipient_id = ?,
                hours_entered_at = ?, invoices_sent_at = ?, payments_done_at = ?,
                archived = ?
            WHERE id = ?
            "#,
        )
        .bind(cycle.work_hours)
        .bind(cycle.invoice_bonus.map(Money::cents))
        .bind(cycle.bonus_recipient_id.map(|id| id.to_string()))
        .bind(cycle.hours_entered_at)
        .bind(cycle.invoices_sent_at)
        .bind(cycle.payments_done_at)
        .bind(cycle.archived)
        .bind(cycle.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StoreError::db(format!("updating cycle {}", cycle.id)))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("cycle {}", cycle.id)));
        }
        Ok(())
    }

    /// Stamp a workflow step's completion timestamp (first completion wins).
    pub async fn complete_step(
        &self,
        id: CycleId,
        step: WorkflowStep,
        now: DateTime<Utc>,
    ) -> StoreResult<PayrollCycle> {
        let (mut cycle, _) = self.get(id).await?;
        cycle.complete_step(step, now);
        self.update(&cycle).await?;
        Ok(cycle)
    }

    pub async fn archive(&self, id: CycleId) -> StoreResult<PayrollCycle> {
        let (mut cycle, _) = self.get(id).await?;
        cycle.archive();
        self.update(&cycle).await?;
        Ok(cycle)
    }

    pub async fn update_line_item(&self, item: &CycleLineItem) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE cycle_line_items SET
                work_hours_override = ?, bonus_date = ?, bonus_announced_date = ?,
                adjustment = ?, adjustment_note = ?
            WHERE id = ?
            "#,
        )
        .bind(item.work_hours_override)
        .bind(item.bonus_date)
        .bind(item.bonus_announced_date)
        .bind(item.adjustment.cents())
        .bind(&item.adjustment_note)
        .bind(item.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StoreError::db(format!("updating cycle line item {}", item.id)))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("cycle line item {}", item.id)));
        }
        Ok(())
    }

    pub async fn get_line_item(&self, id: CycleLineItemId) -> StoreResult<CycleLineItem> {
        let row = sqlx::query("SELECT * FROM cycle_line_items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::db(format!("loading cycle line item {id}")))?
            .ok_or_else(|| StoreError::not_found(format!("cycle line item {id}")))?;
        line_item_from_row(&row)
            .map_err(StoreError::db(format!("decoding cycle line item {id}")))
    }

    /// Hard delete a cycle and its line items. Blocked while a non-cancelled
    /// invoice references the cycle.
    pub async fn delete(&self, id: CycleId) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::db("beginning cycle deletion"))?;

        let invoice: Option<(i64,)> = sqlx::query_as(
            "SELECT invoice_number FROM client_invoices WHERE cycle_id = ? AND status != 'CANCELLED'",
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::db(format!("checking invoices of cycle {id}")))?;
        if let Some((number,)) = invoice {
            return Err(StoreError::validation(format!(
                "cycle {id} is still referenced by invoice {number}"
            )));
        }

        sqlx::query("DELETE FROM cycle_line_items WHERE cycle_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::db(format!("deleting line items of cycle {id}")))?;

        let result = sqlx::query("DELETE FROM payroll_cycles WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| crate::error::translate_delete_constraint(&format!("cycle {id}"), e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("cycle {id}")));
        }

        tx.commit()
            .await
            .map_err(StoreError::db("committing cycle deletion"))?;
        Ok(())
    }
}
