//! Client-invoice generation, reconciliation, and the invoice-number
//! sequence.
//!
//! Every multi-step write (number allocation + invoice insert, bonus sync,
//! line-item edit, delete) runs inside one transaction so a reader never
//! observes an invoice whose cached totals disagree with its line items.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::Row;

use crewpay_consultants::Consultant;
use crewpay_core::{ConsultantId, CycleId, DomainError, InvoiceId, InvoiceLineItemId, Money};
use crewpay_invoicing::{
    draft_from_consultants, ClientInvoice, InvoiceLineItem, InvoiceStatus, DEFAULT_INVOICE_BONUS,
};

use crate::consultants::consultant_from_row;
use crate::error::{StoreError, StoreResult};

/// Seed for the singleton invoice-number sequence.
const SEQUENCE_SEED: i64 = 198;

#[derive(Clone)]
pub struct ClientInvoiceService {
    pool: SqlitePool,
}

/// Result of the non-mutating creation probe.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CreateEligibility {
    pub eligible: bool,
    pub reasons: Vec<String>,
}

/// Partial edit of a persisted invoice line item. `amount` is never part of
/// a patch; it is recomputed from quantity × rate.
#[derive(Debug, Clone, Default)]
pub struct LineItemPatch {
    pub quantity: Option<i64>,
    pub rate: Option<Money>,
    pub description: Option<String>,
}

fn decode_err(e: DomainError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

fn translate_duplicate_invoice(cycle_id: CycleId, number: i64, source: sqlx::Error) -> StoreError {
    let is_unique = source
        .as_database_error()
        .is_some_and(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation));
    if is_unique {
        StoreError::validation(format!("cycle {cycle_id} already has an invoice"))
    } else {
        StoreError::Database {
            context: format!("inserting invoice {number} for cycle {cycle_id}"),
            source,
        }
    }
}

fn invoice_from_row(row: &SqliteRow) -> Result<ClientInvoice, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let cycle_id: String = row.try_get("cycle_id")?;
    let status: String = row.try_get("status")?;
    Ok(ClientInvoice {
        id: id.parse().map_err(decode_err)?,
        cycle_id: cycle_id.parse().map_err(decode_err)?,
        invoice_number: row.try_get("invoice_number")?,
        // An unknown status in the database is corruption, surfaced as a
        // hard read error rather than silently nulled.
        status: status.parse().map_err(decode_err)?,
        issue_date: row.try_get("issue_date")?,
        sent_date: row.try_get("sent_date")?,
        approved_date: row.try_get("approved_date")?,
        paid_date: row.try_get("paid_date")?,
        subtotal: Money::from_cents(row.try_get("subtotal")?),
        tax: Money::from_cents(row.try_get("tax")?),
        total: Money::from_cents(row.try_get("total")?),
        amount_due: Money::from_cents(row.try_get("amount_due")?),
        created_at: row.try_get("created_at")?,
    })
}

fn line_item_from_row(row: &SqliteRow) -> Result<InvoiceLineItem, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let invoice_id: String = row.try_get("invoice_id")?;
    Ok(InvoiceLineItem {
        id: id.parse().map_err(decode_err)?,
        invoice_id: invoice_id.parse().map_err(decode_err)?,
        service_name: row.try_get("service_name")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        rate: Money::from_cents(row.try_get("rate")?),
        amount: Money::from_cents(row.try_get("amount")?),
        position: row.try_get("position")?,
        consultant_ids: Vec::new(),
    })
}

/// Read-and-increment the singleton sequence row, seeding it on first use.
/// Runs on the caller's connection, so inside a transaction a failed invoice
/// insert rolls the increment back and never burns a number.
async fn next_invoice_number_in(conn: &mut SqliteConnection) -> StoreResult<i64> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT next_number FROM invoice_number_sequence WHERE id = 1")
            .fetch_optional(&mut *conn)
            .await
            .map_err(StoreError::db("reading invoice number sequence"))?;

    let current = match row {
        Some((n,)) => n,
        None => {
            sqlx::query("INSERT INTO invoice_number_sequence (id, next_number) VALUES (1, ?)")
                .bind(SEQUENCE_SEED)
                .execute(&mut *conn)
                .await
                .map_err(StoreError::db("seeding invoice number sequence"))?;
            SEQUENCE_SEED
        }
    };

    sqlx::query("UPDATE invoice_number_sequence SET next_number = ? WHERE id = 1")
        .bind(current + 1)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::db("incrementing invoice number sequence"))?;
    Ok(current)
}

/// The cycle's current non-cancelled invoice, if any.
async fn invoice_for_cycle_in(
    conn: &mut SqliteConnection,
    cycle_id: CycleId,
) -> StoreResult<Option<ClientInvoice>> {
    let row = sqlx::query(
        "SELECT * FROM client_invoices WHERE cycle_id = ? AND status != 'CANCELLED'",
    )
    .bind(cycle_id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(StoreError::db(format!(
        "loading invoice of cycle {cycle_id}"
    )))?;
    row.as_ref()
        .map(|r| invoice_from_row(r).map_err(StoreError::db("decoding invoice row")))
        .transpose()
}

/// The cycle's bonus to bill: its configured pool, or the historical
/// default. `None` means the cycle does not exist.
async fn cycle_bonus_in(
    conn: &mut SqliteConnection,
    cycle_id: CycleId,
) -> StoreResult<Option<Money>> {
    let row: Option<(Option<i64>,)> =
        sqlx::query_as("SELECT invoice_bonus FROM payroll_cycles WHERE id = ?")
            .bind(cycle_id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(StoreError::db(format!("loading cycle {cycle_id}")))?;
    Ok(row.map(|(cents,)| cents.map(Money::from_cents).unwrap_or(DEFAULT_INVOICE_BONUS)))
}

/// Consultants on the cycle's line items, in name order so grouped member
/// lists and descriptions come out deterministic.
async fn cycle_consultants_in(
    conn: &mut SqliteConnection,
    cycle_id: CycleId,
) -> StoreResult<Vec<Consultant>> {
    let rows = sqlx::query(
        r#"
        SELECT c.* FROM consultants c
        JOIN cycle_line_items cli ON cli.consultant_id = c.id
        WHERE cli.cycle_id = ?
        ORDER BY c.name
        "#,
    )
    .bind(cycle_id.to_string())
    .fetch_all(&mut *conn)
    .await
    .map_err(StoreError::db(format!(
        "loading consultants of cycle {cycle_id}"
    )))?;
    rows.iter()
        .map(|row| consultant_from_row(row).map_err(StoreError::db("decoding consultant row")))
        .collect()
}

async fn load_invoice(conn: &mut SqliteConnection, id: InvoiceId) -> StoreResult<ClientInvoice> {
    let row = sqlx::query("SELECT * FROM client_invoices WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(StoreError::db(format!("loading invoice {id}")))?
        .ok_or_else(|| StoreError::not_found(format!("invoice {id}")))?;
    invoice_from_row(&row).map_err(StoreError::db(format!("decoding invoice {id}")))
}

async fn load_line_items(
    conn: &mut SqliteConnection,
    invoice_id: InvoiceId,
) -> StoreResult<Vec<InvoiceLineItem>> {
    let rows =
        sqlx::query("SELECT * FROM invoice_line_items WHERE invoice_id = ? ORDER BY position")
            .bind(invoice_id.to_string())
            .fetch_all(&mut *conn)
            .await
            .map_err(StoreError::db(format!(
                "loading line items of invoice {invoice_id}"
            )))?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut item =
            line_item_from_row(row).map_err(StoreError::db("decoding invoice line item row"))?;
        let id_rows: Vec<(String,)> = sqlx::query_as(
            "SELECT consultant_id FROM invoice_line_item_consultants WHERE line_item_id = ? ORDER BY position",
        )
        .bind(item.id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::db(format!(
            "loading consultants of line item {}",
            item.id
        )))?;
        item.consultant_ids = id_rows
            .into_iter()
            .map(|(s,)| s.parse::<ConsultantId>())
            .collect::<Result<Vec<_>, DomainError>>()?;
        items.push(item);
    }
    Ok(items)
}

async fn persist_totals(conn: &mut SqliteConnection, invoice: &ClientInvoice) -> StoreResult<()> {
    sqlx::query(
        "UPDATE client_invoices SET subtotal = ?, tax = ?, total = ?, amount_due = ? WHERE id = ?",
    )
    .bind(invoice.subtotal.cents())
    .bind(invoice.tax.cents())
    .bind(invoice.total.cents())
    .bind(invoice.amount_due.cents())
    .bind(invoice.id.to_string())
    .execute(&mut *conn)
    .await
    .map_err(StoreError::db(format!(
        "persisting totals of invoice {}",
        invoice.invoice_number
    )))?;
    Ok(())
}

async fn insert_line_item(
    conn: &mut SqliteConnection,
    item: &InvoiceLineItem,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoice_line_items (
            id, invoice_id, service_name, description, quantity, rate, amount, position
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.id.to_string())
    .bind(item.invoice_id.to_string())
    .bind(&item.service_name)
    .bind(&item.description)
    .bind(item.quantity)
    .bind(item.rate.cents())
    .bind(item.amount.cents())
    .bind(item.position)
    .execute(&mut *conn)
    .await
    .map_err(StoreError::db(format!(
        "inserting line item {} of invoice {}",
        item.service_name, item.invoice_id
    )))?;

    for (position, consultant_id) in item.consultant_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO invoice_line_item_consultants (line_item_id, consultant_id, position) VALUES (?, ?, ?)",
        )
        .bind(item.id.to_string())
        .bind(consultant_id.to_string())
        .bind(position as i64)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::db(format!(
            "linking consultant {consultant_id} to line item {}",
            item.id
        )))?;
    }
    Ok(())
}

impl ClientInvoiceService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Non-transactional variant of the number sequence for simple creates
    /// where atomicity with another write is not required. Invoice numbers
    /// are an advisory display field, not a financial control.
    pub async fn next_invoice_number(&self) -> StoreResult<i64> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::db("acquiring connection for number sequence"))?;
        next_invoice_number_in(conn.as_mut()).await
    }

    /// Generate the invoice for a cycle: group its consultants into line
    /// items, append the bonus line, allocate the next number and persist
    /// everything in one transaction.
    pub async fn create_from_cycle(
        &self,
        cycle_id: CycleId,
        issue_date: NaiveDate,
    ) -> StoreResult<(ClientInvoice, Vec<InvoiceLineItem>)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::db("beginning invoice creation"))?;

        // Guards run on the transaction connection, so the read and the
        // insert see the same snapshot.
        let Some(bonus) = cycle_bonus_in(&mut tx, cycle_id).await? else {
            return Err(StoreError::not_found(format!("cycle {cycle_id}")));
        };

        if let Some(existing) = invoice_for_cycle_in(&mut tx, cycle_id).await? {
            return Err(StoreError::validation(format!(
                "cycle {cycle_id} already has invoice {}",
                existing.invoice_number
            )));
        }

        let consultants = cycle_consultants_in(&mut tx, cycle_id).await?;
        // Fails closed before any write: collect-all validation of billing
        // unit prices happens here.
        let draft = draft_from_consultants(&consultants, bonus)?;

        let number = next_invoice_number_in(&mut tx).await?;
        let mut invoice = ClientInvoice::new(cycle_id, number, issue_date);
        invoice.subtotal = draft.subtotal;
        invoice.total = draft.subtotal + invoice.tax;
        invoice.amount_due = invoice.total;

        sqlx::query(
            r#"
            INSERT INTO client_invoices (
                id, cycle_id, invoice_number, status, issue_date,
                sent_date, approved_date, paid_date,
                subtotal, tax, total, amount_due, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(invoice.id.to_string())
        .bind(invoice.cycle_id.to_string())
        .bind(invoice.invoice_number)
        .bind(invoice.status.as_str())
        .bind(invoice.issue_date)
        .bind(invoice.sent_date)
        .bind(invoice.approved_date)
        .bind(invoice.paid_date)
        .bind(invoice.subtotal.cents())
        .bind(invoice.tax.cents())
        .bind(invoice.total.cents())
        .bind(invoice.amount_due.cents())
        .bind(invoice.created_at)
        .execute(&mut *tx)
        .await
        // A concurrent create that slipped past the read lands on the
        // partial unique index; surface it as the same validation failure.
        .map_err(|e| translate_duplicate_invoice(cycle_id, number, e))?;

        let mut items = Vec::with_capacity(draft.lines.len());
        for (position, line) in draft.lines.into_iter().enumerate() {
            let item = InvoiceLineItem {
                id: InvoiceLineItemId::new(),
                invoice_id: invoice.id,
                service_name: line.service_name,
                description: line.description,
                quantity: line.quantity,
                rate: line.rate,
                amount: line.amount,
                position: position as i64,
                consultant_ids: line.consultant_ids,
            };
            insert_line_item(&mut tx, &item).await?;
            items.push(item);
        }

        tx.commit().await.map_err(StoreError::db(format!(
            "committing invoice {number} for cycle {cycle_id}"
        )))?;

        tracing::info!(
            invoice_number = number,
            cycle_id = %cycle_id,
            line_items = items.len(),
            "created client invoice from cycle"
        );
        Ok((invoice, items))
    }

    /// Whether `create_from_cycle` would succeed, without mutating state.
    pub async fn check_from_cycle(&self, cycle_id: CycleId) -> StoreResult<CreateEligibility> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::db("acquiring connection"))?;

        let Some(bonus) = cycle_bonus_in(conn.as_mut(), cycle_id).await? else {
            return Err(StoreError::not_found(format!("cycle {cycle_id}")));
        };

        let mut reasons = Vec::new();
        if let Some(existing) = invoice_for_cycle_in(conn.as_mut(), cycle_id).await? {
            reasons.push(format!(
                "cycle already has invoice {}",
                existing.invoice_number
            ));
        }
        let consultants = cycle_consultants_in(conn.as_mut(), cycle_id).await?;
        match draft_from_consultants(&consultants, bonus) {
            Ok(_) => {}
            Err(DomainError::Validation(msg)) => reasons.push(msg),
            Err(other) => return Err(other.into()),
        }

        Ok(CreateEligibility {
            eligible: reasons.is_empty(),
            reasons,
        })
    }

    pub async fn get(&self, id: InvoiceId) -> StoreResult<(ClientInvoice, Vec<InvoiceLineItem>)> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::db("acquiring connection"))?;
        let invoice = load_invoice(conn.as_mut(), id).await?;
        let items = load_line_items(conn.as_mut(), id).await?;
        Ok((invoice, items))
    }

    /// The cycle's current non-cancelled invoice, if any.
    pub async fn get_by_cycle_id(&self, cycle_id: CycleId) -> StoreResult<Option<ClientInvoice>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::db("acquiring connection"))?;
        invoice_for_cycle_in(conn.as_mut(), cycle_id).await
    }

    pub async fn list(&self) -> StoreResult<Vec<ClientInvoice>> {
        let rows = sqlx::query("SELECT * FROM client_invoices ORDER BY invoice_number DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("listing invoices"))?;
        rows.iter()
            .map(|row| invoice_from_row(row).map_err(StoreError::db("decoding invoice row")))
            .collect()
    }

    /// Edit invoice header fields, then recompute cached totals from the
    /// persisted line items (client-supplied totals are never trusted).
    pub async fn update_fields(
        &self,
        id: InvoiceId,
        issue_date: Option<NaiveDate>,
        tax: Option<Money>,
    ) -> StoreResult<(ClientInvoice, Vec<InvoiceLineItem>)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::db("beginning invoice update"))?;

        let mut invoice = load_invoice(&mut tx, id).await?;
        if let Some(issue_date) = issue_date {
            invoice.issue_date = issue_date;
        }
        if let Some(tax) = tax {
            if tax.is_negative() {
                return Err(StoreError::validation("invoice tax must not be negative"));
            }
            invoice.tax = tax;
        }

        let items = load_line_items(&mut tx, id).await?;
        invoice.recompute_totals(&items);

        sqlx::query("UPDATE client_invoices SET issue_date = ? WHERE id = ?")
            .bind(invoice.issue_date)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::db(format!("updating invoice {id}")))?;
        persist_totals(&mut tx, &invoice).await?;

        tx.commit()
            .await
            .map_err(StoreError::db("committing invoice update"))?;
        Ok((invoice, items))
    }

    /// Set the status; the first transition into SENT/APPROVED/PAID stamps
    /// the matching date exactly once.
    pub async fn update_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<ClientInvoice> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::db("beginning status update"))?;

        let mut invoice = load_invoice(&mut tx, id).await?;
        invoice.set_status(status, now);

        sqlx::query(
            r#"
            UPDATE client_invoices SET
                status = ?, sent_date = ?, approved_date = ?, paid_date = ?
            WHERE id = ?
            "#,
        )
        .bind(invoice.status.as_str())
        .bind(invoice.sent_date)
        .bind(invoice.approved_date)
        .bind(invoice.paid_date)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::db(format!(
            "updating status of invoice {}",
            invoice.invoice_number
        )))?;

        tx.commit()
            .await
            .map_err(StoreError::db("committing status update"))?;
        Ok(invoice)
    }

    /// Edit one line item and reconcile the invoice's cached totals with the
    /// full persisted line-item set, in one transaction.
    pub async fn update_line_item(
        &self,
        invoice_id: InvoiceId,
        line_item_id: InvoiceLineItemId,
        patch: LineItemPatch,
    ) -> StoreResult<(ClientInvoice, Vec<InvoiceLineItem>)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::db("beginning line item update"))?;

        let mut invoice = load_invoice(&mut tx, invoice_id).await?;
        let mut items = load_line_items(&mut tx, invoice_id).await?;
        let item = items
            .iter_mut()
            .find(|i| i.id == line_item_id)
            .ok_or_else(|| {
                StoreError::not_found(format!(
                    "line item {line_item_id} on invoice {invoice_id}"
                ))
            })?;

        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(rate) = patch.rate {
            item.rate = rate;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        item.recompute_amount()?;

        sqlx::query(
            "UPDATE invoice_line_items SET description = ?, quantity = ?, rate = ?, amount = ? WHERE id = ?",
        )
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.rate.cents())
        .bind(item.amount.cents())
        .bind(line_item_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::db(format!("updating line item {line_item_id}")))?;

        invoice.recompute_totals(&items);
        persist_totals(&mut tx, &invoice).await?;

        tx.commit()
            .await
            .map_err(StoreError::db("committing line item update"))?;
        Ok((invoice, items))
    }

    /// Re-derive the bonus line from the invoice's cycle, update it in place
    /// (or append it at the end of the sort order), and recompute totals
    /// from the full current line-item set.
    pub async fn sync_bonus_from_cycle(
        &self,
        invoice_id: InvoiceId,
    ) -> StoreResult<(ClientInvoice, Vec<InvoiceLineItem>)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::db("beginning bonus sync"))?;

        let mut invoice = load_invoice(&mut tx, invoice_id).await?;

        let Some(target) = cycle_bonus_in(&mut tx, invoice.cycle_id).await? else {
            return Err(StoreError::not_found(format!("cycle {}", invoice.cycle_id)));
        };

        let mut items = load_line_items(&mut tx, invoice_id).await?;
        match items.iter_mut().find(|i| i.is_bonus_line()) {
            Some(bonus_line) => {
                bonus_line.quantity = 1;
                bonus_line.rate = target;
                bonus_line.amount = target;
                sqlx::query(
                    "UPDATE invoice_line_items SET quantity = 1, rate = ?, amount = ? WHERE id = ?",
                )
                .bind(target.cents())
                .bind(target.cents())
                .bind(bonus_line.id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StoreError::db(format!(
                    "updating bonus line of invoice {}",
                    invoice.invoice_number
                )))?;
            }
            None => {
                let position = items.iter().map(|i| i.position + 1).max().unwrap_or(0);
                let item = InvoiceLineItem {
                    id: InvoiceLineItemId::new(),
                    invoice_id,
                    service_name: crewpay_invoicing::BONUS_LINE_SERVICE.to_string(),
                    description: crewpay_invoicing::BONUS_LINE_SERVICE.to_string(),
                    quantity: 1,
                    rate: target,
                    amount: target,
                    position,
                    consultant_ids: Vec::new(),
                };
                insert_line_item(&mut tx, &item).await?;
                items.push(item);
            }
        }

        invoice.recompute_totals(&items);
        persist_totals(&mut tx, &invoice).await?;

        tx.commit()
            .await
            .map_err(StoreError::db("committing bonus sync"))?;
        Ok((invoice, items))
    }

    /// Hard delete: join rows, line items, then the invoice row. Callers
    /// needing audit history must capture state before calling this.
    pub async fn delete(&self, id: InvoiceId) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::db("beginning invoice deletion"))?;

        // Existence check first so a missing invoice is NotFound, not a no-op.
        load_invoice(&mut tx, id).await?;

        sqlx::query(
            r#"
            DELETE FROM invoice_line_item_consultants
            WHERE line_item_id IN (SELECT id FROM invoice_line_items WHERE invoice_id = ?)
            "#,
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::db(format!(
            "deleting line item consultants of invoice {id}"
        )))?;

        sqlx::query("DELETE FROM invoice_line_items WHERE invoice_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::db(format!("deleting line items of invoice {id}")))?;

        sqlx::query("DELETE FROM client_invoices WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| crate::error::translate_delete_constraint(&format!("invoice {id}"), e))?;

        tx.commit()
            .await
            .map_err(StoreError::db("committing invoice deletion"))?;
        Ok(())
    }

}
