//! Consultant and equipment repository.

use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crewpay_consultants::{Consultant, EquipmentItem};
use crewpay_core::{ConsultantId, DomainError, EquipmentItemId, Money};

use crate::error::{StoreError, StoreResult};

#[derive(Clone)]
pub struct ConsultantRepo {
    pool: SqlitePool,
}

fn decode_err(e: DomainError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

pub(crate) fn consultant_from_row(row: &SqliteRow) -> Result<Consultant, sqlx::Error> {
    let id: String = row.try_get("id")?;
    Ok(Consultant {
        id: id.parse().map_err(decode_err)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: row.try_get("role")?,
        hourly_rate: Money::from_cents(row.try_get("hourly_rate")?),
        active: row.try_get("active")?,
        client_invoice_service_name: row.try_get("client_invoice_service_name")?,
        client_invoice_unit_price: row
            .try_get::<Option<i64>, _>("client_invoice_unit_price")?
            .map(Money::from_cents),
        client_invoice_service_description: row.try_get("client_invoice_service_description")?,
        contract_signed_date: row.try_get("contract_signed_date")?,
        termination_date: row.try_get("termination_date")?,
        termination_reason: row.try_get("termination_reason")?,
        equipment_return_deadline: row.try_get("equipment_return_deadline")?,
        created_at: row.try_get("created_at")?,
    })
}

fn equipment_from_row(row: &SqliteRow) -> Result<EquipmentItem, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let consultant_id: String = row.try_get("consultant_id")?;
    Ok(EquipmentItem {
        id: id.parse().map_err(decode_err)?,
        consultant_id: consultant_id.parse().map_err(decode_err)?,
        label: row.try_get("label")?,
        serial_number: row.try_get("serial_number")?,
        assigned_on: row.try_get("assigned_on")?,
        returned_on: row.try_get("returned_on")?,
    })
}

impl ConsultantRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, consultant: &Consultant) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO consultants (
                id, name, email, role, hourly_rate, active,
                client_invoice_service_name, client_invoice_unit_price,
                client_invoice_service_description, contract_signed_date,
                termination_date, termination_reason, equipment_return_deadline,
                created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(consultant.id.to_string())
        .bind(&consultant.name)
        .bind(&consultant.email)
        .bind(&consultant.role)
        .bind(consultant.hourly_rate.cents())
        .bind(consultant.active)
        .bind(&consultant.client_invoice_service_name)
        .bind(consultant.client_invoice_unit_price.map(Money::cents))
        .bind(&consultant.client_invoice_service_description)
        .bind(consultant.contract_signed_date)
        .bind(consultant.termination_date)
        .bind(&consultant.termination_reason)
        .bind(consultant.equipment_return_deadline)
        .bind(consultant.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::db(format!(
            "inserting consultant {}",
            consultant.name
        )))?;
        Ok(())
    }

    pub async fn get(&self, id: ConsultantId) -> StoreResult<Consultant> {
        let row = sqlx::query("SELECT * FROM consultants WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::db(format!("loading consultant {id}")))?
            .ok_or_else(|| StoreError::not_found(format!("consultant {id}")))?;
        consultant_from_row(&row).map_err(StoreError::db(format!("decoding consultant {id}")))
    }

    pub async fn list(&self, active_only: bool) -> StoreResult<Vec<Consultant>> {
        let sql = if active_only {
            "SELECT * FROM consultants WHERE active = 1 ORDER BY name"
        } else {
            "SELECT * FROM consultants ORDER BY name"
        };
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::db("listing consultants"))?;
        rows.iter()
            .map(|row| {
                consultant_from_row(row).map_err(StoreError::db("decoding consultant row"))
            })
            .collect()
    }

    /// Persist the full current state of a consultant.
    pub async fn update(&self, consultant: &Consultant) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE consultants SET
                name = ?, email = ?, role = ?, hourly_rate = ?, active = ?,
                client_invoice_service_name = ?, client_invoice_unit_price = ?,
                client_invoice_service_description = ?, contract_signed_date = ?,
                termination_date = ?, termination_reason = ?,
                equipment_return_deadline = ?
            WHERE id = ?
            "#,
        )
        .bind(&consultant.name)
        .bind(&consultant.email)
        .bind(&consultant.role)
        .bind(consultant.hourly_rate.cents())
        .bind(consultant.active)
        .bind(&consultant.client_invoice_service_name)
        .bind(consultant.client_invoice_unit_price.map(Money::cents))
        .bind(&consultant.client_invoice_service_description)
        .bind(consultant.contract_signed_date)
        .bind(consultant.termination_date)
        .bind(&consultant.termination_reason)
        .bind(consultant.equipment_return_deadline)
        .bind(consultant.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StoreError::db(format!(
            "updating consultant {}",
            consultant.id
        )))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!(
                "consultant {}",
                consultant.id
            )));
        }
        Ok(())
    }

    /// Terminate a consultant: stamps date/reason and the equipment-return
    /// deadline, deactivates them.
    pub async fn terminate(
        &self,
        id: ConsultantId,
        date: NaiveDate,
        reason: &str,
        return_days: u64,
    ) -> StoreResult<Consultant> {
        let mut consultant = self.get(id).await?;
        consultant.terminate(date, reason, return_days)?;
        self.update(&consultant).await?;
        Ok(consultant)
    }

    pub async fn reactivate(&self, id: ConsultantId) -> StoreResult<Consultant> {
        let mut consultant = self.get(id).await?;
        consultant.reactivate();
        self.update(&consultant).await?;
        Ok(consultant)
    }

    pub async fn assign_equipment(&self, item: &EquipmentItem) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO equipment_items (id, consultant_id, label, serial_number, assigned_on, returned_on)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.consultant_id.to_string())
        .bind(&item.label)
        .bind(&item.serial_number)
        .bind(item.assigned_on)
        .bind(item.returned_on)
        .execute(&self.pool)
        .await
        .map_err(StoreError::db(format!(
            "assigning equipment {} to consultant {}",
            item.label, item.consultant_id
        )))?;
        Ok(())
    }

    pub async fn equipment_for(&self, consultant_id: ConsultantId) -> StoreResult<Vec<EquipmentItem>> {
        let rows = sqlx::query(
            "SELECT * FROM equipment_items WHERE consultant_id = ? ORDER BY assigned_on, label",
        )
        .bind(consultant_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::db(format!(
            "listing equipment for consultant {consultant_id}"
        )))?;
        rows.iter()
            .map(|row| equipment_from_row(row).map_err(StoreError::db("decoding equipment row")))
            .collect()
    }

    pub async fn return_equipment(
        &self,
        id: EquipmentItemId,
        date: NaiveDate,
    ) -> StoreResult<EquipmentItem> {
        let row = sqlx::query("SELECT * FROM equipment_items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::db(format!("loading equipment {id}")))?
            .ok_or_else(|| StoreError::not_found(format!("equipment item {id}")))?;
        let mut item = equipment_from_row(&row)
            .map_err(StoreError::db(format!("decoding equipment {id}")))?;

        item.mark_returned(date)?;

        sqlx::query("UPDATE equipment_items SET returned_on = ? WHERE id = ?")
            .bind(item.returned_on)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StoreError::db(format!("returning equipment {id}")))?;
        Ok(item)
    }
}
