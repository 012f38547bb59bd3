use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockwise_core::domain::ticket::{NewTicket, Ticket, TicketPriority, TicketStatus};

use super::{RepositoryError, TicketRepository};
use crate::DbPool;

pub struct SqlTicketRepository {
    pool: DbPool,
}

impl SqlTicketRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TicketRow {
    pub id: i64,
    pub sku: String,
    pub reason: String,
    pub recommended_qty: i64,
    pub vendor_id: String,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub product_name: Option<String>,
    pub vendor_name: Option<String>,
}

pub(crate) fn ticket_from_row(row: TicketRow) -> Result<Ticket, RepositoryError> {
    let priority = TicketPriority::parse(&row.priority).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown ticket priority `{}`", row.priority))
    })?;
    let status = TicketStatus::parse(&row.status)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown ticket status `{}`", row.status)))?;

    Ok(Ticket {
        id: row.id,
        sku: row.sku,
        reason: row.reason,
        recommended_qty: row.recommended_qty,
        vendor_id: row.vendor_id,
        priority,
        status,
        created_at: row.created_at,
        product_name: row.product_name,
        vendor_name: row.vendor_name,
    })
}

const FIND_BY_ID_SQL: &str =
    "SELECT t.id, t.sku, t.reason, t.recommended_qty, t.vendor_id, t.priority, t.status, \
            t.created_at, i.name AS product_name, v.name AS vendor_name \
     FROM tickets t \
     LEFT JOIN inventory i ON t.sku = i.sku \
     LEFT JOIN vendors v ON t.vendor_id = v.vendor_id \
     WHERE t.id = ?";

#[async_trait]
impl TicketRepository for SqlTicketRepository {
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO tickets (sku, reason, recommended_qty, vendor_id, priority, status) \
             VALUES (?, ?, ?, ?, ?, 'pending')",
        )
        .bind(&ticket.sku)
        .bind(&ticket.reason)
        .bind(ticket.recommended_qty)
        .bind(&ticket.vendor_id)
        .bind(ticket.priority.as_str())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or_else(|| {
            RepositoryError::Decode(format!("ticket {id} missing immediately after insert"))
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Ticket>, RepositoryError> {
        let row = sqlx::query_as::<_, TicketRow>(FIND_BY_ID_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ticket_from_row).transpose()
    }

    async fn update_status(&self, id: i64, status: TicketStatus) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE tickets SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
