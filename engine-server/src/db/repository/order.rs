//! Order Repository
//!
//! Status transitions are persisted as conditional updates so concurrent
//! writers on one order serialize at the storage layer.

use super::{BaseRepository, RepoError, RepoResult, strip_table_prefix};
use shared::models::{DeliveryDetails, FulfillmentStatus, Order, PaymentResult, PaymentStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "LET $created = CREATE ONLY orders CONTENT $data;
                 SELECT *, type::string(id) AS id FROM $created.id;",
            )
            .bind(("data", order))
            .await?;
        let created: Vec<Order> = result.take(1)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT *, type::string(id) AS id FROM type::thing($table, $id)")
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    pub async fn find_by_user(&self, user: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT *, type::string(id) AS id FROM orders
                 WHERE user = $user ORDER BY created_at DESC",
            )
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// List all orders with optional status filters (operator view)
    pub async fn find_all(
        &self,
        status: Option<FulfillmentStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> RepoResult<Vec<Order>> {
        let mut query = String::from("SELECT *, type::string(id) AS id FROM orders WHERE true");
        if status.is_some() {
            query.push_str(" AND status = $status");
        }
        if payment_status.is_some() {
            query.push_str(" AND payment_status = $payment_status");
        }
        query.push_str(" ORDER BY created_at DESC");

        let orders: Vec<Order> = self
            .base
            .db()
            .query(query)
            .bind(("status", status))
            .bind(("payment_status", payment_status))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Conditional payment-status update
    ///
    /// Only succeeds while the stored payment status still equals `from`.
    /// A completed payment forces fulfillment `pending -> processing` in the
    /// same persisted update. Returns false when the CAS lost.
    pub async fn update_payment_status(
        &self,
        id: &str,
        from: PaymentStatus,
        to: PaymentStatus,
        payment_result: Option<PaymentResult>,
    ) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let updated: Vec<String> = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id)
                 SET payment_status = $to,
                     payment_result = $result,
                     status = IF status = 'pending' AND $to = 'completed'
                         THEN 'processing' ELSE status END,
                     updated_at = $now
                 WHERE payment_status = $from
                 RETURN VALUE type::string(id)",
            )
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .bind(("from", from))
            .bind(("to", to))
            .bind(("result", payment_result))
            .bind(("now", chrono::Utc::now()))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }

    /// Conditional fulfillment-status update (operator override)
    pub async fn update_fulfillment_status(
        &self,
        id: &str,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
        admin_notes: Option<String>,
    ) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let updated: Vec<String> = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id)
                 SET status = $to,
                     admin_notes = $notes ?? admin_notes,
                     updated_at = $now
                 WHERE status = $from
                 RETURN VALUE type::string(id)",
            )
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .bind(("from", from))
            .bind(("to", to))
            .bind(("notes", admin_notes))
            .bind(("now", chrono::Utc::now()))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }

    /// First-delivery flip
    ///
    /// Sets the delivery payload and transitions to delivered only while the
    /// stored status still equals `from`. Returns None when the CAS lost.
    pub async fn set_delivery_if(
        &self,
        id: &str,
        delivery: DeliveryDetails,
        from: FulfillmentStatus,
    ) -> RepoResult<Option<Order>> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id)
                 SET delivery = $delivery, status = 'delivered', updated_at = $now
                 WHERE status = $from
                 RETURN VALUE type::string(id);
                 SELECT *, type::string(id) AS id FROM type::thing($table, $id);",
            )
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .bind(("delivery", delivery))
            .bind(("from", from))
            .bind(("now", chrono::Utc::now()))
            .await?;
        let winners: Vec<String> = result.take(0)?;
        if winners.is_empty() {
            return Ok(None);
        }
        let orders: Vec<Order> = result.take(1)?;
        let order = orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;
        Ok(Some(order))
    }

    /// Overwrite the delivery payload without touching the status
    /// (re-delivery)
    pub async fn set_delivery(&self, id: &str, delivery: DeliveryDetails) -> RepoResult<Order> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id)
                 SET delivery = $delivery, updated_at = $now;
                 SELECT *, type::string(id) AS id FROM type::thing($table, $id);",
            )
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .bind(("delivery", delivery))
            .bind(("now", chrono::Utc::now()))
            .await?;
        let orders: Vec<Order> = result.take(1)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }
}
