//! Expiry sweeper
//!
//! Periodic task that bulk-expires overdue subscriptions and warns users
//! whose subscriptions fall inside the lookahead window. Every per-item
//! failure is logged and skipped; a sweep never aborts mid-way.

use chrono::{DateTime, Duration, Utc};
use shared::error::AppResult;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::db::repository::{OrderRepository, SubscriptionRepository};
use crate::services::{NotifyService, templates};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Subscriptions flipped from active to expired
    pub expired: usize,
    /// Expiry warnings delivered
    pub warned: usize,
    /// Items that failed to notify (missing email or transport error)
    pub skipped: usize,
}

pub struct ExpirySweeper {
    subscriptions: SubscriptionRepository,
    orders: OrderRepository,
    notify: NotifyService,
    warning_days: i64,
    interval_secs: u64,
}

impl ExpirySweeper {
    pub fn new(
        db: Surreal<Db>,
        notify: NotifyService,
        warning_days: i64,
        interval_secs: u64,
    ) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(db.clone()),
            orders: OrderRepository::new(db),
            notify,
            warning_days,
            interval_secs,
        }
    }

    /// One sweep pass at the given instant
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let mut report = SweepReport::default();

        let expired = self.subscriptions.expire_overdue(now).await?;
        report.expired = expired.len();
        for subscription in &expired {
            tracing::info!(
                subscription = subscription.id.as_deref().unwrap_or("-"),
                user = %subscription.user,
                "Subscription expired"
            );
        }

        let until = now + Duration::days(self.warning_days);
        let expiring = self.subscriptions.find_expiring_within(now, until).await?;
        for subscription in &expiring {
            // Warnings go to the buyer, not the provisioned account address
            let email = match self.orders.find_by_id(&subscription.order_id).await {
                Ok(Some(order)) if !order.user_email.is_empty() => order.user_email,
                Ok(_) => {
                    tracing::warn!(
                        subscription = subscription.id.as_deref().unwrap_or("-"),
                        order = %subscription.order_id,
                        "No buyer email on file, skipping expiry warning"
                    );
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        subscription = subscription.id.as_deref().unwrap_or("-"),
                        order = %subscription.order_id,
                        error = %e,
                        "Order lookup failed, skipping expiry warning"
                    );
                    report.skipped += 1;
                    continue;
                }
            };
            let days = subscription.days_remaining(now);
            let (subject, body) = templates::expiry_warning(subscription, days);
            match self.notify.send_now(&email, &subject, &body).await {
                Ok(()) => report.warned += 1,
                Err(e) => {
                    tracing::warn!(
                        subscription = subscription.id.as_deref().unwrap_or("-"),
                        error = %e,
                        "Expiry warning failed"
                    );
                    report.skipped += 1;
                }
            }
        }

        tracing::info!(
            expired = report.expired,
            warned = report.warned,
            skipped = report.skipped,
            "Expiry sweep complete"
        );
        Ok(report)
    }

    /// Periodic loop until the token is cancelled
    pub async fn run(self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(self.interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Expiry sweeper stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep(Utc::now()).await {
                        tracing::error!(error = %e, "Expiry sweep failed");
                    }
                }
            }
        }
    }
}
