//! Outbound notifications
//!
//! Notifications are strictly best-effort: engine operations succeed or fail
//! on their own validation, never on notification delivery. Failures are
//! logged and swallowed at this boundary.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::Config;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Request(String),

    #[error("Notification relay returned status {0}")]
    Status(u16),

    #[error("Notification timed out")]
    Timeout,
}

/// Outbound notifier boundary
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError>;
}

/// Notifier posting to an HTTP mail relay
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Notifier that drops everything, used when no relay is configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), NotifyError> {
        tracing::debug!(to = %to, subject = %subject, "Notification dropped (no relay configured)");
        Ok(())
    }
}

/// Shared notification dispatcher with a bounded timeout
#[derive(Clone)]
pub struct NotifyService {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    /// Recipient for operator-facing notifications
    pub operator_email: Option<String>,
}

impl NotifyService {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration, operator_email: Option<String>) -> Self {
        Self {
            notifier,
            timeout,
            operator_email,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let notifier: Arc<dyn Notifier> = match &config.notify_endpoint {
            Some(endpoint) => Arc::new(HttpNotifier::new(endpoint.clone())),
            None => Arc::new(NoopNotifier),
        };
        Self::new(
            notifier,
            Duration::from_millis(config.notify_timeout_ms),
            config.operator_email.clone(),
        )
    }

    /// Fire-and-forget dispatch
    ///
    /// Spawns the send so the caller never waits on it; timeouts and
    /// failures are logged only.
    pub fn dispatch(&self, to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) {
        let notifier = self.notifier.clone();
        let timeout = self.timeout;
        let to = to.into();
        let subject = subject.into();
        let html = html.into();

        tokio::spawn(async move {
            match tokio::time::timeout(timeout, notifier.send(&to, &subject, &html)).await {
                Ok(Ok(())) => {
                    tracing::debug!(to = %to, subject = %subject, "Notification sent");
                }
                Ok(Err(e)) => {
                    tracing::warn!(to = %to, subject = %subject, error = %e, "Notification failed");
                }
                Err(_) => {
                    tracing::warn!(to = %to, subject = %subject, "Notification timed out");
                }
            }
        });
    }

    /// Dispatch to the operator, a no-op when no operator email is configured
    pub fn dispatch_operator(&self, subject: impl Into<String>, html: impl Into<String>) {
        match &self.operator_email {
            Some(email) => self.dispatch(email.clone(), subject, html),
            None => tracing::debug!("Operator notification skipped (no OPERATOR_EMAIL)"),
        }
    }

    /// Awaited best-effort send with the bounded timeout
    ///
    /// Used where the caller wants to observe the outcome (the sweeper's
    /// per-item accounting) while still never propagating the failure.
    pub async fn send_now(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError> {
        match tokio::time::timeout(self.timeout, self.notifier.send(to, subject, html)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout),
        }
    }
}
