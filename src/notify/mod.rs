//! Status-transition notifications, guarded by the per-order,
//! per-status `emails_sent` ledger so repeated sync passes never resend.

pub mod templates;
pub mod transport;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::order::ShippingStatus;
use crate::notify::transport::{MailTransport, OutboundEmail};
use crate::observability::metrics::Metrics;
use crate::store::{OrderStore, StoreError};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("order {0} is missing the delivery context for a {1} email")]
    MissingContext(String, &'static str),

    #[error("email send failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::OrderNotFound(id) => AppError::NotFound(format!("order {id} not found")),
            NotifyError::MissingContext(id, status) => AppError::BadRequest(format!(
                "order {id} is missing the delivery context for a {status} email"
            )),
            NotifyError::Transport(msg) => AppError::Upstream(msg),
            NotifyError::Store(err) => err.into(),
        }
    }
}

/// What a notify call actually did. The idempotency short-circuit and
/// the missing-template case are successful no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    AlreadySent,
    NoTemplate,
}

/// Extra fields the caller can feed into a template, e.g. the failure
/// reason and retry date for a failed delivery.
#[derive(Debug, Clone, Default)]
pub struct NotifyContext {
    pub reason: Option<String>,
    pub next_attempt: Option<NaiveDate>,
}

pub struct Dispatcher {
    store: Arc<dyn OrderStore>,
    mailer: Arc<dyn MailTransport>,
    metrics: Arc<Metrics>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn OrderStore>,
        mailer: Arc<dyn MailTransport>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            mailer,
            metrics,
        }
    }

    pub async fn notify(
        &self,
        order_id: &str,
        status: ShippingStatus,
        ctx: NotifyContext,
        force: bool,
    ) -> Result<NotifyOutcome, NotifyError> {
        let order = match self.store.get(order_id).await {
            Ok(order) => order,
            Err(StoreError::NotFound(_)) => {
                return Err(NotifyError::OrderNotFound(order_id.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        if !templates::has_template(status) {
            debug!(order_id, status = status.as_str(), "no email template for status");
            return Ok(NotifyOutcome::NoTemplate);
        }

        if templates::needs_address(status) && order.shipping_address.is_none() {
            return Err(NotifyError::MissingContext(
                order_id.to_string(),
                status.as_str(),
            ));
        }

        if self.store.has_notified(order_id, status).await? {
            if !force {
                debug!(order_id, status = status.as_str(), "already notified, skipping");
                return Ok(NotifyOutcome::AlreadySent);
            }
            // Forced resend: drop the old ledger entry so the new send
            // time is recorded fresh.
            self.store.clear_notified(order_id, status).await?;
        }

        let rendered = templates::render(&order, status, &ctx)
            .ok_or_else(|| NotifyError::MissingContext(order_id.to_string(), status.as_str()))?;

        let email = OutboundEmail {
            to: order.email.clone(),
            subject: rendered.subject,
            html: rendered.html,
        };

        self.mailer
            .send(&email)
            .await
            .map_err(NotifyError::Transport)?;

        let sent_at = Utc::now();
        self.store.mark_notified(order_id, status, sent_at).await?;

        self.metrics
            .notifications_sent_total
            .with_label_values(&[status.as_str()])
            .inc();
        info!(order_id, status = status.as_str(), "notification email sent");

        Ok(NotifyOutcome::Sent)
    }
}
