//! Best-effort mail notification, driven by the engine's order lifecycle events.
//!
//! The notifier subscribes to the event hooks, renders a short message for the interested party
//! and hands it to a [`MailTransport`]. Everything here is fire-and-forget: a failed lookup or a
//! failed delivery is logged and never reaches the request that triggered the event.
use std::{future::Future, pin::Pin, sync::Arc};

use agrolink_engine::{
    events::{EventHooks, NewOrderEvent, OrderCancelledEvent, OrderDeliveredEvent, OrderPaidEvent, OrderShippedEvent},
    IdentityManagement,
    SqliteDatabase,
};
use log::*;

use crate::config::MailConfig;

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery mechanism for notification mail. The shipped implementation writes the rendered
/// message to the log; a real SMTP relay can be slotted in without touching the hooks.
pub trait MailTransport: Send + Sync + 'static {
    fn deliver(&self, mail: MailMessage) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;
}

pub struct LogTransport;

impl MailTransport for LogTransport {
    fn deliver(&self, mail: MailMessage) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send>> {
        Box::pin(async move {
            info!("✉️ [{}] → {}: {}", mail.subject, mail.to, mail.body);
            Ok(())
        })
    }
}

#[derive(Clone)]
pub struct Notifier {
    db: SqliteDatabase,
    config: MailConfig,
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(db: SqliteDatabase, config: MailConfig) -> Self {
        Self { db, config, transport: Arc::new(LogTransport) }
    }

    pub fn with_transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Registers a mail handler for every order lifecycle event. Producers hear about new,
    /// paid and cancelled orders; consumers hear about shipping and delivery.
    pub fn attach(self, hooks: &mut EventHooks) {
        let n = self.clone();
        hooks.on_new_order(move |ev: NewOrderEvent| {
            let n = n.clone();
            Box::pin(async move {
                let subject = format!("Nuevo pedido #{}", ev.order.id);
                let body = format!("Tienes un nuevo pedido #{} por {}.", ev.order.id, ev.order.total);
                n.notify(ev.order.producer_id, subject, body).await;
            })
        });
        let n = self.clone();
        hooks.on_order_paid(move |ev: OrderPaidEvent| {
            let n = n.clone();
            Box::pin(async move {
                let subject = format!("Pedido #{} pagado", ev.order.id);
                let body = format!("El pedido #{} fue pagado ({} vía {}).", ev.order.id, ev.payment.amount, ev.payment.method);
                n.notify(ev.order.producer_id, subject, body).await;
            })
        });
        let n = self.clone();
        hooks.on_order_shipped(move |ev: OrderShippedEvent| {
            let n = n.clone();
            Box::pin(async move {
                let subject = format!("Pedido #{} en camino", ev.order.id);
                let body = format!("Tu pedido #{} va en camino.", ev.order.id);
                n.notify(ev.order.consumer_id, subject, body).await;
            })
        });
        let n = self.clone();
        hooks.on_order_delivered(move |ev: OrderDeliveredEvent| {
            let n = n.clone();
            Box::pin(async move {
                let subject = format!("Pedido #{} entregado", ev.order.id);
                let body = format!("Tu pedido #{} fue entregado. ¡Ya puedes calificarlo!", ev.order.id);
                n.notify(ev.order.consumer_id, subject, body).await;
            })
        });
        let n = self;
        hooks.on_order_cancelled(move |ev: OrderCancelledEvent| {
            let n = n.clone();
            Box::pin(async move {
                let subject = format!("Pedido #{} cancelado", ev.order.id);
                let body = format!("El pedido #{} fue cancelado y el stock fue restaurado.", ev.order.id);
                n.notify(ev.order.producer_id, subject.clone(), body.clone()).await;
                n.notify(ev.order.consumer_id, subject, body).await;
            })
        });
    }

    async fn notify(&self, user_id: i64, subject: String, body: String) {
        if !self.config.is_enabled() {
            debug!("✉️ Mail is not configured; dropping \"{subject}\" for user #{user_id}");
            return;
        }
        let user = match self.db.fetch_user_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("✉️ Recipient #{user_id} no longer exists; dropping \"{subject}\"");
                return;
            },
            Err(e) => {
                warn!("✉️ Could not look up recipient #{user_id}: {e}");
                return;
            },
        };
        let mail = MailMessage { to: user.email, subject, body };
        if let Err(e) = self.transport.deliver(mail).await {
            error!("✉️ Error enviando mail: {e}");
        }
    }
}
