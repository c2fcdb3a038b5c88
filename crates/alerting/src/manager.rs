//! Escalation Manager Implementation

use crate::channel::{ChannelError, ChannelRegistry, ChannelSender};
use crate::config::AlertConfig;
use crate::contact::{AlertContact, ChannelKind};
use crate::message::{DeviceMessage, MessageType};
use crate::tracker::{AckOutcome, EscalationDecision, EscalationStatus, EscalationTracker};
use chrono::Utc;
use futures::future::join_all;
use risk_engine::RiskLevel;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Counts from one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendSummary {
    /// Sends handed to a registered sender
    pub attempted: usize,
    pub succeeded: usize,
    /// Errors and timeouts
    pub failed: usize,
    /// Channels with no registered sender
    pub skipped: usize,
}

/// What the escalation check did when it fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationOutcome {
    /// Acknowledged in time
    Suppressed,
    /// Broadcast to all contacts
    Escalated(SendSummary),
    /// Another check already escalated this id
    AlreadyEscalated,
}

/// Result of a dispatch
#[derive(Debug)]
pub struct DispatchReport {
    pub message_id: String,
    /// Contacts selected for the risk tier
    pub recipients: usize,
    pub sends: SendSummary,
    /// Pending escalation check, present for HIGH/CRITICAL with auto-escalate
    pub escalation: Option<JoinHandle<EscalationOutcome>>,
}

/// Contacts notified at a risk level
///
/// `contacts` must already be sorted by priority.
pub fn select_contacts(contacts: &[AlertContact], level: RiskLevel) -> Vec<AlertContact> {
    match level {
        RiskLevel::Critical => contacts.to_vec(),
        RiskLevel::High => contacts.iter().filter(|c| c.priority <= 2).cloned().collect(),
        RiskLevel::Medium => contacts.iter().filter(|c| c.priority == 1).cloned().collect(),
        RiskLevel::Low | RiskLevel::Safe => Vec::new(),
    }
}

struct Inner {
    config: AlertConfig,
    contacts: RwLock<Vec<AlertContact>>,
    registry: ChannelRegistry,
    tracker: EscalationTracker,
}

/// Distributes alerts and escalates unacknowledged HIGH/CRITICAL messages
///
/// Cloning is cheap and clones share contacts and tracking state.
#[derive(Clone)]
pub struct EscalationManager {
    inner: Arc<Inner>,
}

impl EscalationManager {
    /// Create a new escalation manager
    pub fn new(config: AlertConfig, registry: ChannelRegistry) -> Self {
        info!("Creating escalation manager with config: {:?}, channels: {:?}", config, registry);
        debug!(
            "max_retries={} and require_acknowledgment={} are reserved; failed sends are not retried",
            config.max_retries, config.require_acknowledgment
        );
        Self {
            inner: Arc::new(Inner {
                config,
                contacts: RwLock::new(Vec::new()),
                registry,
                tracker: EscalationTracker::default(),
            }),
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.inner.config
    }

    /// Add a contact, keeping the list sorted by priority
    pub fn add_contact(&self, contact: AlertContact) {
        info!("Adding contact {} (priority {})", contact.name, contact.priority);
        let mut contacts = self.inner.contacts.write().unwrap_or_else(PoisonError::into_inner);
        contacts.push(contact);
        contacts.sort_by_key(|c| c.priority);
    }

    /// Remove all contacts with the given name
    pub fn remove_contact(&self, name: &str) -> bool {
        let mut contacts = self.inner.contacts.write().unwrap_or_else(PoisonError::into_inner);
        let before = contacts.len();
        contacts.retain(|c| c.name != name);
        before != contacts.len()
    }

    /// Snapshot of the contact list
    pub fn contacts(&self) -> Vec<AlertContact> {
        self.inner.contacts_snapshot()
    }

    /// Contacts a dispatch at `level` would notify right now
    pub fn contacts_for_level(&self, level: RiskLevel) -> Vec<AlertContact> {
        select_contacts(&self.inner.contacts_snapshot(), level)
    }

    /// Send a message to the contacts of its risk tier
    ///
    /// Waits for every send to finish or time out. HIGH/CRITICAL messages
    /// get an escalation check scheduled when auto-escalate is on.
    pub async fn dispatch(&self, message: DeviceMessage) -> DispatchReport {
        info!(
            "Processing message {} with risk level {}",
            message.message_id, message.risk_level
        );

        self.inner.tracker.begin_dispatch(&message.message_id);
        let recipients = self.contacts_for_level(message.risk_level);
        let sends = self.inner.fan_out(&message, &recipients).await;

        let escalate = message.risk_level.is_escalatable() && self.inner.config.auto_escalate;
        self.inner
            .tracker
            .record_sent(&message.message_id, Utc::now(), escalate);
        self.inner.prune_tracking();

        metrics::counter!("alert_dispatches_total", "level" => message.risk_level.as_str())
            .increment(1);

        let message_id = message.message_id.clone();
        let escalation = if escalate {
            Some(self.schedule_escalation(message))
        } else {
            None
        };

        DispatchReport {
            message_id,
            recipients: recipients.len(),
            sends,
            escalation,
        }
    }

    /// Record an acknowledgment for a message id
    pub fn acknowledge(&self, message_id: &str, contact_name: &str) -> AckOutcome {
        let outcome = self.inner.tracker.acknowledge(message_id, contact_name);
        match outcome {
            AckOutcome::Acknowledged => {
                info!("Message {} acknowledged by {}", message_id, contact_name)
            }
            AckOutcome::AlreadyAcknowledged => {
                debug!("Message {} already acknowledged ({})", message_id, contact_name)
            }
            AckOutcome::TooLate => warn!(
                "Message {} acknowledged by {} after escalation",
                message_id, contact_name
            ),
            AckOutcome::Unknown => warn!(
                "Acknowledgment from {} for unknown message {}",
                contact_name, message_id
            ),
        }
        outcome
    }

    /// Tracking state for a message id
    pub fn status(&self, message_id: &str) -> Option<EscalationStatus> {
        self.inner.tracker.status(message_id)
    }

    /// Dispatched ids still awaiting acknowledgment or escalation
    pub fn pending(&self) -> Vec<String> {
        self.inner.tracker.pending()
    }

    fn schedule_escalation(&self, message: DeviceMessage) -> JoinHandle<EscalationOutcome> {
        let inner = Arc::clone(&self.inner);
        let delay = inner.config.escalation_delay();
        debug!("Escalation check for {} in {:?}", message.message_id, delay);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.escalate(message).await
        })
    }
}

impl Inner {
    fn contacts_snapshot(&self) -> Vec<AlertContact> {
        self.contacts.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn prune_tracking(&self) {
        let cutoff = chrono::Duration::from_std(self.config.tracking_retention())
            .ok()
            .and_then(|retention| Utc::now().checked_sub_signed(retention));
        if let Some(cutoff) = cutoff {
            let pruned = self.tracker.prune(cutoff);
            if pruned > 0 {
                debug!("Pruned {} settled tracking entries", pruned);
            }
        }
    }

    async fn escalate(&self, message: DeviceMessage) -> EscalationOutcome {
        match self.tracker.try_commit_escalation(&message.message_id) {
            EscalationDecision::Suppressed => {
                info!("Message {} acknowledged - escalation suppressed", message.message_id);
                EscalationOutcome::Suppressed
            }
            EscalationDecision::AlreadyEscalated => {
                debug!("Message {} already escalated", message.message_id);
                EscalationOutcome::AlreadyEscalated
            }
            EscalationDecision::Escalate => {
                warn!("Message {} not acknowledged - escalating", message.message_id);
                metrics::counter!("alert_escalations_total").increment(1);

                let mut escalated = message;
                escalated.message_type = MessageType::Alert;

                let contacts = self.contacts_snapshot();
                let summary = self.fan_out(&escalated, &contacts).await;
                EscalationOutcome::Escalated(summary)
            }
        }
    }

    async fn fan_out(&self, message: &DeviceMessage, contacts: &[AlertContact]) -> SendSummary {
        let timeout = self.config.send_timeout();
        let mut summary = SendSummary::default();
        let mut sends = Vec::new();

        for contact in contacts {
            for &channel in &contact.channels {
                match self.registry.get(channel) {
                    Some(sender) => {
                        sends.push(send_one(sender.as_ref(), channel, message, contact, timeout))
                    }
                    None => {
                        warn!("No handler for channel: {}", channel);
                        summary.skipped += 1;
                    }
                }
            }
        }

        for result in join_all(sends).await {
            summary.attempted += 1;
            match result {
                Ok(()) => summary.succeeded += 1,
                Err(_) => summary.failed += 1,
            }
        }

        debug!("Fan-out for {}: {:?}", message.message_id, summary);
        summary
    }
}

async fn send_one(
    sender: &dyn ChannelSender,
    channel: ChannelKind,
    message: &DeviceMessage,
    contact: &AlertContact,
    timeout: Duration,
) -> Result<(), ChannelError> {
    let result = match tokio::time::timeout(timeout, sender.send(message, contact)).await {
        Ok(result) => result,
        Err(_) => Err(ChannelError::Timeout(timeout)),
    };

    match &result {
        Ok(()) => {
            debug!("Sent {} via {} to {}", message.message_id, channel, contact.name);
            metrics::counter!("alert_sends_total", "channel" => channel.as_str()).increment(1);
        }
        Err(e) => {
            error!("Failed to send via {} to {}: {}", channel, contact.name, e);
            metrics::counter!("alert_send_failures_total", "channel" => channel.as_str())
                .increment(1);
        }
    }
    result
}
