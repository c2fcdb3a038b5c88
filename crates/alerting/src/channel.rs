//! Channel Sender Capability and Registry

use crate::contact::{AlertContact, ChannelKind};
use crate::message::DeviceMessage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Channel delivery errors
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    #[error("Contact {contact} has no {field} for this channel")]
    MissingRecipient { contact: String, field: &'static str },

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<crate::AlertError> for ChannelError {
    fn from(err: crate::AlertError) -> Self {
        ChannelError::Serialization(err.to_string())
    }
}

/// Delivers one message to one contact over one transport
#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(
        &self,
        message: &DeviceMessage,
        contact: &AlertContact,
    ) -> Result<(), ChannelError>;
}

/// Senders keyed by channel kind
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    senders: HashMap<ChannelKind, Arc<dyn ChannelSender>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sender, returning the one it replaced
    pub fn register(
        &mut self,
        kind: ChannelKind,
        sender: Arc<dyn ChannelSender>,
    ) -> Option<Arc<dyn ChannelSender>> {
        self.senders.insert(kind, sender)
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, kind: ChannelKind, sender: Arc<dyn ChannelSender>) -> Self {
        self.register(kind, sender);
        self
    }

    pub fn get(&self, kind: ChannelKind) -> Option<&Arc<dyn ChannelSender>> {
        self.senders.get(&kind)
    }

    pub fn contains(&self, kind: ChannelKind) -> bool {
        self.senders.contains_key(&kind)
    }

    /// Registered kinds
    pub fn kinds(&self) -> Vec<ChannelKind> {
        self.senders.keys().copied().collect()
    }
}

impl fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
