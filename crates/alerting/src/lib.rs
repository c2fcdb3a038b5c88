//! Alerting System
//!
//! Distributes risk-bearing device messages to contacts and escalates
//! unacknowledged HIGH/CRITICAL alerts:
//! - Risk-tiered contact selection
//! - Concurrent multi-channel fan-out with per-send timeouts
//! - Acknowledgment tracking with at-most-once escalation

mod channel;
pub mod channels;
mod config;
mod contact;
mod formatter;
mod manager;
mod message;
mod tracker;

pub use channel::{ChannelError, ChannelRegistry, ChannelSender};
pub use config::AlertConfig;
pub use contact::{AlertContact, ChannelKind};
pub use formatter::{EmailContent, MessageFormatter};
pub use manager::{
    select_contacts, DispatchReport, EscalationManager, EscalationOutcome, SendSummary,
};
pub use message::{DeviceMessage, MessageType};
pub use tracker::{AckOutcome, EscalationStatus};

use thiserror::Error;

/// Alerting errors
#[derive(Debug, Error)]
pub enum AlertError {
    /// Payload could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Text formatting failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}
