//! Alert Contacts and Channel Kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery channel a contact accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    #[serde(rename = "sms")]
    Sms,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "http")]
    HttpPost,
    #[serde(rename = "mqtt")]
    Mqtt,
    #[serde(rename = "lora")]
    Lora,
    #[serde(rename = "webhook")]
    Webhook,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Sms => "sms",
            ChannelKind::Email => "email",
            ChannelKind::HttpPost => "http",
            ChannelKind::Mqtt => "mqtt",
            ChannelKind::Lora => "lora",
            ChannelKind::Webhook => "webhook",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Person notified about alerts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertContact {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub role: String,
    /// 1 = highest priority
    pub priority: u32,
    /// Channels in preference order
    pub channels: Vec<ChannelKind>,
}

impl AlertContact {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        priority: u32,
        channels: Vec<ChannelKind>,
    ) -> Self {
        let mut unique = Vec::with_capacity(channels.len());
        for channel in channels {
            if !unique.contains(&channel) {
                unique.push(channel);
            }
        }
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            role: role.into(),
            priority,
            channels: unique,
        }
    }
}
