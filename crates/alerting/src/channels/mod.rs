//! Built-in Channel Senders
//!
//! SMS and e-mail are log-only outboxes standing in for a gateway. HTTP
//! and webhook POST to configured URLs; MQTT publishes to a broker.

mod http;
mod mqtt;
mod outbox;

pub use http::{HttpPostSender, WebhookSender};
pub use mqtt::{MqttConfig, MqttSender};
pub use outbox::{EmailOutbox, SmsOutbox};
