use crate::channel::{ChannelError, ChannelSender};
use crate::contact::AlertContact;
use crate::formatter::MessageFormatter;
use crate::message::DeviceMessage;
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, QoS};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// MQTT broker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    /// Topics are `{topic_prefix}/{device_id}/alerts`
    pub topic_prefix: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "fireguard-alerts".to_string(),
            keep_alive_secs: 30,
            topic_prefix: "fire-detection".to_string(),
        }
    }
}

/// Publishes the JSON payload of each message
pub struct MqttSender {
    client: AsyncClient,
    topic_prefix: String,
}

impl MqttSender {
    /// Create the client and spawn its event loop
    pub fn connect(config: &MqttConfig) -> Self {
        let mut options =
            MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(incoming)) => {
                        debug!("MQTT incoming: {:?}", incoming);
                    }
                    Err(e) => {
                        error!("MQTT error: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    _ => {}
                }
            }
        });

        info!("MQTT sender using broker {}:{}", config.broker_host, config.broker_port);
        Self::from_client(client, &config.topic_prefix)
    }

    /// Wrap an existing client
    pub fn from_client(client: AsyncClient, topic_prefix: impl Into<String>) -> Self {
        Self {
            client,
            topic_prefix: topic_prefix.into(),
        }
    }

    pub fn topic(&self, device_id: &str) -> String {
        format!("{}/{}/alerts", self.topic_prefix, device_id)
    }
}

#[async_trait]
impl ChannelSender for MqttSender {
    async fn send(
        &self,
        message: &DeviceMessage,
        contact: &AlertContact,
    ) -> Result<(), ChannelError> {
        let payload = MessageFormatter::json_payload(message)?;
        let topic = self.topic(&message.device_id);

        self.client
            .publish(&topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| ChannelError::NotConnected(e.to_string()))?;

        debug!("Published {} to {} for {}", message.message_id, topic, contact.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ChannelKind;
    use crate::message::MessageType;
    use risk_engine::RiskLevel;

    fn sender() -> (MqttSender, rumqttc::EventLoop) {
        let options = MqttOptions::new("test-client", "localhost", 1883);
        let (client, eventloop) = AsyncClient::new(options, 10);
        (MqttSender::from_client(client, "fire-detection"), eventloop)
    }

    #[tokio::test]
    async fn test_topic() {
        let (sender, _eventloop) = sender();
        assert_eq!(sender.topic("TANK_A_001"), "fire-detection/TANK_A_001/alerts");
    }

    #[tokio::test]
    async fn test_publish_is_queued() {
        let (sender, _eventloop) = sender();
        let message = DeviceMessage::new("TANK_A_001", 1.0, MessageType::Alert, RiskLevel::High);
        let contact = AlertContact::new("Ops", "", "", "Ops", 1, vec![ChannelKind::Mqtt]);

        assert!(sender.send(&message, &contact).await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_fails_without_event_loop() {
        let (sender, eventloop) = sender();
        drop(eventloop);
        let message = DeviceMessage::new("TANK_A_001", 1.0, MessageType::Alert, RiskLevel::High);
        let contact = AlertContact::new("Ops", "", "", "Ops", 1, vec![ChannelKind::Mqtt]);

        let err = sender.send(&message, &contact).await.unwrap_err();
        assert!(matches!(err, ChannelError::NotConnected(_)));
    }
}
