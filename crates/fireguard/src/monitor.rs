use crate::config::MonitorConfig;
use crate::FireguardError;
use alerting::channels::{EmailOutbox, HttpPostSender, MqttSender, SmsOutbox, WebhookSender};
use alerting::{
    AlertContact, ChannelKind, ChannelRegistry, DeviceMessage, DispatchReport, EscalationManager,
    MessageType,
};
use risk_engine::{RiskAssessment, RiskAssessmentEngine, RiskLevel, SensorReading};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of processing one reading
#[derive(Debug)]
pub struct MonitorOutcome {
    pub assessment: RiskAssessment,
    pub dispatch: DispatchReport,
}

/// Assesses readings from one device and dispatches the results
pub struct Monitor {
    device_id: String,
    latitude: f64,
    longitude: f64,
    engine: RiskAssessmentEngine,
    manager: EscalationManager,
}

impl Monitor {
    /// Build a monitor with the given channel senders
    pub fn new(config: &MonitorConfig, registry: ChannelRegistry) -> Result<Self, FireguardError> {
        config.validate()?;

        let engine =
            RiskAssessmentEngine::new(config.fuel_type).with_trend_window(config.trend_window()?);
        let manager = EscalationManager::new(config.alerting.clone(), registry);
        for contact in &config.contacts {
            manager.add_contact(AlertContact::new(
                contact.name.clone(),
                contact.phone.clone(),
                contact.email.clone(),
                contact.role.clone(),
                contact.priority,
                contact.channels.clone(),
            ));
        }

        info!(
            "Monitor for {} ({} fuel) with {} contacts",
            config.device_id,
            config.fuel_type,
            config.contacts.len()
        );

        Ok(Self {
            device_id: config.device_id.clone(),
            latitude: config.latitude,
            longitude: config.longitude,
            engine,
            manager,
        })
    }

    /// Build a monitor with the built-in senders
    ///
    /// SMS and e-mail go to the log outboxes; HTTP, webhook and MQTT are
    /// registered when configured. Must be called inside a tokio runtime.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, FireguardError> {
        let mut registry = ChannelRegistry::new()
            .with(ChannelKind::Sms, Arc::new(SmsOutbox))
            .with(ChannelKind::Email, Arc::new(EmailOutbox));
        if let Some(url) = &config.http_url {
            registry.register(ChannelKind::HttpPost, Arc::new(HttpPostSender::new(url.clone())));
        }
        if let Some(url) = &config.webhook_url {
            registry.register(ChannelKind::Webhook, Arc::new(WebhookSender::new(url.clone())));
        }
        if let Some(mqtt) = &config.mqtt {
            registry.register(ChannelKind::Mqtt, Arc::new(MqttSender::connect(mqtt)));
        }
        Self::new(config, registry)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn engine(&self) -> &RiskAssessmentEngine {
        &self.engine
    }

    /// Shared handle for acknowledgments and contact changes
    pub fn manager(&self) -> &EscalationManager {
        &self.manager
    }

    /// Assess a reading and dispatch the resulting message
    pub async fn process(
        &mut self,
        reading: SensorReading,
        battery_level: u8,
        signal_strength: u8,
    ) -> MonitorOutcome {
        let assessment = self.engine.assess(reading);
        debug!(
            "{}: {} (score {:.3})",
            self.device_id, assessment.risk_level, assessment.risk_score
        );

        let message_type = if assessment.risk_level == RiskLevel::Safe {
            MessageType::SensorData
        } else {
            MessageType::Alert
        };

        let message = DeviceMessage::new(
            self.device_id.clone(),
            reading.timestamp,
            message_type,
            assessment.risk_level,
        )
        .with_sensor_data(reading)
        .with_assessment(assessment.clone())
        .with_telemetry(battery_level, signal_strength)
        .with_location(self.latitude, self.longitude);

        let dispatch = self.manager.dispatch(message).await;
        MonitorOutcome { assessment, dispatch }
    }
}
