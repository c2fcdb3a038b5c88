//! Device Message Envelope

use risk_engine::{RiskAssessment, RiskLevel, SensorReading};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex characters kept from the content hash
const MESSAGE_ID_LEN: usize = 16;

/// Kind of device message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "heartbeat")]
    Heartbeat,
    #[serde(rename = "sensor_data")]
    SensorData,
    #[serde(rename = "alert")]
    Alert,
    #[serde(rename = "status")]
    StatusUpdate,
    #[serde(rename = "error")]
    SystemError,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Heartbeat => "heartbeat",
            MessageType::SensorData => "sensor_data",
            MessageType::Alert => "alert",
            MessageType::StatusUpdate => "status",
            MessageType::SystemError => "error",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message sent from a tank-side device
///
/// `message_id` is derived from device id, timestamp and kind when the
/// message is built and is used to correlate acknowledgments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMessage {
    pub device_id: String,
    /// Epoch seconds
    pub timestamp: f64,
    pub message_type: MessageType,
    pub risk_level: RiskLevel,
    pub sensor_data: Option<SensorReading>,
    pub risk_assessment: Option<RiskAssessment>,
    /// Battery (%)
    pub battery_level: u8,
    /// Signal strength (%)
    pub signal_strength: u8,
    pub gps_lat: f64,
    pub gps_lon: f64,
    pub message_id: String,
}

impl DeviceMessage {
    /// Build a message without payload, telemetry or location
    pub fn new(
        device_id: impl Into<String>,
        timestamp: f64,
        message_type: MessageType,
        risk_level: RiskLevel,
    ) -> Self {
        let device_id = device_id.into();
        let message_id = Self::derive_id(&device_id, timestamp, message_type);
        Self {
            device_id,
            timestamp,
            message_type,
            risk_level,
            sensor_data: None,
            risk_assessment: None,
            battery_level: 0,
            signal_strength: 0,
            gps_lat: 0.0,
            gps_lon: 0.0,
            message_id,
        }
    }

    pub fn with_sensor_data(mut self, reading: SensorReading) -> Self {
        self.sensor_data = Some(reading);
        self
    }

    pub fn with_assessment(mut self, assessment: RiskAssessment) -> Self {
        self.risk_assessment = Some(assessment);
        self
    }

    pub fn with_telemetry(mut self, battery_level: u8, signal_strength: u8) -> Self {
        self.battery_level = battery_level;
        self.signal_strength = signal_strength;
        self
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.gps_lat = lat;
        self.gps_lon = lon;
        self
    }

    /// Stable content hash truncated to 16 hex characters
    pub fn derive_id(device_id: &str, timestamp: f64, message_type: MessageType) -> String {
        let mut hasher = Sha256::new();
        hasher.update(device_id.as_bytes());
        hasher.update(timestamp.to_string().as_bytes());
        hasher.update(message_type.as_str().as_bytes());
        let mut id = hex::encode(hasher.finalize());
        id.truncate(MESSAGE_ID_LEN);
        id
    }
}
