//! Message Formatting for Delivery Channels
//!
//! All times are rendered in UTC.

use crate::message::DeviceMessage;
use crate::AlertError;
use chrono::{DateTime, Utc};
use risk_engine::{RiskAssessment, RiskLevel, SensorReading};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write;

/// Rendered e-mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

#[derive(Serialize)]
struct Location {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
struct SensorPayload {
    gas_lpg_ppm: f64,
    gas_smoke_ppm: f64,
    temperature_c: f64,
    humidity_rh: f64,
    flame_detected: bool,
    wind_speed_mps: f64,
    wind_direction_deg: u16,
    barometric_pressure_hpa: f64,
}

impl From<&SensorReading> for SensorPayload {
    fn from(r: &SensorReading) -> Self {
        Self {
            gas_lpg_ppm: r.gas_lpg_ppm,
            gas_smoke_ppm: r.gas_smoke_ppm,
            temperature_c: r.temperature_c,
            humidity_rh: r.humidity_rh,
            flame_detected: r.flame_detected,
            wind_speed_mps: r.wind_speed_mps,
            wind_direction_deg: r.wind_direction_deg,
            barometric_pressure_hpa: r.barometric_pressure_hpa,
        }
    }
}

#[derive(Serialize)]
struct AssessmentPayload<'a> {
    risk_score: f64,
    contributing_factors: &'a [String],
    recommended_actions: &'a [String],
    confidence: f64,
}

impl<'a> From<&'a RiskAssessment> for AssessmentPayload<'a> {
    fn from(a: &'a RiskAssessment) -> Self {
        Self {
            risk_score: a.risk_score,
            contributing_factors: &a.contributing_factors,
            recommended_actions: &a.recommended_actions,
            confidence: a.confidence,
        }
    }
}

#[derive(Serialize)]
struct JsonPayload<'a> {
    device_id: &'a str,
    timestamp: f64,
    message_type: &'static str,
    risk_level: u8,
    battery_level: u8,
    signal_strength: u8,
    location: Location,
    message_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensor_data: Option<SensorPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk_assessment: Option<AssessmentPayload<'a>>,
}

/// Formats messages for the delivery channels
pub struct MessageFormatter;

impl MessageFormatter {
    /// Short SMS text
    pub fn sms(message: &DeviceMessage) -> String {
        let location = format!("GPS: {:.4}, {:.4}", message.gps_lat, message.gps_lon);
        let time = format_time(message.timestamp, "%H:%M:%S");

        match message.risk_level {
            RiskLevel::Critical => format!(
                "🚨 CRITICAL FIRE ALERT\nDevice: {}\nTime: {}\nLocation: {}\nIMMEDIATE ACTION REQUIRED!",
                message.device_id, time, location
            ),
            RiskLevel::High => format!(
                "⚠️ HIGH FIRE RISK\nDevice: {}\nTime: {}\nLocation: {}\nMonitor closely",
                message.device_id, time, location
            ),
            level => format!(
                "ℹ️ Fire Risk Update\nDevice: {}\nRisk: {}\nTime: {}",
                message.device_id, level, time
            ),
        }
    }

    /// E-mail subject and body
    pub fn email(message: &DeviceMessage) -> Result<EmailContent, AlertError> {
        let prefix = if message.risk_level == RiskLevel::Critical {
            "🚨 CRITICAL"
        } else {
            "⚠️ ALERT"
        };
        let subject = format!("{} - Fire Detection System - {}", prefix, message.device_id);

        let mut body = String::new();
        writeln!(body)?;
        writeln!(body, "Fire Detection System Alert")?;
        writeln!(body)?;
        writeln!(body, "Device Information:")?;
        writeln!(body, "- Device ID: {}", message.device_id)?;
        writeln!(body, "- Timestamp: {}", format_time(message.timestamp, "%Y-%m-%d %H:%M:%S"))?;
        writeln!(body, "- Risk Level: {}", message.risk_level)?;
        writeln!(body, "- Location: {:.6}, {:.6}", message.gps_lat, message.gps_lon)?;
        writeln!(body, "- Battery Level: {}%", message.battery_level)?;
        writeln!(body, "- Signal Strength: {}%", message.signal_strength)?;
        writeln!(body)?;

        if let Some(r) = &message.sensor_data {
            writeln!(body, "Sensor Readings:")?;
            writeln!(body, "- Gas Concentration (LPG): {:.1} ppm", r.gas_lpg_ppm)?;
            writeln!(body, "- Gas Concentration (Smoke): {:.1} ppm", r.gas_smoke_ppm)?;
            writeln!(body, "- Temperature: {:.1}°C", r.temperature_c)?;
            writeln!(body, "- Humidity: {:.1}%", r.humidity_rh)?;
            writeln!(body, "- Flame Detected: {}", if r.flame_detected { "YES" } else { "NO" })?;
            writeln!(body, "- Wind Speed: {:.1} m/s", r.wind_speed_mps)?;
            writeln!(body)?;
        }

        if let Some(a) = &message.risk_assessment {
            writeln!(body, "Risk Assessment:")?;
            writeln!(body, "- Risk Score: {:.3}", a.risk_score)?;
            writeln!(body, "- Confidence: {:.3}", a.confidence)?;
            writeln!(body, "- Contributing Factors: {}", a.contributing_factors.join(", "))?;
            writeln!(body, "- Recommended Actions: {}", a.recommended_actions.join(", "))?;
            writeln!(body)?;
        }

        writeln!(body)?;
        writeln!(body, "Message ID: {}", message.message_id)?;
        writeln!(body)?;
        writeln!(body, "This is an automated message from the Fire Detection System.")?;
        writeln!(body, "Please respond immediately if this is a critical alert.")?;

        Ok(EmailContent { subject, body })
    }

    /// Pretty-printed JSON for HTTP and MQTT delivery
    pub fn json_payload(message: &DeviceMessage) -> Result<String, AlertError> {
        let payload = JsonPayload {
            device_id: &message.device_id,
            timestamp: message.timestamp,
            message_type: message.message_type.as_str(),
            risk_level: message.risk_level.as_u8(),
            battery_level: message.battery_level,
            signal_strength: message.signal_strength,
            location: Location {
                lat: message.gps_lat,
                lon: message.gps_lon,
            },
            message_id: &message.message_id,
            sensor_data: message.sensor_data.as_ref().map(SensorPayload::from),
            risk_assessment: message.risk_assessment.as_ref().map(AssessmentPayload::from),
        };
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Chat-webhook attachment payload
    pub fn webhook_payload(message: &DeviceMessage) -> serde_json::Value {
        let color = if message.risk_level == RiskLevel::Critical {
            "danger"
        } else {
            "warning"
        };

        json!({
            "text": format!("Fire Alert: {}", message.risk_level),
            "attachments": [{
                "color": color,
                "fields": [
                    {"title": "Device", "value": message.device_id, "short": true},
                    {"title": "Risk Level", "value": message.risk_level.as_str(), "short": true},
                    {"title": "Location", "value": format!("{:.4}, {:.4}", message.gps_lat, message.gps_lon), "short": true},
                    {"title": "Time", "value": format_time(message.timestamp, "%H:%M:%S"), "short": true},
                ]
            }]
        })
    }
}

fn format_time(timestamp: f64, pattern: &str) -> String {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(secs as i64, nanos)
        .unwrap_or_default()
        .format(pattern)
        .to_string()
}
