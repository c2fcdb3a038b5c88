use crate::FireguardError;
use alerting::channels::MqttConfig;
use alerting::{AlertConfig, AlertContact};
use config::{Config, Environment, File};
use risk_engine::{FuelType, DEFAULT_TREND_WINDOW};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// Monitor configuration
///
/// Loaded from an optional file overlaid with `FIREGUARD__*` environment
/// variables, e.g. `FIREGUARD__ALERTING__ESCALATION_DELAY_MINUTES=2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub device_id: String,
    pub fuel_type: FuelType,
    pub latitude: f64,
    pub longitude: f64,
    /// Readings kept for trend analysis
    pub trend_window: usize,
    pub alerting: AlertConfig,
    pub contacts: Vec<AlertContact>,
    /// MQTT channel, disabled when absent
    pub mqtt: Option<MqttConfig>,
    /// Endpoint receiving the JSON payload over HTTP POST
    pub http_url: Option<String>,
    /// Incoming-webhook URL for chat notifications
    pub webhook_url: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device_id: "TANK_A_001".to_string(),
            fuel_type: FuelType::Petrol,
            latitude: 0.0,
            longitude: 0.0,
            trend_window: DEFAULT_TREND_WINDOW.get(),
            alerting: AlertConfig::default(),
            contacts: Vec::new(),
            mqtt: None,
            http_url: None,
            webhook_url: None,
        }
    }
}

impl MonitorConfig {
    /// Load from `path` (any format the `config` crate detects) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, FireguardError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("FIREGUARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: MonitorConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FireguardError> {
        if self.device_id.is_empty() {
            return Err(FireguardError::InvalidConfig("device_id is empty".to_string()));
        }
        self.trend_window()?;
        for (name, url) in [("http_url", &self.http_url), ("webhook_url", &self.webhook_url)] {
            if url.as_deref().is_some_and(str::is_empty) {
                return Err(FireguardError::InvalidConfig(format!("{name} is empty")));
            }
        }
        Ok(())
    }

    pub fn trend_window(&self) -> Result<NonZeroUsize, FireguardError> {
        NonZeroUsize::new(self.trend_window).ok_or_else(|| {
            FireguardError::InvalidConfig("trend_window must be positive".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::ChannelKind;
    use std::fs;

    const SITE_TOML: &str = r#"
device_id = "TANK_B_007"
fuel_type = "diesel"
webhook_url = "http://hooks.site/fire"
latitude = -17.8216
longitude = 31.0492

[alerting]
escalation_delay_minutes = 2
auto_escalate = false

[[contacts]]
name = "Fire Chief"
phone = "+1234567890"
email = "chief@fire.dept"
role = "Fire Department"
priority = 1
channels = ["sms", "email"]

[mqtt]
broker_host = "broker.site"
"#;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.fuel_type, FuelType::Petrol);
        assert_eq!(config.trend_window, 30);
        assert!(config.mqtt.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_trend_window_rejected() {
        let config = MonitorConfig {
            trend_window: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FireguardError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let config = MonitorConfig {
            http_url: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FireguardError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_file_and_environment() {
        let path = std::env::temp_dir().join(format!("fireguard-{}.toml", std::process::id()));
        fs::write(&path, SITE_TOML).unwrap();

        let config = MonitorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.device_id, "TANK_B_007");
        assert_eq!(config.fuel_type, FuelType::Diesel);
        assert_eq!(config.alerting.escalation_delay_minutes, 2);
        assert!(!config.alerting.auto_escalate);
        assert_eq!(config.alerting.send_timeout_secs, 10);
        assert_eq!(config.contacts.len(), 1);
        assert_eq!(config.contacts[0].channels, vec![ChannelKind::Sms, ChannelKind::Email]);

        assert_eq!(config.webhook_url.as_deref(), Some("http://hooks.site/fire"));
        assert!(config.http_url.is_none());

        let mqtt = config.mqtt.unwrap();
        assert_eq!(mqtt.broker_host, "broker.site");
        assert_eq!(mqtt.broker_port, 1883);

        std::env::set_var("FIREGUARD__ALERTING__SEND_TIMEOUT_SECS", "3");
        let config = MonitorConfig::load(Some(&path)).unwrap();
        std::env::remove_var("FIREGUARD__ALERTING__SEND_TIMEOUT_SECS");
        assert_eq!(config.alerting.send_timeout_secs, 3);
        assert_eq!(config.alerting.escalation_delay_minutes, 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = MonitorConfig::load(Some(Path::new("/nonexistent/fireguard.toml"))).unwrap();
        assert_eq!(config.fuel_type, FuelType::Petrol);
        assert!(config.contacts.is_empty());
    }
}
