use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Configuration
// ============================================================================
//
// Read once at startup from the environment (after loading `.env`):
//
//   KAFKA_ADDR          broker list; unset -> in-process log
//   ORDER_TOPIC         default "orders"
//   CONSUMER_GROUP      default "accounting"
//   DATABASE_URL        unset -> dispatcher runs receive-only
//   METRICS_PORT        default 9090
//   PUBLISH_TIMEOUT_MS  default 5000
//   PUBLISH_ENABLED     default true; false selects the no-op publisher
//   PACT_DIR            when set, the message pact is written there
//
// Empty values count as unset.
//
// ============================================================================

pub const DEFAULT_ORDER_TOPIC: &str = "orders";
pub const DEFAULT_CONSUMER_GROUP: &str = "accounting";
pub const DEFAULT_METRICS_PORT: u16 = 9090;
pub const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub kafka_addr: Option<String>,
    pub order_topic: String,
    pub consumer_group: String,
    pub database_url: Option<String>,
    pub metrics_port: u16,
    pub publish_timeout: Duration,
    pub publish_enabled: bool,
    pub pact_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let metrics_port = match get("METRICS_PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| format!("Invalid METRICS_PORT: {raw}"))?,
            None => DEFAULT_METRICS_PORT,
        };

        let publish_timeout_ms = match get("PUBLISH_TIMEOUT_MS") {
            Some(raw) => raw.parse::<u64>().with_context(|| format!("Invalid PUBLISH_TIMEOUT_MS: {raw}"))?,
            None => DEFAULT_PUBLISH_TIMEOUT_MS,
        };

        let publish_enabled = match get("PUBLISH_ENABLED") {
            Some(raw) => parse_bool(&raw).with_context(|| format!("Invalid PUBLISH_ENABLED: {raw}"))?,
            None => true,
        };

        Ok(Self {
            kafka_addr: get("KAFKA_ADDR"),
            order_topic: get("ORDER_TOPIC").unwrap_or_else(|| DEFAULT_ORDER_TOPIC.to_string()),
            consumer_group: get("CONSUMER_GROUP").unwrap_or_else(|| DEFAULT_CONSUMER_GROUP.to_string()),
            database_url: get("DATABASE_URL"),
            metrics_port,
            publish_timeout: Duration::from_millis(publish_timeout_ms),
            publish_enabled,
            pact_dir: get("PACT_DIR").map(PathBuf::from),
        })
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("expected true or false"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.kafka_addr, None);
        assert_eq!(config.order_topic, "orders");
        assert_eq!(config.consumer_group, "accounting");
        assert_eq!(config.database_url, None);
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.publish_timeout, Duration::from_secs(5));
        assert!(config.publish_enabled);
        assert_eq!(config.pact_dir, None);
    }

    #[test]
    fn test_overrides_and_empty_values() {
        let config = config(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("ORDER_TOPIC", "orders-v2"),
            ("DATABASE_URL", "  "),
            ("METRICS_PORT", "9464"),
            ("PUBLISH_TIMEOUT_MS", "250"),
            ("PUBLISH_ENABLED", "false"),
            ("PACT_DIR", "target/pacts"),
        ])
        .unwrap();

        assert_eq!(config.kafka_addr.as_deref(), Some("kafka:9092"));
        assert_eq!(config.order_topic, "orders-v2");
        assert_eq!(config.database_url, None);
        assert_eq!(config.metrics_port, 9464);
        assert_eq!(config.publish_timeout, Duration::from_millis(250));
        assert!(!config.publish_enabled);
        assert_eq!(config.pact_dir, Some(PathBuf::from("target/pacts")));
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(config(&[("METRICS_PORT", "ninety")]).is_err());
        assert!(config(&[("PUBLISH_TIMEOUT_MS", "-1")]).is_err());
        assert!(config(&[("PUBLISH_ENABLED", "maybe")]).is_err());
    }
}
