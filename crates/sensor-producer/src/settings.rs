//! Kafka client settings.
//!
//! Settings are kept as raw librdkafka properties so anything found in a
//! client properties file can be passed straight through.

use rdkafka::ClientConfig;
use std::collections::BTreeMap;
use std::fmt;

/// librdkafka properties for the producer and admin clients.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KafkaSettings {
    properties: BTreeMap<String, String>,
}

fn is_secret(key: &str) -> bool {
    key.ends_with("password") || key.ends_with(".secret") || key == "sasl.jaas.config"
}

impl fmt::Debug for KafkaSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties: BTreeMap<&str, &str> = self
            .properties
            .iter()
            .map(|(key, value)| {
                let value = if is_secret(key) { "<redacted>" } else { value.as_str() };
                (key.as_str(), value)
            })
            .collect();
        f.debug_struct("KafkaSettings")
            .field("properties", &properties)
            .finish()
    }
}

impl KafkaSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn bootstrap_servers(&self) -> Option<&str> {
        self.get("bootstrap.servers")
    }

    /// With SASL credentials present, default to SASL_SSL with the PLAIN
    /// mechanism unless the protocol or mechanism was given explicitly.
    pub fn apply_sasl_defaults(&mut self) -> &mut Self {
        if self.get("sasl.username").is_some() {
            if self.get("security.protocol").is_none() {
                self.set("security.protocol", "SASL_SSL");
            }
            if self.get("sasl.mechanisms").is_none() && self.get("sasl.mechanism").is_none() {
                self.set("sasl.mechanisms", "PLAIN");
            }
        }
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        for (key, value) in &self.properties {
            config.set(key, value);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sasl_defaults_applied_with_username() {
        let mut settings = KafkaSettings::new();
        settings
            .set("bootstrap.servers", "broker:9092")
            .set("sasl.username", "key")
            .set("sasl.password", "secret")
            .apply_sasl_defaults();

        assert_eq!(settings.get("security.protocol"), Some("SASL_SSL"));
        assert_eq!(settings.get("sasl.mechanisms"), Some("PLAIN"));
    }

    #[test]
    fn test_sasl_defaults_do_not_override() {
        let mut settings = KafkaSettings::new();
        settings
            .set("sasl.username", "key")
            .set("security.protocol", "SASL_PLAINTEXT")
            .set("sasl.mechanism", "SCRAM-SHA-512")
            .apply_sasl_defaults();

        assert_eq!(settings.get("security.protocol"), Some("SASL_PLAINTEXT"));
        assert_eq!(settings.get("sasl.mechanisms"), None);
    }

    #[test]
    fn test_no_sasl_without_username() {
        let mut settings = KafkaSettings::new();
        settings
            .set("bootstrap.servers", "localhost:9092")
            .apply_sasl_defaults();

        assert_eq!(settings.get("security.protocol"), None);
        assert_eq!(settings.bootstrap_servers(), Some("localhost:9092"));
    }

    #[test]
    fn test_client_config_carries_properties() {
        let mut settings = KafkaSettings::new();
        settings
            .set("bootstrap.servers", "localhost:9092")
            .set("linger.ms", "5");

        let config = settings.client_config();
        assert_eq!(config.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(config.get("linger.ms"), Some("5"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let mut settings = KafkaSettings::new();
        settings
            .set("sasl.username", "key")
            .set("sasl.password", "hunter2")
            .set("ssl.key.password", "keypass")
            .set("sasl.oauthbearer.client.secret", "tok-81f3")
            .set(
                "sasl.jaas.config",
                "PlainLoginModule required username=\"key\" password=\"pw-77\";",
            );

        let printed = format!("{settings:?}");
        assert!(printed.contains("\"sasl.username\": \"key\""));
        assert!(printed.contains("<redacted>"));
        for secret in ["hunter2", "keypass", "tok-81f3", "pw-77"] {
            assert!(!printed.contains(secret), "{secret} leaked in {printed}");
        }
    }
}
