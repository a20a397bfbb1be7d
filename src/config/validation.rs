//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Namespaces and ConfigMap names must be valid object names
//! - Validate value ranges (poll interval > 0, known log level)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EgressConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::EgressConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a DNS-1123 label, got {value:?}")]
    InvalidNamespace { field: &'static str, value: String },

    #[error("trust.ca_config_map must be a DNS-1123 subdomain, got {0:?}")]
    InvalidConfigMapName(String),

    #[error("cluster.poll_interval_secs must be greater than zero")]
    ZeroPollInterval,

    #[error("observability.log_level must be one of trace, debug, info, warn, error, got {0:?}")]
    UnknownLogLevel(String),
}

/// Check every semantic rule, collecting all failures.
pub fn validate_config(config: &EgressConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("namespaces.managed", &config.namespaces.managed),
        ("namespaces.config", &config.namespaces.config),
    ] {
        if !is_dns_label(value) {
            errors.push(ValidationError::InvalidNamespace {
                field,
                value: value.clone(),
            });
        }
    }

    if let Some(name) = &config.trust.ca_config_map {
        if !is_dns_subdomain(name) {
            errors.push(ValidationError::InvalidConfigMapName(name.clone()));
        }
    }

    if config.cluster.poll_interval_secs == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 1123 label: lowercase alphanumerics and '-', alphanumeric at both ends, max 63.
fn is_dns_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    !bytes.is_empty()
        && bytes.len() <= 63
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

/// RFC 1123 subdomain: dot-separated labels, max 253.
fn is_dns_subdomain(value: &str) -> bool {
    value.len() <= 253 && value.split('.').all(is_dns_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&EgressConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = EgressConfig::default();
        config.namespaces.managed = "Bad_Namespace".into();
        config.namespaces.config = String::new();
        config.trust.ca_config_map = Some("-ca".into());
        config.cluster.poll_interval_secs = 0;
        config.observability.log_level = "verbose".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroPollInterval));
        assert!(errors.contains(&ValidationError::InvalidConfigMapName("-ca".into())));
    }

    #[test]
    fn test_dns_names() {
        assert!(is_dns_label("openshift-config"));
        assert!(!is_dns_label("openshift-config-"));
        assert!(!is_dns_label(&"a".repeat(64)));
        assert!(is_dns_subdomain("custom.ca-bundle"));
        assert!(!is_dns_subdomain("custom..ca"));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = EgressConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
