//! Integration tests for logging system

use bridge_traits::log::LogLevel;
use core_runtime::logging::{redact_if_sensitive, LogFormat, LoggingConfig};

#[test]
fn test_logging_configuration() {
    // Logging can only be initialized once per process, so we test the config builder
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_pii_redaction(true)
        .with_spans(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert!(config.redact_pii);
    assert!(config.enable_spans);
    assert!(config.logger_sink.is_none());
}

#[test]
fn test_pii_redaction_credentials() {
    assert_eq!(
        redact_if_sensitive("access_token", "eyJhbGciOiJIUzI1NiJ9"),
        "[REDACTED]"
    );
    assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");
    assert_eq!(
        redact_if_sensitive("authorization", "Bearer eyJ"),
        "[REDACTED]"
    );
}

#[test]
fn test_pii_redaction_emails() {
    let redacted = redact_if_sensitive("email", "user@example.com");

    assert!(redacted.starts_with('u'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_pii_redaction_normal_values() {
    assert_eq!(redact_if_sensitive("session_id", "4f1c"), "4f1c");
    assert_eq!(redact_if_sensitive("status", "500"), "500");
    assert_eq!(redact_if_sensitive("title", "새 댓글"), "새 댓글");
}

#[test]
fn test_filter_configuration() {
    let config = LoggingConfig::default().with_filter("core_auth=debug,bridge_desktop=trace");

    assert_eq!(
        config.filter,
        Some("core_auth=debug,bridge_desktop=trace".to_string())
    );
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_pii_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
