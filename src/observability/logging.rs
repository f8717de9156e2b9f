//! Structured request/response logging with secret redaction.

use serde_json::Value;

use crate::config::LogLevel;

const REDACTED: &str = "***REDACTED***";

/// Secret field names, compared after lowercasing and dropping `_` and `-`.
const SENSITIVE_KEYS: &[&str] = &[
    "key",
    "apikey",
    "xgoogapikey",
    "token",
    "accesstoken",
    "refreshtoken",
    "secret",
    "password",
    "credential",
    "authorization",
    "auth",
];

/// Logger trait for structured logging.
pub trait Logger: Send + Sync {
    /// Log a debug message with structured context.
    fn debug(&self, message: &str, fields: Value);

    /// Log an info message with structured context.
    fn info(&self, message: &str, fields: Value);

    /// Log a warning with structured context.
    fn warn(&self, message: &str, fields: Value);

    /// Log an error message with structured context.
    fn error(&self, message: &str, fields: Value);
}

/// [`Logger`] that emits `tracing` events tagged with a component name.
///
/// Fields are redacted before they reach the subscriber.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    component: String,
    level: LogLevel,
}

impl StructuredLogger {
    /// Creates a logger for the named component, e.g. `gemini.files`.
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            level: LogLevel::Info,
        }
    }

    /// Sets the minimum level this logger emits.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn enabled(&self, level: LogLevel) -> bool {
        rank(level) <= rank(self.level)
    }
}

fn rank(level: LogLevel) -> u8 {
    match level {
        LogLevel::Error => 0,
        LogLevel::Warn => 1,
        LogLevel::Info => 2,
        LogLevel::Debug => 3,
        LogLevel::Trace => 4,
    }
}

fn is_sensitive(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    SENSITIVE_KEYS.contains(&normalized.as_str())
}

/// Replaces the values of secret-looking keys, recursing into objects and
/// arrays.
pub fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    if is_sensitive(&key) {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, redact(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
        other => other,
    }
}

impl Logger for StructuredLogger {
    fn debug(&self, message: &str, fields: Value) {
        if self.enabled(LogLevel::Debug) {
            let fields = redact(fields);
            tracing::debug!(component = %self.component, fields = %fields, "{message}");
        }
    }

    fn info(&self, message: &str, fields: Value) {
        if self.enabled(LogLevel::Info) {
            let fields = redact(fields);
            tracing::info!(component = %self.component, fields = %fields, "{message}");
        }
    }

    fn warn(&self, message: &str, fields: Value) {
        if self.enabled(LogLevel::Warn) {
            let fields = redact(fields);
            tracing::warn!(component = %self.component, fields = %fields, "{message}");
        }
    }

    fn error(&self, message: &str, fields: Value) {
        if self.enabled(LogLevel::Error) {
            let fields = redact(fields);
            tracing::error!(component = %self.component, fields = %fields, "{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_filtering() {
        let logger = StructuredLogger::new("gemini.test").with_level(LogLevel::Warn);
        assert!(logger.enabled(LogLevel::Error));
        assert!(logger.enabled(LogLevel::Warn));
        assert!(!logger.enabled(LogLevel::Info));
    }

    #[test]
    fn test_redacts_nested_secrets() {
        let redacted = redact(json!({
            "model": "gemini-2.5-flash",
            "headers": {"x-goog-api-key": "AIza-secret", "content-type": "application/json"},
            "attempts": [{"accessToken": "t"}],
            "usage": {"totalTokenCount": 12}
        }));

        assert_eq!(redacted["model"], "gemini-2.5-flash");
        assert_eq!(redacted["headers"]["x-goog-api-key"], REDACTED);
        assert_eq!(redacted["headers"]["content-type"], "application/json");
        assert_eq!(redacted["attempts"][0]["accessToken"], REDACTED);
        assert_eq!(redacted["usage"]["totalTokenCount"], 12);
    }
}
