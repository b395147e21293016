//! Settings validation.

use crate::config::schema::Settings;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Settings key the rule applies to.
    pub key: &'static str,
    pub message: String,
}

/// Collect every violation instead of stopping at the first one.
pub fn validate_settings(settings: &Settings) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if settings.workers == 0 {
        errors.push(ValidationError {
            key: "workers",
            message: "workers must be at least 1".to_string(),
        });
    }

    if settings.timeout_secs == 0 {
        errors.push(ValidationError {
            key: "timeout_secs",
            message: "timeout_secs must be at least 1".to_string(),
        });
    }

    if let Some(url) = &settings.api_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ValidationError {
                key: "api_url",
                message: format!("api_url '{}' is not an http(s) URL", url),
            });
        }
    }

    errors
}

/// Validate settings, joining every violation into one message.
pub fn validate(settings: &Settings) -> Result<(), String> {
    let errors = validate_settings(settings);
    if errors.is_empty() {
        return Ok(());
    }
    Err(errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; "))
}
