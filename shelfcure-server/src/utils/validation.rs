//! Input validation helpers
//!
//! Payload structs derive [`validator::Validate`]; handlers run them through
//! [`validate_payload`] so every field error lands in `details` of a single
//! 400 response.

use serde_json::Value;
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::utils::{AppError, AppResult, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Free-text search terms
pub const MAX_SEARCH_LEN: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate a payload, collecting every field error into one AppError.
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(into_app_error)
}

/// Convert validator errors into a 400 with per-field messages.
pub fn into_app_error(errors: ValidationErrors) -> AppError {
    let mut fields: HashMap<String, Value> = HashMap::new();
    flatten("", &errors, &mut fields);

    let summary = {
        let mut keys: Vec<&String> = fields.keys().collect();
        keys.sort();
        keys.iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut err = AppError::validation(format!("Validation failed: {summary}"));
    for (field, messages) in fields {
        err = err.with_detail(field, messages);
    }
    err
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut HashMap<String, Value>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages: Vec<Value> = errs
                    .iter()
                    .map(|e| Value::String(describe(&path, e)))
                    .collect();
                out.insert(path, Value::Array(messages));
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let param = |name: &str| error.params.get(name).map(|v| v.to_string());
    match error.code.as_ref() {
        "email" => format!("{field} must be a valid email address"),
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("{field} must be {min} to {max} characters"),
            (Some(min), None) => format!("{field} must be at least {min} characters"),
            (None, Some(max)) => format!("{field} must be at most {max} characters"),
            _ => format!("{field} has an invalid length"),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("{field} must be between {min} and {max}"),
            (Some(min), None) => format!("{field} must be at least {min}"),
            (None, Some(max)) => format!("{field} must be at most {max}"),
            _ => format!("{field} is out of range"),
        },
        code => format!("{field} is invalid ({code})"),
    }
}

/// Validate a new password
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        )
        .with_detail("field", "password"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Inner {
        #[validate(length(min = 1, max = 5))]
        code: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Outer {
        #[validate(email)]
        email: String,
        #[validate(range(min = 0.0))]
        salary: f64,
        #[validate(nested)]
        inner: Inner,
    }

    #[test]
    fn test_collects_field_details() {
        let payload = Outer {
            email: "not-an-email".into(),
            salary: -1.0,
            inner: Inner {
                code: "toolong".into(),
            },
        };
        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert!(details.contains_key("email"));
        assert!(details.contains_key("salary"));
        assert!(details.contains_key("inner.code"));
        assert_eq!(
            details["email"][0],
            "email must be a valid email address"
        );
    }

    #[test]
    fn test_valid_payload_passes() {
        let payload = Outer {
            email: "a@b.com".into(),
            salary: 100.0,
            inner: Inner { code: "ok".into() },
        };
        assert!(validate_payload(&payload).is_ok());
    }

    #[test]
    fn test_password_rules() {
        let err = validate_password("short").unwrap_err();
        assert_eq!(err.code, ErrorCode::PasswordTooShort);
        assert!(validate_password("long-enough").is_ok());
        assert!(validate_password(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "notes", 3).is_ok());
        assert!(validate_optional_text(&Some("abcd".into()), "notes", 3).is_err());
    }
}
