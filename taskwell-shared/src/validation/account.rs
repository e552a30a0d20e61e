/// Validation for account fields: email, password and free text

use serde_json::Value;
use std::borrow::Cow;
use validator::{ValidateEmail, ValidationError};

use super::{finish, trimmed, Validated};

pub const EMAIL_MAX_LENGTH: usize = 255;
pub const INVALID_EMAIL: &str = "Please provide a valid email address";
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Constraints for [`validate_text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRules {
    /// Used as the subject of error messages
    pub field_name: &'static str,
    pub required: bool,
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for TextRules {
    fn default() -> Self {
        Self {
            field_name: "Text",
            required: false,
            min_length: 0,
            max_length: 1000,
        }
    }
}

impl TextRules {
    /// Rules for a user's display name
    pub fn display_name(required: bool) -> Self {
        Self {
            field_name: "Name",
            required,
            min_length: 0,
            max_length: 255,
        }
    }
}

/// Validates an optional or required text field
///
/// Returns the trimmed text, or `None` when the field is absent, null or
/// blank (and not required).
pub fn validate_text(input: Option<&Value>, rules: TextRules) -> Validated<Option<String>> {
    let name = rules.field_name;

    let raw = match input {
        None | Some(Value::Null) if rules.required => {
            return Err(vec![format!("{name} is required")]);
        }
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(raw)) => raw,
        Some(_) => return Err(vec![format!("{name} must be a string")]),
    };

    let (text, len) = trimmed(raw);
    let mut errors = Vec::new();

    if rules.required && len == 0 {
        errors.push(format!("{name} cannot be empty"));
    }
    if len < rules.min_length {
        errors.push(format!(
            "{name} must be at least {} characters",
            rules.min_length
        ));
    }
    if len > rules.max_length {
        errors.push(format!(
            "{name} must be {} characters or less",
            rules.max_length
        ));
    }

    finish(errors, || (len > 0).then(|| text.to_string()))
}

/// Address check shared by every endpoint that accepts an email
///
/// `validator`'s RFC 5321 check, plus a dot inside the domain with text on
/// both sides, so `ada@localhost` is refused.
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }

    email.rsplit_once('@').is_some_and(|(_, domain)| {
        domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
    })
}

/// [`is_valid_email`] as a `#[validate(custom(function = ...))]` rule
pub fn email_rule(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message(Cow::Borrowed(INVALID_EMAIL)))
    }
}

/// Validates an email address
///
/// Returns the address trimmed and lowercased, which is how it is stored
/// and looked up.
pub fn validate_email(raw: Option<&str>) -> Validated<String> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(vec!["Email is required and must be a string".to_string()]),
    };

    let email = raw.trim().to_lowercase();
    let mut errors = Vec::new();

    if !is_valid_email(&email) {
        errors.push(INVALID_EMAIL.to_string());
    }
    if email.chars().count() > EMAIL_MAX_LENGTH {
        errors.push("Email must be 255 characters or less".to_string());
    }

    finish(errors, || email)
}

/// Validates password strength
///
/// The password is returned untouched; it is hashed, never trimmed.
pub fn validate_password(raw: Option<&str>) -> Validated<String> {
    let password = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(vec!["Password is required and must be a string".to_string()]),
    };

    let len = password.chars().count();
    let mut errors = Vec::new();

    if len < PASSWORD_MIN_LENGTH {
        errors.push("Password must be at least 8 characters long".to_string());
    }
    if len > PASSWORD_MAX_LENGTH {
        errors.push("Password must be 128 characters or less".to_string());
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        errors.push("Password must contain at least one letter and one number".to_string());
    }

    finish(errors, || password.to_string())
}
