use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required(String),
    TooLong { field: String, max: usize, actual: usize },
    InvalidRange { field: String, min: String, max: String },
    InvalidValue { field: String, message: String },
    InvalidEmail { field: String, value: String },
    InvalidUrl { field: String, value: String },
    InvalidPhone { field: String, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            Self::Required(field) => field,
            Self::TooLong { field, .. }
            | Self::InvalidRange { field, .. }
            | Self::InvalidValue { field, .. }
            | Self::InvalidEmail { field, .. }
            | Self::InvalidUrl { field, .. }
            | Self::InvalidPhone { field, .. } => field,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "Field '{}' is required", field),
            Self::TooLong { field, max, actual } => {
                write!(f, "Field '{}' is too long: {} > {} chars", field, actual, max)
            }
            Self::InvalidRange { field, min, max } => {
                write!(f, "Field '{}' must be between {} and {}", field, min, max)
            }
            Self::InvalidValue { field, message } => {
                write!(f, "Field '{}' has invalid value: {}", field, message)
            }
            Self::InvalidEmail { value, .. } => write!(f, "Invalid email address: {}", value),
            Self::InvalidUrl { value, .. } => write!(f, "Invalid URL: {}", value),
            Self::InvalidPhone { value, .. } => write!(f, "Invalid phone number: {}", value),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("Invalid email regex")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+(:\d+)?(/[-a-zA-Z0-9()@:%_\+.~#?&/=]*)?$"
    ).expect("Invalid URL regex")
});

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{6,14}$").expect("Invalid phone regex"));

pub fn validate_string_required(value: &str, field_name: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field_name.to_string()))
    } else {
        Ok(())
    }
}

pub fn validate_max_length(value: &str, field_name: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field: field_name.to_string(),
            max,
            actual: len,
        });
    }
    Ok(())
}

pub fn validate_email(email: &str, field_name: &str) -> Result<(), ValidationError> {
    if email.len() <= 254 && EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail {
            field: field_name.to_string(),
            value: email.to_string(),
        })
    }
}

pub fn validate_url(url: &str, field_name: &str) -> Result<(), ValidationError> {
    if url.len() <= 2048 && URL_REGEX.is_match(url) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUrl {
            field: field_name.to_string(),
            value: url.to_string(),
        })
    }
}

pub fn validate_phone(phone: &str, field_name: &str) -> Result<(), ValidationError> {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if PHONE_REGEX.is_match(&digits) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone {
            field: field_name.to_string(),
            value: phone.to_string(),
        })
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    field_name: &str,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::InvalidRange {
            field: field_name.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_negative(value: f64, field_name: &str) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field_name.to_string(),
            message: "must be a number greater than or equal to 0".to_string(),
        })
    }
}

/// Parses an enum-like path or body value, reporting the field on failure.
pub fn parse_enum<T>(value: &str, field_name: &str) -> Result<T, ValidationError>
where
    T: FromStr<Err = String>,
{
    value.parse::<T>().map_err(|message| ValidationError::InvalidValue {
        field: field_name.to_string(),
        message,
    })
}

pub fn parse_uuid(value: &str, field_name: &str) -> Result<uuid::Uuid, ValidationError> {
    uuid::Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidValue {
        field: field_name.to_string(),
        message: format!("'{}' is not a valid UUID", value),
    })
}

/// Collects every failing rule instead of stopping at the first one.
pub struct Validator {
    result: ValidationResult,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    fn check(mut self, outcome: Result<(), ValidationError>) -> Self {
        if let Err(e) = outcome {
            self.result.add_error(e);
        }
        self
    }

    pub fn string_required(self, value: &str, field_name: &str) -> Self {
        self.check(validate_string_required(value, field_name))
    }

    pub fn max_length(self, value: &str, field_name: &str, max: usize) -> Self {
        self.check(validate_max_length(value, field_name, max))
    }

    pub fn optional_email(self, value: Option<&str>, field_name: &str) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.check(validate_email(v, field_name)),
            _ => self,
        }
    }

    pub fn optional_url(self, value: Option<&str>, field_name: &str) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.check(validate_url(v, field_name)),
            _ => self,
        }
    }

    pub fn optional_phone(self, value: Option<&str>, field_name: &str) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.check(validate_phone(v, field_name)),
            _ => self,
        }
    }

    pub fn non_negative(self, value: Option<f64>, field_name: &str) -> Self {
        match value {
            Some(v) => self.check(validate_non_negative(v, field_name)),
            None => self,
        }
    }

    pub fn range_i32(self, value: Option<i32>, field_name: &str, min: i32, max: i32) -> Self {
        match value {
            Some(v) => self.check(validate_range(v, field_name, min, max)),
            None => self,
        }
    }

    pub fn custom<F>(mut self, validation_fn: F) -> Self
    where
        F: FnOnce() -> Option<ValidationError>,
    {
        if let Some(error) = validation_fn() {
            self.result.add_error(error);
        }
        self
    }

    pub fn validate(self) -> Result<(), ValidationResult> {
        if self.result.is_valid() {
            Ok(())
        } else {
            Err(self.result)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
