//! Field-tagged validation errors and the write-time lease checks.

pub mod lease;

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use validator::{ValidationError, ValidationErrors};

pub use lease::{check_lease_rules, selectable_properties, validate_lease, LeaseCandidate};

/// First amount not representable with 10 digits, 2 of them decimals.
const MONEY_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Field name to messages. Ordered by field for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Runs the derive-based checks of `value`.
    pub fn from_validation<T: validator::Validate>(value: &T) -> Self {
        match value.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => errors.into(),
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.0.clone()
    }

    /// `Ok(())` when no error was collected.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                out.add(field, message);
            }
        }
        out
    }
}

/// Trims a required text field.
pub fn clean_text(value: String) -> String {
    value.trim().to_string()
}

/// Trims an optional text field; blank becomes `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Money amounts: non-negative, two decimal places, ten digits.
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    let message = if value.is_sign_negative() && !value.is_zero() {
        "Amount must not be negative."
    } else if value.normalize().scale() > 2 {
        "Amount must have at most 2 decimal places."
    } else if *value >= MONEY_LIMIT {
        "Amount must have at most 10 digits."
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new("money");
    err.message = Some(message.into());
    Err(err)
}
