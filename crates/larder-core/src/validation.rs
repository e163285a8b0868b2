//! Validation utilities.

use crate::{FieldError, LarderError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `LarderError` on failure.
    fn validate_request(&self) -> Result<(), LarderError> {
        self.validate().map_err(validation_errors_to_larder_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator` errors into field errors, sorted by field name.
#[must_use]
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

/// Converts `validator::ValidationErrors` to `LarderError`.
#[must_use]
pub fn validation_errors_to_larder_error(errors: ValidationErrors) -> LarderError {
    let message = collect_field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    LarderError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates an EAN/UPC style barcode: 8 to 14 ASCII digits.
    pub fn valid_barcode(value: &str) -> Result<(), ValidationError> {
        if !(8..=14).contains(&value.len()) || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::new("invalid_barcode"));
        }
        Ok(())
    }

    /// Validates that a quantity is strictly positive and finite.
    pub fn positive(value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::new("must_be_positive"));
        }
        Ok(())
    }

    /// Validates that a nutrient amount is non-negative and finite.
    pub fn non_negative(value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::new("must_not_be_negative"));
        }
        Ok(())
    }
}
