//! Validator traits and builders.

use super::error::{FieldError, ValidationErrors, ValidationResult};
use super::rules::ValidationRule;

/// Trait for synchronous validation of request payloads.
pub trait Validate {
    /// Validate this object and return any validation errors.
    fn validate(&self) -> ValidationResult<()>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        for (index, item) in self.iter().enumerate() {
            if let Err(item_errors) = item.validate() {
                errors.merge_array_item("", index, item_errors);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Field Validator
// ═══════════════════════════════════════════════════════════════════════════════

/// A builder for validating a single field with multiple rules.
pub struct FieldValidator<'a, T: ?Sized> {
    field_name: &'a str,
    value: &'a T,
    errors: Vec<FieldError>,
}

impl<'a, T: ?Sized> FieldValidator<'a, T> {
    pub fn new(field_name: &'a str, value: &'a T) -> Self {
        Self {
            field_name,
            value,
            errors: Vec::new(),
        }
    }

    /// Apply a validation rule. Later rules are skipped once one fails.
    pub fn rule<R: ValidationRule<T>>(mut self, rule: R) -> Self {
        if !self.errors.is_empty() {
            return self;
        }
        if let Some(error) = rule.validate(self.value) {
            self.errors.push(error);
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add the field's errors to a ValidationErrors collection.
    pub fn collect_into(self, errors: &mut ValidationErrors) {
        for error in self.errors {
            errors.add(self.field_name, error);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Request Validator
// ═══════════════════════════════════════════════════════════════════════════════

/// Collects field results for a whole request.
#[derive(Default)]
pub struct RequestValidator {
    errors: ValidationErrors,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T: ?Sized>(mut self, validator: FieldValidator<'_, T>) -> Self {
        validator.collect_into(&mut self.errors);
        self
    }

    pub fn result(self) -> ValidationResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Start validating a single field.
pub fn validate_field<'a, T: ?Sized>(field_name: &'a str, value: &'a T) -> FieldValidator<'a, T> {
    FieldValidator::new(field_name, value)
}

/// Start validating a request.
pub fn validate_request() -> RequestValidator {
    RequestValidator::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::{LengthRange, Range};

    struct Sample {
        text: String,
        temperature: Option<f64>,
    }

    impl Validate for Sample {
        fn validate(&self) -> ValidationResult<()> {
            validate_request()
                .field(validate_field("text", &self.text).rule(LengthRange::new(1, 5)))
                .field(validate_field("temperature", &self.temperature).rule(Range::new(0.0, 2.0)))
                .result()
        }
    }

    #[test]
    fn test_request_validator_collects_fields() {
        let sample = Sample {
            text: "toolong".into(),
            temperature: Some(3.0),
        };
        let errors = sample.validate().unwrap_err();
        assert!(errors.has_errors("text"));
        assert!(errors.has_errors("temperature"));
    }

    #[test]
    fn test_items_are_prefixed() {
        let items = vec![
            Sample { text: "ok".into(), temperature: None },
            Sample { text: String::new(), temperature: None },
        ];
        let errors = items.validate().unwrap_err();
        assert!(errors.has_errors("[1].text"));
        assert!(!errors.has_errors("[0].text"));
    }
}
