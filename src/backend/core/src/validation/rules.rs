//! Reusable validation rules.

use super::error::{FieldError, ValidationErrorKind};

/// A single check applied to a field value.
pub trait ValidationRule<T: ?Sized> {
    /// Validate the value and return any errors.
    fn validate(&self, value: &T) -> Option<FieldError>;

    /// Get a description of this rule.
    fn description(&self) -> String;
}

// ═══════════════════════════════════════════════════════════════════════════════
// String Length Rules
// ═══════════════════════════════════════════════════════════════════════════════

/// Inclusive length bounds, counted in chars.
#[derive(Debug, Clone, Copy)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

impl LengthRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl ValidationRule<String> for LengthRange {
    fn validate(&self, value: &String) -> Option<FieldError> {
        let len = value.chars().count();
        if len < self.min {
            if len == 0 {
                Some(FieldError::new(ValidationErrorKind::Required))
            } else {
                Some(FieldError::new(ValidationErrorKind::MinLength {
                    min: self.min,
                    actual: len,
                }))
            }
        } else if len > self.max {
            Some(FieldError::new(ValidationErrorKind::MaxLength {
                max: self.max,
                actual: len,
            }))
        } else {
            None
        }
    }

    fn description(&self) -> String {
        format!("length between {} and {}", self.min, self.max)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Numeric Range Rules
// ═══════════════════════════════════════════════════════════════════════════════

/// Rule that validates minimum numeric value.
#[derive(Debug, Clone, Copy)]
pub struct Min<T>(pub T);

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T> Range<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

macro_rules! impl_numeric_rules {
    ($($t:ty),+) => {
        $(
            impl ValidationRule<$t> for Min<$t> {
                fn validate(&self, value: &$t) -> Option<FieldError> {
                    // NaN fails every comparison and is rejected here too
                    if !(*value >= self.0) {
                        Some(FieldError::new(ValidationErrorKind::MinValue {
                            min: self.0.to_string(),
                            actual: value.to_string(),
                        }))
                    } else {
                        None
                    }
                }

                fn description(&self) -> String {
                    format!("minimum value: {}", self.0)
                }
            }

            impl ValidationRule<Option<$t>> for Min<$t> {
                fn validate(&self, value: &Option<$t>) -> Option<FieldError> {
                    value.as_ref().and_then(|v| <Self as ValidationRule<$t>>::validate(self, v))
                }

                fn description(&self) -> String {
                    format!("minimum value: {}", self.0)
                }
            }

            impl ValidationRule<$t> for Range<$t> {
                fn validate(&self, value: &$t) -> Option<FieldError> {
                    if !(*value >= self.min && *value <= self.max) {
                        Some(FieldError::new(ValidationErrorKind::Range {
                            min: self.min.to_string(),
                            max: self.max.to_string(),
                            actual: value.to_string(),
                        }))
                    } else {
                        None
                    }
                }

                fn description(&self) -> String {
                    format!("value between {} and {}", self.min, self.max)
                }
            }

            impl ValidationRule<Option<$t>> for Range<$t> {
                fn validate(&self, value: &Option<$t>) -> Option<FieldError> {
                    value.as_ref().and_then(|v| <Self as ValidationRule<$t>>::validate(self, v))
                }

                fn description(&self) -> String {
                    format!("value between {} and {}", self.min, self.max)
                }
            }
        )+
    };
}

impl_numeric_rules!(u32, usize, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_range_counts_chars() {
        let rule = LengthRange::new(1, 3);
        assert!(rule.validate(&"héé".to_string()).is_none());
        assert!(rule.validate(&"abcd".to_string()).is_some());
        assert_eq!(
            rule.validate(&String::new()).map(|e| e.kind),
            Some(ValidationErrorKind::Required)
        );
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let rule = Range::new(0.0_f64, 2.0);
        assert!(rule.validate(&0.0).is_none());
        assert!(rule.validate(&2.0).is_none());
        assert!(rule.validate(&2.01).is_some());
        assert!(rule.validate(&f64::NAN).is_some());
        assert!(<Range<f64> as ValidationRule<Option<f64>>>::validate(&rule, &None).is_none());
    }

    #[test]
    fn test_min_rejects_negative() {
        assert!(Min(0.0_f64).validate(&-0.5).is_some());
        assert!(Min(0.0_f64).validate(&0.0).is_none());
    }
}
