//! Non-empty error collection for `stillwater::Validation` interop.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use super::validation_result::ValidationResult;

/// A non-empty collection of top-level validation results.
///
/// Produced by [`ValidationNotification::into_validation`](crate::ValidationNotification::into_validation)
/// so failures can be combined with other `Validation`s.
///
/// ```rust
/// use specwork::{ValidationErrors, ValidationLevel, ValidationResult};
/// use stillwater::prelude::*;
///
/// let name = ValidationErrors::single(ValidationResult::new(
///     Some("name"), "Name is required.", ValidationLevel::Error, "Customer",
/// ));
/// let street = ValidationErrors::single(ValidationResult::new(
///     Some("street"), "Street is too long.", ValidationLevel::Error, "Address",
/// ));
///
/// assert_eq!(name.combine(street).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(NonEmptyVec<ValidationResult>);

impl ValidationErrors {
    /// Wraps a single result.
    pub fn single(result: ValidationResult) -> Self {
        Self(NonEmptyVec::singleton(result))
    }

    /// Returns `None` when `results` is empty.
    pub fn from_results(results: Vec<ValidationResult>) -> Option<Self> {
        NonEmptyVec::from_vec(results).map(Self)
    }

    /// Number of top-level results.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The first top-level result.
    pub fn first(&self) -> &ValidationResult {
        self.0.head()
    }

    /// Iterates over the top-level results.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationResult> {
        self.0.iter()
    }

    /// Every node of every result, pre-order.
    pub fn all(&self) -> impl Iterator<Item = &ValidationResult> {
        self.0.iter().flat_map(ValidationResult::all)
    }

    /// Results (at any depth) reported against `property`.
    pub fn for_property(&self, property: &str) -> Vec<&ValidationResult> {
        self.all()
            .filter(|result| result.property.as_deref() == Some(property))
            .collect()
    }

    /// Results (at any depth) carrying `code`.
    pub fn with_code(&self, code: &str) -> Vec<&ValidationResult> {
        self.all().filter(|result| result.code == code).collect()
    }

    /// Unwraps into a plain vector.
    pub fn into_vec(self) -> Vec<ValidationResult> {
        self.0.into_vec()
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, result) in self.iter().enumerate() {
            let location = if result.path.is_root() {
                "(root)".to_string()
            } else {
                result.path.to_string()
            };
            writeln!(f, "  {}. {}: {}", i + 1, location, result.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationResult;
    type IntoIter = std::vec::IntoIter<ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ValidationLevel;

    fn error(property: &str, code: &str) -> ValidationResult {
        ValidationResult::new(Some(property), format!("{} failed", property), ValidationLevel::Error, "Contact")
            .with_code(code)
    }

    #[test]
    fn test_from_empty_results_is_none() {
        assert!(ValidationErrors::from_results(Vec::new()).is_none());
    }

    #[test]
    fn test_single() {
        let errors = ValidationErrors::single(error("first_name", "required"));
        assert_eq!(errors.len(), 1);
        assert!(!errors.is_empty());
        assert_eq!(errors.first().property.as_deref(), Some("first_name"));
    }

    #[test]
    fn test_combine_preserves_order() {
        let combined = ValidationErrors::single(error("a", "required"))
            .combine(ValidationErrors::single(error("b", "max_length")))
            .combine(ValidationErrors::single(error("c", "required")));

        let properties: Vec<_> = combined
            .iter()
            .filter_map(|result| result.property.as_deref())
            .collect();
        assert_eq!(properties, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filters_search_nested_results() {
        let parent = error("contacts", "nested").with_nested(vec![
            error("last_name", "required"),
            error("first_name", "max_length"),
        ]);
        let errors = ValidationErrors::single(parent);

        assert_eq!(errors.with_code("required").len(), 1);
        assert_eq!(errors.for_property("first_name").len(), 1);
        assert_eq!(errors.all().count(), 3);
    }

    #[test]
    fn test_display_lists_paths() {
        let errors = ValidationErrors::single(error("name", "required"))
            .combine(ValidationErrors::single(ValidationResult::new(
                None,
                "type failed",
                ValidationLevel::Error,
                "Customer",
            )));
        let display = errors.to_string();

        assert!(display.contains("2 error(s)"));
        assert!(display.contains("1. name: name failed"));
        assert!(display.contains("2. (root): type failed"));
    }
}
