//! Root aggregator for one validation call.

use std::fmt::{self, Display};

use stillwater::Validation;

use super::errors::ValidationErrors;
use super::validation_result::{All, ValidationLevel, ValidationResult};
use crate::ValidationOutcome;

/// The results of one top-level `validate` call.
///
/// Holds one top-level [`ValidationResult`] per failed rule or per related
/// object that failed. A fresh notification is created for every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationNotification {
    results: Vec<ValidationResult>,
}

impl ValidationNotification {
    /// Creates an empty notification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level result.
    pub fn add(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    /// Appends every top-level result of `other`.
    pub fn merge(&mut self, other: ValidationNotification) {
        self.results.extend(other.results);
    }

    /// True iff no result anywhere in the tree has `Error` level.
    pub fn is_valid(&self) -> bool {
        !self.all().any(|result| result.level == ValidationLevel::Error)
    }

    /// Top-level results in validation order.
    ///
    /// Results of related objects sit in the `nested` field of their aggregate
    /// node; use [`all`](Self::all) for the flattened view.
    pub fn errors(&self) -> &[ValidationResult] {
        &self.results
    }

    /// Every node of every top-level result, pre-order.
    pub fn all(&self) -> All<'_> {
        All::over(&self.results)
    }

    /// Messages of [`all`](Self::all), in the same order.
    pub fn all_error_messages(&self) -> impl Iterator<Item = &str> {
        self.all().map(|result| result.message.as_str())
    }

    /// Results reported against `property` anywhere in the tree.
    pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a ValidationResult> {
        self.all()
            .filter(move |result| result.property.as_deref() == Some(property))
    }

    /// Number of top-level results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Unwraps into the top-level results.
    pub fn into_results(self) -> Vec<ValidationResult> {
        self.results
    }

    /// Converts into a `stillwater::Validation`.
    ///
    /// Succeeds when the notification is valid; warnings alone do not fail.
    pub fn into_validation(self) -> ValidationOutcome {
        if self.is_valid() {
            return Validation::Success(());
        }
        match ValidationErrors::from_results(self.results) {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(()),
        }
    }
}

impl Display for ValidationNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            result.write_tree(f, 0)?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationNotification {
    type Item = ValidationResult;
    type IntoIter = std::vec::IntoIter<ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(property: &str, message: &str) -> ValidationResult {
        ValidationResult::new(Some(property), message, ValidationLevel::Error, "Contact")
    }

    #[test]
    fn test_empty_notification_is_valid() {
        let notification = ValidationNotification::new();
        assert!(notification.is_valid());
        assert!(notification.is_empty());
        assert_eq!(notification.all().count(), 0);
    }

    #[test]
    fn test_error_makes_notification_invalid() {
        let mut notification = ValidationNotification::new();
        notification.add(error("first_name", "First Name is required."));
        assert!(!notification.is_valid());
        assert_eq!(notification.len(), 1);
    }

    #[test]
    fn test_warnings_keep_notification_valid() {
        let mut notification = ValidationNotification::new();
        notification.add(ValidationResult::new(
            Some("nickname"),
            "Nickname is short.",
            ValidationLevel::Warning,
            "Contact",
        ));
        assert!(notification.is_valid());
        assert!(!notification.is_empty());
        assert!(notification.into_validation().is_success());
    }

    #[test]
    fn test_all_flattens_nested_results() {
        let mut notification = ValidationNotification::new();
        notification.add(error("name", "Name is required."));
        notification.add(
            error("contacts", "Contacts is invalid.")
                .with_nested(vec![error("last_name", "Last Name is required.")]),
        );

        let messages: Vec<&str> = notification.all_error_messages().collect();
        assert_eq!(
            messages,
            vec!["Name is required.", "Contacts is invalid.", "Last Name is required."]
        );
        assert_eq!(notification.for_property("last_name").count(), 1);
        assert_eq!(notification.errors().len(), 2);
        assert_eq!(notification.all().count(), 3);
    }

    #[test]
    fn test_merge_appends_results() {
        let mut first = ValidationNotification::new();
        first.add(error("a", "a"));
        let mut second = ValidationNotification::new();
        second.add(error("b", "b"));

        first.merge(second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_display_indents_nested_results() {
        let mut notification = ValidationNotification::new();
        notification.add(
            error("contacts", "Contacts is invalid.")
                .with_nested(vec![error("last_name", "Last Name is required.")]),
        );

        assert_eq!(
            notification.to_string(),
            "Contacts is invalid.\n\tLast Name is required.\n"
        );
    }

    #[test]
    fn test_into_validation_failure_keeps_top_level_results() {
        let mut notification = ValidationNotification::new();
        notification.add(error("a", "a"));
        notification.add(error("b", "b"));

        let errors = notification.into_validation().into_result().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
