//! Specifications: the ordered property validators registered for one type.
//!
//! # Example
//!
//! ```rust
//! use specwork::{Specification, ValidationNotification};
//!
//! struct Contact {
//!     first_name: String,
//!     last_name: String,
//! }
//!
//! let mut spec = Specification::<Contact>::new();
//! spec.check("first_name", |c| &c.first_name).required();
//! spec.check("last_name", |c| &c.last_name).required().max_length(20);
//!
//! let mut notification = ValidationNotification::new();
//! let contact = Contact { first_name: "Johnny B".into(), last_name: String::new() };
//! assert!(!spec.validate(&contact, &mut notification));
//! assert_eq!(notification.errors()[0].message, "Last Name is required.");
//! ```

mod property;

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;

use regex::Regex;

use crate::path::PropertyPath;
use crate::result::{ValidationLevel, ValidationNotification};
use crate::rule::Rule;
use crate::validation::ValidationContext;
use crate::value::PropertyValue;

pub use property::{PropertyDescriptor, PropertyValidator};

/// A specification with its subject type erased.
///
/// This is what the registry stores and what nested validation dispatches
/// through once it has resolved a value's runtime type.
pub trait SpecificationLike: Send + Sync {
    /// Type name of the subject, for diagnostics.
    fn subject_type(&self) -> &'static str;

    /// The property validators, in declaration order.
    fn property_validators(&self) -> Vec<&dyn PropertyDescriptor>;

    /// Validates `instance` if it is of the subject type; any other type is
    /// left untouched and counts as valid.
    fn validate_with_context(
        &self,
        instance: &dyn Any,
        path: &PropertyPath,
        context: &mut ValidationContext<'_>,
        notification: &mut ValidationNotification,
    ) -> bool;
}

/// The ordered property validators for subject type `T`.
pub struct Specification<T> {
    validators: Vec<PropertyValidator<T>>,
}

impl<T: 'static> Specification<T> {
    /// Creates an empty specification.
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Starts a new property validator for the property read by `accessor`.
    ///
    /// Every call appends exactly one validator; the returned builder
    /// configures it.
    pub fn check<V, F>(&mut self, name: impl Into<String>, accessor: F) -> PropertyRules<'_, T, V>
    where
        V: PropertyValue,
        F: Fn(&T) -> &V + Send + Sync + 'static,
    {
        self.push(PropertyValidator::new(name, accessor))
    }

    /// Like [`check`](Self::check) for properties reached through values that
    /// may be absent, e.g. `|c| c.address.as_ref().map(|a| &a.street)`.
    pub fn check_path<V, F>(
        &mut self,
        name: impl Into<String>,
        accessor: F,
    ) -> PropertyRules<'_, T, V>
    where
        V: PropertyValue,
        F: Fn(&T) -> Option<&V> + Send + Sync + 'static,
    {
        self.push(PropertyValidator::navigated(name, accessor))
    }

    /// Appends a fully built validator.
    pub fn add_validator(&mut self, validator: PropertyValidator<T>) {
        self.validators.push(validator);
    }

    fn push<V>(&mut self, validator: PropertyValidator<T>) -> PropertyRules<'_, T, V> {
        let index = self.validators.len();
        self.validators.push(validator);
        PropertyRules {
            validator: &mut self.validators[index],
            _value: PhantomData,
        }
    }

    /// The property validators, in declaration order.
    pub fn validators(&self) -> &[PropertyValidator<T>] {
        &self.validators
    }

    /// Runs every property validator without descending into related
    /// objects. Returns false if an `Error` result was added.
    pub fn validate(&self, instance: &T, notification: &mut ValidationNotification) -> bool {
        let mut context = ValidationContext::detached();
        self.validate_typed(instance, &PropertyPath::root(), &mut context, notification)
    }

    pub(crate) fn validate_typed(
        &self,
        instance: &T,
        path: &PropertyPath,
        context: &mut ValidationContext<'_>,
        notification: &mut ValidationNotification,
    ) -> bool {
        // No short-circuit: every property is checked.
        self.validators.iter().fold(true, |valid, validator| {
            validator.validate_with_context(instance, path, context, notification) && valid
        })
    }
}

impl<T: 'static> Default for Specification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SpecificationLike for Specification<T> {
    fn subject_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn property_validators(&self) -> Vec<&dyn PropertyDescriptor> {
        self.validators
            .iter()
            .map(|validator| validator as &dyn PropertyDescriptor)
            .collect()
    }

    fn validate_with_context(
        &self,
        instance: &dyn Any,
        path: &PropertyPath,
        context: &mut ValidationContext<'_>,
        notification: &mut ValidationNotification,
    ) -> bool {
        match instance.downcast_ref::<T>() {
            Some(instance) => self.validate_typed(instance, path, context, notification),
            None => true,
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("subject", &type_name::<T>())
            .field("validators", &self.validators)
            .finish()
    }
}

/// Fluent configuration of the property validator most recently added by
/// [`Specification::check`].
///
/// `V` is the property's value type; it types the [`must`](Self::must)
/// predicate.
pub struct PropertyRules<'s, T, V> {
    validator: &'s mut PropertyValidator<T>,
    _value: PhantomData<fn(&V)>,
}

impl<'s, T: 'static, V: PropertyValue> PropertyRules<'s, T, V> {
    /// The value must be supplied.
    pub fn required(self) -> Self {
        self.and_rule(Rule::required())
    }

    /// Skip every rule when the value is empty or its type's default.
    pub fn optional(self) -> Self {
        self.validator.set_optional();
        self
    }

    /// Only validate the property when `condition` holds for the instance.
    ///
    /// The condition runs before the property is read. Panics inside it are
    /// not caught, so guard against partially populated instances
    /// (`c.addresses.first().is_some_and(..)` rather than `c.addresses[0]`).
    pub fn when<F>(self, condition: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator.set_condition(Box::new(condition));
        self
    }

    /// Uses `label` instead of the humanized property name in messages.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.validator.set_label(label.into());
        self
    }

    /// Report violations against `property` instead of the checked one.
    pub fn report_as(self, property: impl Into<String>) -> Self {
        self.validator.set_reported_name(property.into());
        self
    }

    /// Reports violations at `level` instead of `Error`.
    pub fn with_level(self, level: ValidationLevel) -> Self {
        self.validator.set_level(level);
        self
    }

    /// Adds a minimum length rule.
    pub fn min_length(self, length: usize) -> Self {
        self.and_rule(Rule::min_length(length))
    }

    /// Adds a maximum length rule.
    pub fn max_length(self, length: usize) -> Self {
        self.and_rule(Rule::max_length(length))
    }

    /// Adds an inclusive length range rule.
    pub fn length_between(self, min: usize, max: usize) -> Self {
        self.and_rule(Rule::length_between(min, max))
    }

    /// Adds a pattern rule.
    pub fn matches(self, regex: Regex) -> Self {
        self.and_rule(Rule::matches(regex))
    }

    /// Adds a minimum value rule.
    pub fn min_value(self, min: impl Into<f64>) -> Self {
        self.and_rule(Rule::min_value(min))
    }

    /// Adds a maximum value rule.
    pub fn max_value(self, max: impl Into<f64>) -> Self {
        self.and_rule(Rule::max_value(max))
    }

    /// Adds a named custom rule over the property's value.
    pub fn must<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.and_rule(Rule::custom(name, predicate))
    }

    /// Adds an already built rule.
    pub fn and_rule(self, rule: Rule) -> Self {
        self.validator.push_rule(rule);
        self
    }

    /// Sets the message template of the most recently added rule.
    ///
    /// Does nothing when no rule has been added yet.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        if let Some(rule) = self.validator.last_rule_mut() {
            rule.set_message(message);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::DEFAULT_MAX_DEPTH;

    struct Address {
        street: String,
    }

    struct Customer {
        name: String,
        age: u32,
        address: Option<Address>,
    }

    fn customer(name: &str) -> Customer {
        Customer {
            name: name.to_string(),
            age: 30,
            address: None,
        }
    }

    #[test]
    fn test_each_check_appends_one_validator() {
        let mut spec = Specification::<Customer>::new();
        spec.check("name", |c| &c.name).required().max_length(50);
        spec.check("age", |c| &c.age).min_value(18);

        assert_eq!(spec.validators().len(), 2);
        assert_eq!(spec.validators()[0].rules().len(), 2);
        assert_eq!(spec.property_validators()[1].property_name(), "age");
    }

    #[test]
    fn test_every_property_checked_after_failure() {
        let mut spec = Specification::<Customer>::new();
        spec.check("name", |c| &c.name).required();
        spec.check("age", |c| &c.age).min_value(40);

        let mut notification = ValidationNotification::new();
        assert!(!spec.validate(&customer(""), &mut notification));
        assert_eq!(notification.len(), 2);
    }

    #[test]
    fn test_check_path_optional_absent_intermediate() {
        let mut spec = Specification::<Customer>::new();
        spec.check_path("address.street", |c| c.address.as_ref().map(|a| &a.street))
            .optional()
            .max_length(255);

        let mut notification = ValidationNotification::new();
        assert!(spec.validate(&customer("x"), &mut notification));
        assert!(notification.is_empty());
    }

    #[test]
    fn test_check_path_reads_present_value() {
        let mut spec = Specification::<Customer>::new();
        spec.check_path("address.street", |c| c.address.as_ref().map(|a| &a.street))
            .optional()
            .max_length(3);

        let mut instance = customer("x");
        instance.address = Some(Address {
            street: "Long Street".to_string(),
        });

        let mut notification = ValidationNotification::new();
        assert!(!spec.validate(&instance, &mut notification));
        assert_eq!(notification.errors()[0].path.to_string(), "address.street");
        assert_eq!(
            notification.errors()[0].message,
            "Address Street must have a length of at most 3."
        );
    }

    #[test]
    fn test_must_is_typed_by_property() {
        let mut spec = Specification::<Customer>::new();
        spec.check("age", |c| &c.age).must("even", |age| age % 2 == 0);

        let mut notification = ValidationNotification::new();
        assert!(spec.validate(&customer("x"), &mut notification));

        let mut odd = customer("x");
        odd.age = 31;
        assert!(!spec.validate(&odd, &mut notification));
        assert_eq!(notification.errors()[0].code, "custom");
    }

    #[test]
    fn test_with_message_targets_last_rule() {
        let mut spec = Specification::<Customer>::new();
        spec.check("name", |c| &c.name)
            .required()
            .with_message("{label} cannot be blank")
            .max_length(2);

        let rules = spec.validators()[0].rules();
        assert_eq!(rules[0].error_message_template(), "{label} cannot be blank");
        assert_eq!(
            rules[1].error_message_template(),
            "{label} must have a length of at most {length}."
        );
    }

    #[test]
    fn test_erased_validation_ignores_other_types() {
        let mut spec = Specification::<Customer>::new();
        spec.check("name", |c| &c.name).required();

        let mut context = ValidationContext::detached();
        let mut notification = ValidationNotification::new();
        let valid = spec.validate_with_context(
            &"not a customer".to_string(),
            &PropertyPath::root(),
            &mut context,
            &mut notification,
        );

        assert!(valid);
        assert!(notification.is_empty());
        assert_eq!(context.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_subject_type_name() {
        let spec = Specification::<Customer>::new();
        assert!(spec.subject_type().ends_with("Customer"));
    }
}
