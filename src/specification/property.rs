//! Property validators: one property, its rule chain and its gating.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use tracing::trace;

use crate::path::PropertyPath;
use crate::result::{ValidationLevel, ValidationNotification, ValidationResult};
use crate::rule::Rule;
use crate::validation::ValidationContext;
use crate::value::{PropertyValue, ABSENT};

/// Reads a property value from an instance of `T`.
///
/// `None` means the path to the value could not be followed (an absent
/// intermediate object), which is treated like an empty value.
pub(crate) trait Accessor<T>: Send + Sync {
    fn get<'a>(&self, instance: &'a T) -> Option<&'a dyn PropertyValue>;
}

pub(crate) struct Direct<F, V>(pub(crate) F, pub(crate) PhantomData<fn() -> V>);

impl<T, V, F> Accessor<T> for Direct<F, V>
where
    V: PropertyValue,
    F: Fn(&T) -> &V + Send + Sync,
{
    fn get<'a>(&self, instance: &'a T) -> Option<&'a dyn PropertyValue> {
        Some((self.0)(instance))
    }
}

pub(crate) struct Navigated<F, V>(pub(crate) F, pub(crate) PhantomData<fn() -> V>);

impl<T, V, F> Accessor<T> for Navigated<F, V>
where
    V: PropertyValue,
    F: Fn(&T) -> Option<&V> + Send + Sync,
{
    fn get<'a>(&self, instance: &'a T) -> Option<&'a dyn PropertyValue> {
        (self.0)(instance).map(|value| value as &dyn PropertyValue)
    }
}

type Condition<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Read-only view of a property validator, independent of its subject type.
pub trait PropertyDescriptor: Send + Sync {
    /// The bound property identifier.
    fn property_name(&self) -> &str;

    /// The identifier results are reported against.
    fn reported_name(&self) -> &str;

    /// The explicit label, if one was set.
    fn label(&self) -> Option<&str>;

    /// The label used in messages: the explicit label or the humanized
    /// property name.
    fn effective_label(&self) -> String;

    fn is_optional(&self) -> bool;

    fn is_conditional(&self) -> bool;

    fn level(&self) -> ValidationLevel;

    fn rules(&self) -> &[Rule];
}

/// Binds a rule chain to one property of `T`.
///
/// Usually created through [`Specification::check`](crate::Specification::check),
/// but usable on its own:
///
/// ```rust
/// use specwork::{PropertyValidator, Rule, ValidationNotification};
///
/// struct Contact {
///     last_name: String,
/// }
///
/// let validator = PropertyValidator::new("last_name", |c: &Contact| &c.last_name)
///     .and_rule(Rule::length_between(1, 5));
///
/// let mut notification = ValidationNotification::new();
/// let valid = validator.validate(&Contact { last_name: String::new() }, &mut notification);
///
/// assert!(!valid);
/// assert_eq!(notification.errors()[0].message, "Last Name must have a length between 1 and 5.");
/// ```
pub struct PropertyValidator<T> {
    name: String,
    accessor: Box<dyn Accessor<T>>,
    rules: Vec<Rule>,
    optional: bool,
    condition: Option<Condition<T>>,
    label: Option<String>,
    reported_name: Option<String>,
    level: ValidationLevel,
}

impl<T: 'static> PropertyValidator<T> {
    /// Creates a validator for the property read by `accessor`.
    pub fn new<V, F>(name: impl Into<String>, accessor: F) -> Self
    where
        V: PropertyValue,
        F: Fn(&T) -> &V + Send + Sync + 'static,
    {
        Self::from_accessor(name.into(), Box::new(Direct(accessor, PhantomData)))
    }

    /// Creates a validator for a property reached through values that may be
    /// absent; `None` from `accessor` counts as an empty value.
    pub fn navigated<V, F>(name: impl Into<String>, accessor: F) -> Self
    where
        V: PropertyValue,
        F: Fn(&T) -> Option<&V> + Send + Sync + 'static,
    {
        Self::from_accessor(name.into(), Box::new(Navigated(accessor, PhantomData)))
    }

    fn from_accessor(name: String, accessor: Box<dyn Accessor<T>>) -> Self {
        Self {
            name,
            accessor,
            rules: Vec::new(),
            optional: false,
            condition: None,
            label: None,
            reported_name: None,
            level: ValidationLevel::Error,
        }
    }

    /// Appends a rule to the chain.
    pub fn and_rule(mut self, rule: Rule) -> Self {
        self.push_rule(rule);
        self
    }

    /// Skip every rule when the value is empty or its type's default.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Only validate when `condition` holds for the instance.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Uses `label` instead of the humanized property name in messages.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Reports violations against `property` instead of the bound property.
    pub fn report_as(mut self, property: impl Into<String>) -> Self {
        self.reported_name = Some(property.into());
        self
    }

    /// Reports violations at `level` instead of `Error`.
    pub fn with_level(mut self, level: ValidationLevel) -> Self {
        self.level = level;
        self
    }

    pub(crate) fn push_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub(crate) fn last_rule_mut(&mut self) -> Option<&mut Rule> {
        self.rules.last_mut()
    }

    pub(crate) fn set_optional(&mut self) {
        self.optional = true;
    }

    pub(crate) fn set_condition(&mut self, condition: Condition<T>) {
        self.condition = Some(condition);
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = Some(label);
    }

    pub(crate) fn set_reported_name(&mut self, property: String) {
        self.reported_name = Some(property);
    }

    pub(crate) fn set_level(&mut self, level: ValidationLevel) {
        self.level = level;
    }

    /// Validates the property of `instance` without descending into related
    /// objects. Returns false if an `Error` result was added.
    pub fn validate(&self, instance: &T, notification: &mut ValidationNotification) -> bool {
        let mut context = ValidationContext::detached();
        self.validate_with_context(instance, &PropertyPath::root(), &mut context, notification)
    }

    /// Validates the property of `instance`, which lives at `parent` below the
    /// validated root, recursing through `context` when object-graph
    /// validation is enabled.
    pub fn validate_with_context(
        &self,
        instance: &T,
        parent: &PropertyPath,
        context: &mut ValidationContext<'_>,
        notification: &mut ValidationNotification,
    ) -> bool {
        if let Some(condition) = &self.condition {
            if !condition(instance) {
                trace!(property = %self.name, "condition not met, skipping");
                return true;
            }
        }

        let value = self.accessor.get(instance);
        let is_empty = value.map_or(true, |v| v.is_empty_value());
        if self.optional && value.map_or(true, |v| v.is_default_value()) {
            trace!(property = %self.name, "optional property has no value, skipping");
            return true;
        }
        let value: &dyn PropertyValue = value.unwrap_or(&ABSENT);

        let reported = self.reported_name();
        let path = parent.push_property(reported);
        let label = self.effective_label();
        let target = type_name::<T>();
        let mut valid = true;

        for rule in &self.rules {
            if rule.evaluate(value) {
                continue;
            }
            valid &= self.level < ValidationLevel::Error;
            notification.add(
                ValidationResult::new(Some(reported), rule.render_message(&label), self.level, target)
                    .with_path(path.clone())
                    .with_label(label.clone())
                    .with_code(rule.code()),
            );
        }

        if context.validate_object_graph() && !is_empty {
            let mut nested = Vec::new();
            let mut nested_valid = true;
            value.visit_nested(&mut |index, related| {
                let related_path = match index {
                    Some(index) => path.push_index(index),
                    None => path.clone(),
                };
                nested_valid &= context.validate_nested(related, &related_path, &mut nested);
            });

            if !nested.is_empty() {
                let level = nested
                    .iter()
                    .map(|result| result.level)
                    .max()
                    .unwrap_or_default();
                notification.add(
                    ValidationResult::new(Some(reported), format!("{} is invalid.", label), level, target)
                        .with_path(path.clone())
                        .with_label(label.clone())
                        .with_code("nested")
                        .with_nested(nested),
                );
            }
            valid &= nested_valid;
        }

        valid
    }
}

impl<T> PropertyDescriptor for PropertyValidator<T> {
    fn property_name(&self) -> &str {
        &self.name
    }

    fn reported_name(&self) -> &str {
        self.reported_name.as_deref().unwrap_or(&self.name)
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn effective_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| humanize(&self.name))
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    fn level(&self) -> ValidationLevel {
        self.level
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl<T> fmt::Debug for PropertyValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyValidator")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .field("optional", &self.optional)
            .field("conditional", &self.condition.is_some())
            .field("label", &self.label)
            .field("reported_name", &self.reported_name)
            .field("level", &self.level)
            .finish()
    }
}

/// Turns a property identifier into a label: `address.zip_code` becomes
/// `Address Zip Code`, `firstName` becomes `First Name`.
pub(crate) fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for c in name.chars() {
        if c == '_' || c == '.' || c == ' ' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
