//! Leaf rules evaluated against a single property value.
//!
//! A [`Rule`] is a stateless predicate with fixed parameters and an error
//! message template. Rules know nothing about the object they were read from;
//! optionality and conditions are handled by the owning
//! [`PropertyValidator`](crate::PropertyValidator).
//!
//! Templates use `{label}` for the property label and `{<parameter>}` for
//! each named parameter:
//!
//! ```rust
//! use specwork::Rule;
//!
//! let rule = Rule::min_length(3);
//! assert_eq!(rule.error_message_template(), "{label} must have a length of at least {length}.");
//! assert_eq!(rule.render_message("First Name"), "First Name must have a length of at least 3.");
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{json, Value};

use crate::value::PropertyValue;

/// Type-erased predicate behind [`RuleKind::Custom`].
pub type CustomPredicate = Arc<dyn Fn(&dyn PropertyValue) -> bool + Send + Sync>;

/// The closed set of rule kinds.
#[derive(Clone)]
pub enum RuleKind {
    /// The value must be supplied (not `None`, `""` or `[]`).
    Required,
    /// Length must be `>= length`.
    MinLength { length: usize },
    /// Length must be `<= length`.
    MaxLength { length: usize },
    /// Length must lie in `min..=max`.
    LengthBetween { min: usize, max: usize },
    /// Text must match the expression.
    Matches { regex: Regex },
    /// Numeric value must be `>= min`.
    MinValue { min: f64 },
    /// Numeric value must be `<= max`.
    MaxValue { max: f64 },
    /// Caller-supplied predicate.
    Custom {
        name: String,
        predicate: CustomPredicate,
    },
}

/// Fieldless discriminant of [`RuleKind`], used as a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleTag {
    Required,
    MinLength,
    MaxLength,
    LengthBetween,
    Matches,
    MinValue,
    MaxValue,
    Custom,
}

impl RuleKind {
    /// The fieldless discriminant of this kind.
    pub fn tag(&self) -> RuleTag {
        match self {
            RuleKind::Required => RuleTag::Required,
            RuleKind::MinLength { .. } => RuleTag::MinLength,
            RuleKind::MaxLength { .. } => RuleTag::MaxLength,
            RuleKind::LengthBetween { .. } => RuleTag::LengthBetween,
            RuleKind::Matches { .. } => RuleTag::Matches,
            RuleKind::MinValue { .. } => RuleTag::MinValue,
            RuleKind::MaxValue { .. } => RuleTag::MaxValue,
            RuleKind::Custom { .. } => RuleTag::Custom,
        }
    }

    /// Machine-readable code copied onto every result this rule produces.
    pub fn code(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::MinLength { .. } => "min_length",
            RuleKind::MaxLength { .. } => "max_length",
            RuleKind::LengthBetween { .. } => "length_between",
            RuleKind::Matches { .. } => "pattern",
            RuleKind::MinValue { .. } => "min_value",
            RuleKind::MaxValue { .. } => "max_value",
            RuleKind::Custom { .. } => "custom",
        }
    }

    fn default_template(&self) -> &'static str {
        match self {
            RuleKind::Required => "{label} is required.",
            RuleKind::MinLength { .. } => "{label} must have a length of at least {length}.",
            RuleKind::MaxLength { .. } => "{label} must have a length of at most {length}.",
            RuleKind::LengthBetween { .. } => "{label} must have a length between {min} and {max}.",
            RuleKind::Matches { .. } => "{label} must match the pattern '{pattern}'.",
            RuleKind::MinValue { .. } => "{label} must be at least {min}.",
            RuleKind::MaxValue { .. } => "{label} must be at most {max}.",
            RuleKind::Custom { .. } => "{label} is not valid ({name}).",
        }
    }

    /// Named parameters in their fixed order.
    pub fn parameters(&self) -> Vec<(&'static str, Value)> {
        match self {
            RuleKind::Required => Vec::new(),
            RuleKind::MinLength { length } | RuleKind::MaxLength { length } => {
                vec![("length", json!(length))]
            }
            RuleKind::LengthBetween { min, max } => vec![("min", json!(min)), ("max", json!(max))],
            RuleKind::Matches { regex } => vec![("pattern", json!(regex.as_str()))],
            RuleKind::MinValue { min } => vec![("min", number_parameter(*min))],
            RuleKind::MaxValue { max } => vec![("max", number_parameter(*max))],
            RuleKind::Custom { name, .. } => vec![("name", json!(name))],
        }
    }

    fn evaluate(&self, value: &dyn PropertyValue) -> bool {
        match self {
            RuleKind::Required => !value.is_empty_value(),
            RuleKind::MinLength { length } => value.length().is_some_and(|len| len >= *length),
            RuleKind::MaxLength { length } => value.length().is_some_and(|len| len <= *length),
            RuleKind::LengthBetween { min, max } => value
                .length()
                .is_some_and(|len| (*min..=*max).contains(&len)),
            RuleKind::Matches { regex } => value.as_text().is_some_and(|s| regex.is_match(s)),
            RuleKind::MinValue { min } => value.as_number().is_some_and(|n| n >= *min),
            RuleKind::MaxValue { max } => value.as_number().is_some_and(|n| n <= *max),
            RuleKind::Custom { predicate, .. } => predicate(value),
        }
    }
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = format!("{:?}", self.tag());
        let mut out = f.debug_struct(&tag);
        for (name, value) in self.parameters() {
            out.field(name, &format_args!("{}", value));
        }
        out.finish()
    }
}

// Whole numbers render without a trailing `.0` in messages and exports.
fn number_parameter(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// A rule kind plus an optional message override.
#[derive(Clone, Debug)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

impl Rule {
    /// Creates a rule of `kind` with its default message.
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// The value must be supplied.
    pub fn required() -> Self {
        Self::new(RuleKind::Required)
    }

    /// The value must have at least `length` characters or elements.
    pub fn min_length(length: usize) -> Self {
        Self::new(RuleKind::MinLength { length })
    }

    /// The value must have at most `length` characters or elements.
    pub fn max_length(length: usize) -> Self {
        Self::new(RuleKind::MaxLength { length })
    }

    /// The length must lie in `min..=max`.
    pub fn length_between(min: usize, max: usize) -> Self {
        Self::new(RuleKind::LengthBetween { min, max })
    }

    /// The text must match `regex`.
    pub fn matches(regex: Regex) -> Self {
        Self::new(RuleKind::Matches { regex })
    }

    /// The number must be at least `min`.
    pub fn min_value(min: impl Into<f64>) -> Self {
        Self::new(RuleKind::MinValue { min: min.into() })
    }

    /// The number must be at most `max`.
    pub fn max_value(max: impl Into<f64>) -> Self {
        Self::new(RuleKind::MaxValue { max: max.into() })
    }

    /// A caller-defined rule over values of type `V`.
    ///
    /// A value of any other type (including an absent path) fails the rule.
    ///
    /// ```rust
    /// use specwork::Rule;
    ///
    /// let even = Rule::custom("even", |n: &i32| n % 2 == 0);
    /// assert!(even.evaluate(&4));
    /// assert!(!even.evaluate(&5));
    /// ```
    pub fn custom<V, F>(name: impl Into<String>, predicate: F) -> Self
    where
        V: PropertyValue,
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        let predicate: CustomPredicate = Arc::new(move |value: &dyn PropertyValue| {
            value.as_any().downcast_ref::<V>().is_some_and(&predicate)
        });
        Self::new(RuleKind::Custom {
            name: name.into(),
            predicate,
        })
    }

    /// Replaces the default message template.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The rule kind and its parameters.
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// The kind discriminant, used to key export tables.
    pub fn tag(&self) -> RuleTag {
        self.kind.tag()
    }

    /// Machine-readable code attached to failures (e.g. `min_length`).
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// The message template: the custom message if set, else the kind's default.
    pub fn error_message_template(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_template())
    }

    /// Parameter values in their fixed order, as addressed by index.
    pub fn parameters(&self) -> Vec<Value> {
        self.kind
            .parameters()
            .into_iter()
            .map(|(_, value)| value)
            .collect()
    }

    /// Returns true if `value` satisfies the rule.
    pub fn evaluate(&self, value: &dyn PropertyValue) -> bool {
        self.kind.evaluate(value)
    }

    /// Fills the template with `label` and the rule's parameters.
    pub fn render_message(&self, label: &str) -> String {
        let parameters = self.kind.parameters();
        let mut message = String::new();
        let mut rest = self.error_message_template();

        // Single pass: substituted text is never scanned again.
        while let Some(start) = rest.find('{') {
            message.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                rest = &rest[start..];
                break;
            };
            let name = &after[..end];
            if name == "label" {
                message.push_str(label);
            } else if let Some((_, value)) = parameters.iter().find(|(p, _)| *p == name) {
                match value {
                    Value::String(s) => message.push_str(s),
                    other => message.push_str(&other.to_string()),
                }
            } else {
                message.push_str(&rest[start..start + end + 2]);
            }
            rest = &after[end + 1..];
        }
        message.push_str(rest);
        message
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_empty_values() {
        let rule = Rule::required();
        assert!(rule.evaluate(&"x".to_string()));
        assert!(!rule.evaluate(&String::new()));
        assert!(!rule.evaluate(&None::<String>));
        assert!(!rule.evaluate(&Vec::<String>::new()));
        assert!(rule.evaluate(&0i32));
    }

    #[test]
    fn test_length_rules_count_characters() {
        assert!(Rule::min_length(3).evaluate(&"日本語".to_string()));
        assert!(!Rule::min_length(4).evaluate(&"日本語".to_string()));
        assert!(Rule::max_length(3).evaluate(&"abc".to_string()));
        assert!(!Rule::max_length(2).evaluate(&"abc".to_string()));
    }

    #[test]
    fn test_length_between_is_inclusive() {
        let rule = Rule::length_between(1, 5);
        assert!(rule.evaluate(&"a".to_string()));
        assert!(rule.evaluate(&"abcde".to_string()));
        assert!(!rule.evaluate(&String::new()));
        assert!(!rule.evaluate(&"abcdef".to_string()));
    }

    #[test]
    fn test_length_rules_on_collections() {
        let items = vec![1, 2, 3];
        assert!(Rule::min_length(3).evaluate(&items));
        assert!(!Rule::max_length(2).evaluate(&items));
    }

    #[test]
    fn test_absent_option_has_zero_length() {
        assert!(Rule::max_length(255).evaluate(&None::<String>));
        assert!(!Rule::min_length(1).evaluate(&None::<String>));
    }

    #[test]
    fn test_length_rules_fail_without_length() {
        assert!(!Rule::max_length(10).evaluate(&5i32));
    }

    #[test]
    fn test_matches_rule() {
        let rule = Rule::matches(Regex::new(r"^\d+$").unwrap());
        assert!(rule.evaluate(&"12345".to_string()));
        assert!(!rule.evaluate(&"abc".to_string()));
        assert!(!rule.evaluate(&42i32));
    }

    #[test]
    fn test_numeric_range_rules() {
        assert!(Rule::min_value(18).evaluate(&18u32));
        assert!(!Rule::min_value(18).evaluate(&17u32));
        assert!(Rule::max_value(1.5).evaluate(&1.25f64));
        assert!(!Rule::max_value(10).evaluate(&"text".to_string()));
    }

    #[test]
    fn test_custom_rule_rejects_other_types() {
        let rule = Rule::custom("upper", |s: &String| s.chars().all(char::is_uppercase));
        assert!(rule.evaluate(&"ABC".to_string()));
        assert!(!rule.evaluate(&"AbC".to_string()));
        assert!(!rule.evaluate(&12i32));
    }

    #[test]
    fn test_render_message_fills_parameters() {
        let rule = Rule::length_between(2, 8);
        assert_eq!(
            rule.render_message("Last Name"),
            "Last Name must have a length between 2 and 8."
        );

        let rule = Rule::min_value(18);
        assert_eq!(rule.render_message("Age"), "Age must be at least 18.");

        let rule = Rule::matches(Regex::new("^[a-z]+$").unwrap());
        assert_eq!(
            rule.render_message("Code"),
            "Code must match the pattern '^[a-z]+$'."
        );
    }

    #[test]
    fn test_render_message_leaves_label_text_alone() {
        let rule = Rule::min_length(3);
        assert_eq!(
            rule.render_message("Name {length}"),
            "Name {length} must have a length of at least 3."
        );

        let rule = Rule::required().with_message("{label} needs {unknown} {");
        assert_eq!(rule.render_message("Code"), "Code needs {unknown} {");
    }

    #[test]
    fn test_custom_message_template() {
        let rule = Rule::max_length(5).with_message("{label} is too long (max {length})");
        assert_eq!(rule.error_message_template(), "{label} is too long (max {length})");
        assert_eq!(rule.render_message("Street"), "Street is too long (max 5)");
    }

    #[test]
    fn test_parameters_are_ordered() {
        assert_eq!(Rule::length_between(1, 5).parameters(), vec![json!(1), json!(5)]);
        assert_eq!(Rule::min_length(3).parameters(), vec![json!(3)]);
        assert!(Rule::required().parameters().is_empty());
    }

    #[test]
    fn test_tags_and_codes() {
        assert_eq!(Rule::required().tag(), RuleTag::Required);
        assert_eq!(Rule::max_length(1).code(), "max_length");
        assert_eq!(Rule::custom("x", |_: &i32| true).tag(), RuleTag::Custom);
    }

    #[test]
    fn test_debug_shows_parameters() {
        assert_eq!(format!("{:?}", Rule::min_length(3).kind()), "MinLength { length: 3 }");
        assert_eq!(format!("{:?}", Rule::required().kind()), "Required");
    }
}
