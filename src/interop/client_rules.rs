//! Client-side rule descriptors.
//!
//! Browser-side validation mirrors a subset of the server rules. This module
//! turns a [`Rule`] into the descriptor such a client needs: a rule type name,
//! the message template, and the named parameter values. Only rule kinds
//! present in the [`ClientRuleRegistry`] table are exportable.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::rule::{Rule, RuleTag};

/// How one rule kind is described to the client.
///
/// `parameters` maps each client parameter name to the index of the value in
/// [`Rule::parameters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRuleMap {
    pub validation_type: String,
    pub parameters: IndexMap<String, usize>,
}

impl ClientRuleMap {
    /// Creates a mapping with no parameters.
    pub fn new(validation_type: impl Into<String>) -> Self {
        Self {
            validation_type: validation_type.into(),
            parameters: IndexMap::new(),
        }
    }

    /// Adds a client parameter read from the rule parameter at `index`.
    pub fn parameter(mut self, name: impl Into<String>, index: usize) -> Self {
        self.parameters.insert(name.into(), index);
        self
    }
}

/// A rule as the client sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRule {
    pub validation_type: String,
    pub error_message: String,
    pub parameters: IndexMap<String, Value>,
}

impl ClientRule {
    /// Renders the descriptor as JSON.
    ///
    /// ```rust
    /// use specwork::{ClientRuleRegistry, Rule};
    /// use serde_json::json;
    ///
    /// let registry = ClientRuleRegistry::new();
    /// let client = registry.create(&Rule::max_length(20)).unwrap();
    ///
    /// assert_eq!(
    ///     client.to_json(),
    ///     json!({
    ///         "validation_type": "specmaxlength",
    ///         "error_message": "{label} must have a length of at most {length}.",
    ///         "parameters": { "length": 20 }
    ///     })
    /// );
    /// ```
    pub fn to_json(&self) -> Value {
        let parameters: Map<String, Value> = self
            .parameters
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        json!({
            "validation_type": self.validation_type,
            "error_message": self.error_message,
            "parameters": parameters,
        })
    }
}

/// Lookup table from rule kind to client descriptor.
///
/// The default table covers `Required`, `MinLength` and `MaxLength`; further
/// kinds can be added with [`register`](Self::register).
#[derive(Debug, Clone)]
pub struct ClientRuleRegistry {
    mappings: IndexMap<RuleTag, ClientRuleMap>,
}

impl ClientRuleRegistry {
    /// Creates a registry with the default mappings.
    pub fn new() -> Self {
        let mut mappings = IndexMap::new();
        mappings.insert(RuleTag::Required, ClientRuleMap::new("specrequired"));
        mappings.insert(
            RuleTag::MinLength,
            ClientRuleMap::new("specminlength").parameter("length", 0),
        );
        mappings.insert(
            RuleTag::MaxLength,
            ClientRuleMap::new("specmaxlength").parameter("length", 0),
        );
        Self { mappings }
    }

    /// A registry with no mappings.
    pub fn empty() -> Self {
        Self {
            mappings: IndexMap::new(),
        }
    }

    /// Adds or replaces the mapping for `tag`.
    pub fn register(&mut self, tag: RuleTag, map: ClientRuleMap) {
        self.mappings.insert(tag, map);
    }

    /// The mapping registered for `tag`.
    pub fn mapping(&self, tag: RuleTag) -> Option<&ClientRuleMap> {
        self.mappings.get(&tag)
    }

    /// Describes `rule` for the client, or `None` if its kind has no mapping.
    ///
    /// Parameters whose index is past the end of the rule's parameter list
    /// are left out.
    pub fn create(&self, rule: &Rule) -> Option<ClientRule> {
        let map = self.mappings.get(&rule.tag())?;
        let values = rule.parameters();

        let parameters = map
            .parameters
            .iter()
            .filter_map(|(name, index)| values.get(*index).map(|value| (name.clone(), value.clone())))
            .collect();

        Some(ClientRule {
            validation_type: map.validation_type.clone(),
            error_message: rule.error_message_template().to_string(),
            parameters,
        })
    }
}

impl Default for ClientRuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
