//! A single node of the result tree.

use std::fmt::{self, Display};

use crate::path::PropertyPath;

/// Severity attached to a result.
///
/// Only `Error` results make a notification invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ValidationLevel {
    Info,
    Warning,
    #[default]
    Error,
}

/// One node in the result tree.
///
/// A node without nested results is one concrete violation. A node with
/// nested results aggregates the violations of a related object (or of the
/// elements of a collection property).
///
/// # Example
///
/// ```rust
/// use specwork::{PropertyPath, ValidationLevel, ValidationResult};
///
/// let leaf = ValidationResult::new(Some("last_name"), "Last Name is required.", ValidationLevel::Error, "Contact")
///     .with_path(PropertyPath::root().push_property("contacts").push_index(1).push_property("last_name"));
/// let parent = ValidationResult::new(Some("contacts"), "Contacts is invalid.", ValidationLevel::Error, "Customer")
///     .with_nested(vec![leaf]);
///
/// let messages: Vec<&str> = parent.all_error_messages().collect();
/// assert_eq!(messages, vec!["Contacts is invalid.", "Last Name is required."]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// The property the result is reported against, `None` for type-level results.
    pub property: Option<String>,
    /// Location of the property below the validated root.
    pub path: PropertyPath,
    /// Label used when rendering the message.
    pub label: Option<String>,
    /// The rendered message.
    pub message: String,
    /// Machine-readable code (e.g. `required`, `max_length`, `nested`).
    pub code: String,
    pub level: ValidationLevel,
    /// Type name of the instance the property was read from.
    pub target: &'static str,
    /// Results of the related object(s), in validation order.
    pub nested: Vec<ValidationResult>,
}

impl ValidationResult {
    /// Creates a result for `property`, with its path set to that property below the root.
    pub fn new(
        property: Option<&str>,
        message: impl Into<String>,
        level: ValidationLevel,
        target: &'static str,
    ) -> Self {
        Self {
            property: property.map(str::to_string),
            path: property
                .map(|name| PropertyPath::root().push_property(name))
                .unwrap_or_default(),
            label: None,
            message: message.into(),
            code: "validation_error".to_string(),
            level,
            target,
            nested: Vec::new(),
        }
    }

    /// Sets the full path of the result.
    pub fn with_path(mut self, path: PropertyPath) -> Self {
        self.path = path;
        self
    }

    /// Sets the label used in the message.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the machine-readable code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Attaches the results of a related object.
    pub fn with_nested(mut self, nested: Vec<ValidationResult>) -> Self {
        self.nested = nested;
        self
    }

    /// True for a node that stands for one concrete violation.
    pub fn is_leaf(&self) -> bool {
        self.nested.is_empty()
    }

    /// True if this node or any descendant is an `Error`.
    pub fn has_errors(&self) -> bool {
        self.all().any(|result| result.level == ValidationLevel::Error)
    }

    /// Pre-order traversal of this node and all of its descendants.
    pub fn all(&self) -> All<'_> {
        All { stack: vec![self] }
    }

    /// Messages of [`all`](Self::all), in the same order.
    pub fn all_error_messages(&self) -> impl Iterator<Item = &str> {
        self.all().map(|result| result.message.as_str())
    }

    pub(crate) fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{}{}", "\t".repeat(depth), self.message)?;
        for child in &self.nested {
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// Results are shared across threads by batch validation.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationResult>();
    assert_sync::<ValidationResult>();
};

/// Iterator returned by [`ValidationResult::all`].
pub struct All<'a> {
    stack: Vec<&'a ValidationResult>,
}

impl<'a> All<'a> {
    pub(crate) fn over(roots: &'a [ValidationResult]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for All<'a> {
    type Item = &'a ValidationResult;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.nested.iter().rev());
        Some(next)
    }
}
