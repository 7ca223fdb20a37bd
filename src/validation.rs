//! Traversal state for one validation run.
//!
//! [`ValidationContext`] is threaded through every specification and property
//! validator of a run. It resolves specifications for nested values, records
//! which instances have already been visited so cyclic graphs terminate, and
//! bounds the nesting depth.

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::path::PropertyPath;
use crate::result::{ValidationLevel, ValidationNotification, ValidationResult};
use crate::specification::SpecificationLike;

/// Default limit on how many related objects deep a run may descend.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resolves the specification registered for a runtime type.
///
/// Lets the validation module look specifications up without depending on the
/// registry type itself.
pub trait SpecificationLookup: Send + Sync {
    fn lookup(&self, type_id: TypeId) -> Option<Arc<dyn SpecificationLike>>;
}

/// Per-run traversal state.
pub struct ValidationContext<'c> {
    lookup: Option<&'c dyn SpecificationLookup>,
    validate_object_graph: bool,
    visited: HashSet<(TypeId, usize)>,
    depth: usize,
    max_depth: usize,
}

impl<'c> ValidationContext<'c> {
    /// Creates a context that resolves nested specifications through `lookup`.
    pub fn new(
        lookup: &'c dyn SpecificationLookup,
        validate_object_graph: bool,
        max_depth: usize,
    ) -> Self {
        Self {
            lookup: Some(lookup),
            validate_object_graph,
            visited: HashSet::new(),
            depth: 0,
            max_depth,
        }
    }

    /// A context with no registry: properties are checked, related objects
    /// are never descended into.
    pub fn detached() -> Self {
        Self {
            lookup: None,
            validate_object_graph: false,
            visited: HashSet::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Whether nested values are descended into.
    pub fn validate_object_graph(&self) -> bool {
        self.validate_object_graph && self.lookup.is_some()
    }

    /// Current nesting depth below the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Depth at which descending stops with an error.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Records `instance` as visited. Returns false if it already was.
    ///
    /// Identity is the pair of runtime type and address, so a struct and its
    /// first field (which share an address) stay distinct.
    pub fn mark_visited(&mut self, instance: &dyn Any) -> bool {
        let address = instance as *const dyn Any as *const () as usize;
        self.visited.insert((instance.type_id(), address))
    }

    /// Validates a related object with its own registered specification and
    /// appends the produced results to `results`.
    ///
    /// Returns false only if an `Error` result was produced. Revisited
    /// instances and types without a specification count as valid.
    pub fn validate_nested(
        &mut self,
        instance: &dyn Any,
        path: &PropertyPath,
        results: &mut Vec<ValidationResult>,
    ) -> bool {
        let Some(lookup) = self.lookup else {
            return true;
        };
        if !self.mark_visited(instance) {
            return true;
        }
        let Some(specification) = lookup.lookup(instance.type_id()) else {
            debug!(path = %path, "no specification for nested value, skipping");
            return true;
        };

        if self.depth >= self.max_depth {
            results.push(
                ValidationResult::new(
                    path.leaf_property(),
                    format!(
                        "maximum object graph depth {} exceeded at '{}'",
                        self.max_depth, path
                    ),
                    ValidationLevel::Error,
                    specification.subject_type(),
                )
                .with_path(path.clone())
                .with_code("max_depth_exceeded"),
            );
            return false;
        }

        let mut notification = ValidationNotification::new();
        self.depth += 1;
        specification.validate_with_context(instance, path, self, &mut notification);
        self.depth -= 1;

        let valid = notification.is_valid();
        results.extend(notification.into_results());
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyLookup;

    impl SpecificationLookup for EmptyLookup {
        fn lookup(&self, _type_id: TypeId) -> Option<Arc<dyn SpecificationLike>> {
            None
        }
    }

    #[test]
    fn test_mark_visited_is_identity_based() {
        let mut context = ValidationContext::detached();
        let a = String::from("same");
        let b = String::from("same");

        assert!(context.mark_visited(&a));
        assert!(!context.mark_visited(&a));
        assert!(context.mark_visited(&b));
    }

    #[test]
    fn test_same_address_different_type_is_distinct() {
        struct Wrapper {
            inner: u64,
        }
        let wrapper = Wrapper { inner: 7 };
        let mut context = ValidationContext::detached();

        assert!(context.mark_visited(&wrapper));
        assert!(context.mark_visited(&wrapper.inner));
    }

    #[test]
    fn test_detached_context_never_descends() {
        let context = ValidationContext::detached();
        assert!(!context.validate_object_graph());
        assert_eq!(context.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_unregistered_nested_type_is_valid() {
        let lookup = EmptyLookup;
        let mut context = ValidationContext::new(&lookup, true, 8);
        let mut results = Vec::new();

        let valid = context.validate_nested(&42u32, &PropertyPath::root(), &mut results);

        assert!(valid);
        assert!(results.is_empty());
        assert_eq!(context.depth(), 0);
    }
}
