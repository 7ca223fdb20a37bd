//! The validation entry point.
//!
//! A [`ValidationCatalog`] owns the specification registry and runs
//! validations against it. It resolves an instance's specification by runtime
//! type, runs every property validator in order, and, when object-graph
//! validation is enabled, descends into related objects that have their own
//! specification.
//!
//! # Example
//!
//! ```rust
//! use std::any::Any;
//! use specwork::{PropertyValue, ValidationCatalog};
//!
//! struct Contact {
//!     first_name: String,
//!     last_name: Option<String>,
//! }
//!
//! impl PropertyValue for Contact {
//!     fn visit_nested(&self, visit: &mut dyn FnMut(Option<usize>, &dyn Any)) {
//!         visit(None, self);
//!     }
//! }
//!
//! struct Customer {
//!     name: String,
//!     contacts: Vec<Contact>,
//! }
//!
//! let catalog = ValidationCatalog::new().with_object_graph(true);
//! catalog
//!     .add_specification::<Customer>(|spec| {
//!         spec.check("name", |c| &c.name).required();
//!         spec.check("contacts", |c| &c.contacts).required();
//!     })
//!     .unwrap();
//! catalog
//!     .add_specification::<Contact>(|spec| {
//!         spec.check("first_name", |c| &c.first_name).required();
//!         spec.check("last_name", |c| &c.last_name).required();
//!     })
//!     .unwrap();
//!
//! let customer = Customer {
//!     name: "TestCustomer".to_string(),
//!     contacts: vec![
//!         Contact { first_name: "Johnny B".into(), last_name: Some("Good".into()) },
//!         Contact { first_name: "Baddy".into(), last_name: None },
//!     ],
//! };
//!
//! let notification = catalog.validate(&customer);
//! assert!(!notification.is_valid());
//!
//! let leaf = notification.all().find(|r| r.is_leaf()).unwrap();
//! assert_eq!(leaf.path.to_string(), "contacts[1].last_name");
//! assert_eq!(leaf.message, "Last Name is required.");
//! ```

use std::any::{type_name, Any, TypeId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::path::PropertyPath;
use crate::registry::{DuplicatePolicy, RegistryError, SpecificationContainer};
use crate::result::ValidationNotification;
use crate::specification::{Specification, SpecificationLike};
use crate::validation::{ValidationContext, DEFAULT_MAX_DEPTH};

/// Registry plus validation runner.
///
/// Registration is expected during setup; validation may then run from many
/// threads at once, since the catalog is `Send + Sync` and lookups only take
/// a read lock for as long as it takes to clone an `Arc`.
pub struct ValidationCatalog {
    container: SpecificationContainer,
    validate_object_graph: AtomicBool,
    max_depth: usize,
}

impl ValidationCatalog {
    /// Creates an empty catalog with object-graph validation disabled.
    pub fn new() -> Self {
        Self {
            container: SpecificationContainer::new(),
            validate_object_graph: AtomicBool::new(false),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Enables or disables descending into related objects.
    pub fn with_object_graph(self, enabled: bool) -> Self {
        self.validate_object_graph.store(enabled, Ordering::Relaxed);
        self
    }

    /// Sets how many related objects deep a run may descend before it records
    /// a `max_depth_exceeded` error instead.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets what happens when a type is registered twice.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.container = self.container.with_duplicate_policy(policy);
        self
    }

    /// Builds a specification for `T` and registers it.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateSpecification` if `T` is already
    /// registered and the catalog rejects duplicates.
    pub fn add_specification<T: 'static>(
        &self,
        build: impl FnOnce(&mut Specification<T>),
    ) -> Result<(), RegistryError> {
        let mut specification = Specification::new();
        build(&mut specification);
        self.register(specification)
    }

    /// Registers an already built specification.
    ///
    /// # Errors
    ///
    /// See [`add_specification`](Self::add_specification).
    pub fn register<T: 'static>(&self, specification: Specification<T>) -> Result<(), RegistryError> {
        self.container.add(specification)
    }

    /// Validates `instance` against the specification registered for `T`.
    ///
    /// Unregistered types yield an empty, valid notification; use
    /// [`try_validate`](Self::try_validate) to tell the two apart.
    pub fn validate<T: Any>(&self, instance: &T) -> ValidationNotification {
        self.try_validate(instance).unwrap_or_default()
    }

    /// Validates a type-erased instance by its runtime type.
    pub fn validate_any(&self, instance: &dyn Any) -> ValidationNotification {
        let mut notification = ValidationNotification::new();
        self.validate_erased(instance, &mut notification);
        notification
    }

    /// Like [`validate`](Self::validate), but returns `None` when no
    /// specification is registered for `T`.
    pub fn try_validate<T: Any>(&self, instance: &T) -> Option<ValidationNotification> {
        let Some(specification) = self.container.get(TypeId::of::<T>()) else {
            debug!(subject = type_name::<T>(), "no specification registered, not validated");
            return None;
        };

        let mut notification = ValidationNotification::new();
        self.run(specification.as_ref(), instance, &mut notification);
        Some(notification)
    }

    /// Validates `instance` into an existing notification.
    ///
    /// Returns false if an `Error` result was added. Unregistered types add
    /// nothing and return true.
    pub fn validate_into<T: Any>(&self, instance: &T, notification: &mut ValidationNotification) -> bool {
        self.validate_erased(instance, notification)
    }

    /// Validates every instance in parallel, returning one notification per
    /// instance in input order.
    pub fn validate_batch<T: Any + Sync>(&self, instances: &[T]) -> Vec<ValidationNotification> {
        instances
            .par_iter()
            .map(|instance| self.validate(instance))
            .collect()
    }

    /// Enables or disables object-graph validation for subsequent runs.
    pub fn set_validate_object_graph(&self, enabled: bool) {
        self.validate_object_graph.store(enabled, Ordering::Relaxed);
    }

    /// Whether runs descend into related objects.
    pub fn validate_object_graph(&self) -> bool {
        self.validate_object_graph.load(Ordering::Relaxed)
    }

    /// How many related objects deep a run may descend.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Removes every registered specification.
    pub fn reset(&self) {
        self.container.reset();
    }

    /// The specification registered for `T`.
    pub fn specification<T: 'static>(&self) -> Option<Arc<Specification<T>>> {
        self.container.get_typed::<T>()
    }

    /// The underlying specification registry.
    pub fn container(&self) -> &SpecificationContainer {
        &self.container
    }

    fn validate_erased(&self, instance: &dyn Any, notification: &mut ValidationNotification) -> bool {
        match self.container.get(instance.type_id()) {
            Some(specification) => self.run(specification.as_ref(), instance, notification),
            None => {
                debug!("no specification registered for instance, not validated");
                true
            }
        }
    }

    fn run(
        &self,
        specification: &dyn SpecificationLike,
        instance: &dyn Any,
        notification: &mut ValidationNotification,
    ) -> bool {
        let mut context =
            ValidationContext::new(&self.container, self.validate_object_graph(), self.max_depth);
        // The root counts as visited so references back to it stop there.
        context.mark_visited(instance);
        specification.validate_with_context(instance, &PropertyPath::root(), &mut context, notification)
    }
}

impl Default for ValidationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ValidationCatalog>();
};

#[cfg(test)]
mod tests {
    use super::*;

    struct Contact {
        first_name: String,
        last_name: String,
    }

    fn contact(first: &str, last: &str) -> Contact {
        Contact {
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    fn catalog() -> ValidationCatalog {
        let catalog = ValidationCatalog::new();
        catalog
            .add_specification::<Contact>(|spec| {
                spec.check("first_name", |c| &c.first_name).required();
                spec.check("last_name", |c| &c.last_name).required();
            })
            .unwrap();
        catalog
    }

    #[test]
    fn test_valid_instance_has_no_errors() {
        let notification = catalog().validate(&contact("Johnny B", "Good"));
        assert!(notification.is_valid());
        assert!(notification.errors().is_empty());
    }

    #[test]
    fn test_every_property_is_checked() {
        let notification = catalog().validate(&contact("", ""));
        assert_eq!(notification.len(), 2);
    }

    #[test]
    fn test_unregistered_type_is_permissive() {
        let catalog = catalog();
        assert!(catalog.validate(&42u32).is_valid());
        assert!(catalog.try_validate(&42u32).is_none());
        assert!(catalog.try_validate(&contact("a", "b")).is_some());
    }

    #[test]
    fn test_validate_any_resolves_runtime_type() {
        let catalog = catalog();
        let instance: Box<dyn Any> = Box::new(contact("", "Good"));

        let notification = catalog.validate_any(instance.as_ref());
        assert_eq!(notification.len(), 1);
    }

    #[test]
    fn test_validate_into_appends() {
        let catalog = catalog();
        let mut notification = ValidationNotification::new();

        assert!(!catalog.validate_into(&contact("", "x"), &mut notification));
        assert!(!catalog.validate_into(&contact("x", ""), &mut notification));
        assert!(catalog.validate_into(&7i32, &mut notification));
        assert_eq!(notification.len(), 2);
    }

    #[test]
    fn test_reset_clears_registrations() {
        let catalog = catalog();
        catalog.reset();
        assert!(catalog.specification::<Contact>().is_none());
        assert!(catalog.validate(&contact("", "")).is_valid());
    }

    #[test]
    fn test_object_graph_toggle() {
        let catalog = ValidationCatalog::new();
        assert!(!catalog.validate_object_graph());
        catalog.set_validate_object_graph(true);
        assert!(catalog.validate_object_graph());
        assert!(ValidationCatalog::new().with_object_graph(true).validate_object_graph());
    }

    #[test]
    fn test_duplicate_policy_is_forwarded() {
        let catalog = ValidationCatalog::new().with_duplicate_policy(DuplicatePolicy::Reject);
        catalog.add_specification::<Contact>(|_| {}).unwrap();
        assert!(catalog.add_specification::<Contact>(|_| {}).is_err());
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let catalog = catalog();
        let contacts = vec![contact("a", "b"), contact("", "b"), contact("", "")];

        let counts: Vec<usize> = catalog
            .validate_batch(&contacts)
            .iter()
            .map(|n| n.len())
            .collect();
        assert_eq!(counts, vec![0, 1, 2]);
    }
}
