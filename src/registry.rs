//! Type-keyed storage of specifications.
//!
//! This module provides the [`SpecificationContainer`] that maps a subject
//! type to its registered [`Specification`] and resolves lookups by exact
//! runtime type.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use tracing::debug;

use crate::specification::{Specification, SpecificationLike};
use crate::validation::SpecificationLookup;

/// What happens when a specification is registered for a type that already
/// has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The new specification replaces the old one.
    #[default]
    Replace,
    /// Registration fails with [`RegistryError::DuplicateSpecification`].
    Reject,
}

struct Entry {
    specification: Arc<dyn SpecificationLike>,
    typed: Arc<dyn Any + Send + Sync>,
}

type SpecificationMap = Arc<RwLock<IndexMap<TypeId, Entry>>>;

/// A thread-safe map from subject type to specification.
///
/// Clones share the same storage. Lookups hand out `Arc`s and release the
/// lock immediately, so validation never holds it while rules run.
///
/// # Example
///
/// ```rust
/// use specwork::{Specification, SpecificationContainer};
///
/// struct Contact {
///     first_name: String,
/// }
///
/// let container = SpecificationContainer::new();
/// let mut spec = Specification::<Contact>::new();
/// spec.check("first_name", |c| &c.first_name).required();
/// container.add(spec).unwrap();
///
/// assert!(container.contains::<Contact>());
/// assert!(!container.contains::<String>());
/// ```
pub struct SpecificationContainer {
    specifications: SpecificationMap,
    policy: DuplicatePolicy,
}

impl SpecificationContainer {
    /// Creates an empty container that replaces duplicates.
    pub fn new() -> Self {
        Self {
            specifications: Arc::new(RwLock::new(IndexMap::new())),
            policy: DuplicatePolicy::default(),
        }
    }

    /// Sets the policy applied to duplicate registrations.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The policy applied to duplicate registrations.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Registers `specification` for its subject type `T`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateSpecification` if `T` already has a
    /// specification and the policy is [`DuplicatePolicy::Reject`].
    pub fn add<T: 'static>(&self, specification: Specification<T>) -> Result<(), RegistryError> {
        let specification = Arc::new(specification);
        let entry = Entry {
            specification: specification.clone(),
            typed: specification,
        };

        let mut specifications = self.specifications.write();
        let replaced = specifications.contains_key(&TypeId::of::<T>());
        if replaced && self.policy == DuplicatePolicy::Reject {
            return Err(RegistryError::DuplicateSpecification(type_name::<T>()));
        }
        specifications.insert(TypeId::of::<T>(), entry);

        debug!(subject = type_name::<T>(), replaced, "specification registered");
        Ok(())
    }

    /// The specification registered for the runtime type `type_id`.
    pub fn get(&self, type_id: TypeId) -> Option<Arc<dyn SpecificationLike>> {
        self.specifications
            .read()
            .get(&type_id)
            .map(|entry| Arc::clone(&entry.specification))
    }

    /// The specification registered for `T`, with its concrete type.
    pub fn get_typed<T: 'static>(&self) -> Option<Arc<Specification<T>>> {
        let typed = self
            .specifications
            .read()
            .get(&TypeId::of::<T>())
            .map(|entry| Arc::clone(&entry.typed))?;
        typed.downcast::<Specification<T>>().ok()
    }

    /// Returns true if a specification is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.specifications.read().contains_key(&TypeId::of::<T>())
    }

    /// Every registered specification, in registration order.
    pub fn all_specifications(&self) -> Vec<Arc<dyn SpecificationLike>> {
        self.specifications
            .read()
            .values()
            .map(|entry| Arc::clone(&entry.specification))
            .collect()
    }

    /// Number of registered specifications.
    pub fn len(&self) -> usize {
        self.specifications.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.specifications.read().is_empty()
    }

    /// Removes every registration.
    pub fn reset(&self) {
        self.specifications.write().clear();
        debug!("specification container reset");
    }
}

impl Default for SpecificationContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SpecificationContainer {
    fn clone(&self) -> Self {
        Self {
            specifications: Arc::clone(&self.specifications),
            policy: self.policy,
        }
    }
}

impl SpecificationLookup for SpecificationContainer {
    fn lookup(&self, type_id: TypeId) -> Option<Arc<dyn SpecificationLike>> {
        self.get(type_id)
    }
}

/// Errors that can occur during registration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A specification for the type already exists and duplicates are rejected.
    #[error("a specification for '{0}' is already registered")]
    DuplicateSpecification(&'static str),
}
