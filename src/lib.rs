//! # Specwork
//!
//! A declarative object-validation engine. Callers register, per data type, a
//! [`Specification`]: an ordered list of property validators, each binding a
//! chain of [`Rule`]s to one property. Instances are then validated against
//! the registry and every failing rule is reported, never just the first.
//!
//! ## Overview
//!
//! - [`ValidationCatalog`]: registers specifications and runs validations,
//!   optionally descending into related objects (the object graph) with cycle
//!   and depth guards.
//! - [`Specification`] and [`PropertyValidator`]: the per-type and
//!   per-property configuration, with optional, conditional, label, property
//!   override and severity settings.
//! - [`ValidationNotification`] and [`ValidationResult`]: the result tree.
//!   Results for related objects nest under a node for the property that
//!   reached them.
//! - [`ClientRuleRegistry`]: exports rules as client-side descriptors.
//!
//! ## Example
//!
//! ```rust
//! use specwork::{ValidationCatalog, ValidationLevel};
//!
//! struct Contact {
//!     first_name: String,
//!     last_name: String,
//!     nickname: Option<String>,
//! }
//!
//! let catalog = ValidationCatalog::new();
//! catalog
//!     .add_specification::<Contact>(|spec| {
//!         spec.check("first_name", |c| &c.first_name).required().max_length(20);
//!         spec.check("last_name", |c| &c.last_name)
//!             .required()
//!             .with_label("Surname");
//!         spec.check("nickname", |c| &c.nickname)
//!             .optional()
//!             .min_length(3)
//!             .with_level(ValidationLevel::Warning);
//!     })
//!     .unwrap();
//!
//! let contact = Contact {
//!     first_name: "Johnny B".to_string(),
//!     last_name: String::new(),
//!     nickname: Some("JB".to_string()),
//! };
//!
//! let notification = catalog.validate(&contact);
//! assert!(!notification.is_valid());
//! assert_eq!(
//!     notification.all_error_messages().collect::<Vec<_>>(),
//!     vec!["Surname is required.", "Nickname must have a length of at least 3."]
//! );
//! ```

pub mod catalog;
pub mod interop;
pub mod path;
pub mod registry;
pub mod result;
pub mod rule;
pub mod specification;
pub mod validation;
pub mod value;

pub use catalog::ValidationCatalog;
pub use interop::{ClientRule, ClientRuleMap, ClientRuleRegistry};
pub use path::{PathSegment, PropertyPath};
pub use registry::{DuplicatePolicy, RegistryError, SpecificationContainer};
pub use result::{ValidationErrors, ValidationLevel, ValidationNotification, ValidationResult};
pub use rule::{Rule, RuleKind, RuleTag};
pub use specification::{
    PropertyDescriptor, PropertyRules, PropertyValidator, Specification, SpecificationLike,
};
pub use validation::{SpecificationLookup, ValidationContext, DEFAULT_MAX_DEPTH};
pub use value::{AsAny, PropertyValue};

/// Outcome of a validation in `stillwater` form.
pub type ValidationOutcome = stillwater::Validation<(), ValidationErrors>;
