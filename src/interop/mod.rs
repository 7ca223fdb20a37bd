//! Export of rules to other validation layers.
//!
//! Currently this covers client-side (browser) validation descriptors.

pub mod client_rules;

pub use client_rules::{ClientRule, ClientRuleMap, ClientRuleRegistry};
