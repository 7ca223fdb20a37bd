//! The result tree produced by validation.
//!
//! A [`ValidationNotification`] owns the top-level [`ValidationResult`]s of
//! one call; each result may carry the nested results of a related object.
//! [`ValidationErrors`] is the non-empty form used with `stillwater`.

mod errors;
mod notification;
mod validation_result;

pub use errors::ValidationErrors;
pub use notification::ValidationNotification;
pub use validation_result::{All, ValidationLevel, ValidationResult};
