//! How the engine observes property values.
//!
//! Rules never see concrete property types. They see a `&dyn PropertyValue`,
//! which exposes emptiness, length, text and numeric views, and the nested
//! subjects that object-graph validation descends into.
//!
//! Subject types (the structs you register specifications for) implement the
//! trait by handing themselves to the visitor, which is what makes a property
//! of that type eligible for nested validation:
//!
//! ```rust
//! use std::any::Any;
//! use specwork::PropertyValue;
//!
//! struct Contact {
//!     first_name: String,
//! }
//!
//! impl PropertyValue for Contact {
//!     fn visit_nested(&self, visit: &mut dyn FnMut(Option<usize>, &dyn Any)) {
//!         visit(None, self)
//!     }
//! }
//! ```

use std::any::Any;
use std::cell::OnceCell;
use std::rc::Rc;
use std::sync::Arc;

/// Upcast helper so custom rules can recover the concrete value type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A value the engine can evaluate rules against.
///
/// Every method has a conservative default, so implementing the trait for a
/// plain subject type only requires `visit_nested`.
pub trait PropertyValue: AsAny + 'static {
    /// True when the value counts as "not supplied" (`None`, `""`, `[]`).
    fn is_empty_value(&self) -> bool {
        false
    }

    /// True when the value equals its type's default (`0`, `false`, or any
    /// empty value). `optional()` properties holding a default skip every rule.
    fn is_default_value(&self) -> bool {
        self.is_empty_value()
    }

    /// Length used by the length rules: characters for text, elements for
    /// collections, `None` when the value has no notion of length.
    fn length(&self) -> Option<usize> {
        None
    }

    /// Text view used by pattern rules.
    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Numeric view used by range rules.
    fn as_number(&self) -> Option<f64> {
        None
    }

    /// Hands every nested subject to `visit`, together with its position when
    /// it comes from a collection.
    fn visit_nested(&self, _visit: &mut dyn FnMut(Option<usize>, &dyn Any)) {}
}

/// Stand-in for a value whose accessor path could not be followed.
pub(crate) struct Absent;

impl PropertyValue for Absent {
    fn is_empty_value(&self) -> bool {
        true
    }

    fn length(&self) -> Option<usize> {
        Some(0)
    }
}

pub(crate) static ABSENT: Absent = Absent;

impl PropertyValue for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn length(&self) -> Option<usize> {
        Some(self.chars().count())
    }

    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl PropertyValue for &'static str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn length(&self) -> Option<usize> {
        Some(self.chars().count())
    }

    fn as_text(&self) -> Option<&str> {
        Some(*self)
    }
}

impl PropertyValue for char {
    fn is_default_value(&self) -> bool {
        *self == char::default()
    }

    fn length(&self) -> Option<usize> {
        Some(1)
    }
}

impl PropertyValue for bool {
    fn is_default_value(&self) -> bool {
        !*self
    }
}

macro_rules! numeric_property_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PropertyValue for $ty {
                fn is_default_value(&self) -> bool {
                    *self == <$ty>::default()
                }

                fn as_number(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

numeric_property_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: PropertyValue> PropertyValue for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().map_or(true, PropertyValue::is_empty_value)
    }

    fn length(&self) -> Option<usize> {
        match self {
            Some(value) => value.length(),
            None => Some(0),
        }
    }

    fn as_text(&self) -> Option<&str> {
        self.as_ref().and_then(PropertyValue::as_text)
    }

    fn as_number(&self) -> Option<f64> {
        self.as_ref().and_then(PropertyValue::as_number)
    }

    fn visit_nested(&self, visit: &mut dyn FnMut(Option<usize>, &dyn Any)) {
        if let Some(value) = self {
            value.visit_nested(visit);
        }
    }
}

impl<T: PropertyValue> PropertyValue for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn length(&self) -> Option<usize> {
        Some(self.len())
    }

    fn visit_nested(&self, visit: &mut dyn FnMut(Option<usize>, &dyn Any)) {
        for (index, item) in self.iter().enumerate() {
            item.visit_nested(&mut |_, nested| visit(Some(index), nested));
        }
    }
}

impl<T: PropertyValue> PropertyValue for OnceCell<T> {
    fn is_empty_value(&self) -> bool {
        self.get().map_or(true, PropertyValue::is_empty_value)
    }

    fn length(&self) -> Option<usize> {
        match self.get() {
            Some(value) => value.length(),
            None => Some(0),
        }
    }

    fn as_text(&self) -> Option<&str> {
        self.get().and_then(PropertyValue::as_text)
    }

    fn as_number(&self) -> Option<f64> {
        self.get().and_then(PropertyValue::as_number)
    }

    fn visit_nested(&self, visit: &mut dyn FnMut(Option<usize>, &dyn Any)) {
        if let Some(value) = self.get() {
            value.visit_nested(visit);
        }
    }
}

// Smart pointers are transparent: the pointee decides everything, and nested
// subjects keep the address of the shared allocation so cycles are detected.
macro_rules! pointer_property_value {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T: PropertyValue> PropertyValue for $ptr<T> {
                fn is_empty_value(&self) -> bool {
                    (**self).is_empty_value()
                }

                fn is_default_value(&self) -> bool {
                    (**self).is_default_value()
                }

                fn length(&self) -> Option<usize> {
                    (**self).length()
                }

                fn as_text(&self) -> Option<&str> {
                    (**self).as_text()
                }

                fn as_number(&self) -> Option<f64> {
                    (**self).as_number()
                }

                fn visit_nested(&self, visit: &mut dyn FnMut(Option<usize>, &dyn Any)) {
                    (**self).visit_nested(visit)
                }
            }
        )*
    };
}

pointer_property_value!(Box, Rc, Arc);
