//! Property paths locating a violation inside an object graph.
//!
//! A [`PropertyPath`] is built while the catalog descends from the validated
//! root into nested properties and collection elements, so every result can
//! be traced back to e.g. `contacts[1].last_name`.

use std::fmt::{self, Display};

/// One step of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named property (e.g. `address`, `last_name`).
    Property(String),
    /// A position inside a collection property (e.g. `[0]`).
    Index(usize),
}

/// Path from the validated root to a property.
///
/// # Example
///
/// ```rust
/// use specwork::PropertyPath;
///
/// let path = PropertyPath::root()
///     .push_property("contacts")
///     .push_index(1)
///     .push_property("last_name");
///
/// assert_eq!(path.to_string(), "contacts[1].last_name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// The path of the validated root instance.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with a property segment appended.
    pub fn push_property(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Property(name.into()));
        Self { segments }
    }

    /// Returns a new path with a collection index appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments, i.e. how deep below the root the path points.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The segments from the root outward.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// The innermost property name, skipping trailing indices.
    pub fn leaf_property(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            PathSegment::Property(name) => Some(name.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    /// The path without its last segment, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }
}

impl Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Property(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
