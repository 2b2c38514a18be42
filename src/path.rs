//! Property paths used to locate errors inside a document.

use std::fmt;

/// One step of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named property.
    Property(String),
    /// A position inside a sequence.
    Index(usize),
}

/// Location of a value relative to the document root.
///
/// Renders as `roles[0].ID`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// The document root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns a new path extended by a property name.
    #[must_use]
    pub fn property(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Property(name.into()));
        Self { segments }
    }

    /// Returns a new path extended by a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path's segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Property(name) if i == 0 => f.write_str(name)?,
                PathSegment::Property(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_display() {
        assert_eq!(PropertyPath::root().to_string(), "$");
        assert!(PropertyPath::root().is_root());
    }

    #[test]
    fn test_nested_display() {
        let path = PropertyPath::root().property("roles").index(0).property("ID");
        assert_eq!(path.to_string(), "roles[0].ID");
        assert_eq!(path.segments().len(), 3);
    }

    #[test]
    fn test_extension_does_not_mutate() {
        let base = PropertyPath::root().property("values");
        let _child = base.index(3);
        assert_eq!(base.to_string(), "values");
    }
}
