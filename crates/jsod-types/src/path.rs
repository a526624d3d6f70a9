//! Path segments and property paths.

use std::fmt;

/// One step from a value to one of its children.
///
/// Variant order defines the ordering of subtree keys: indices first (in
/// numeric order), then property names (lexicographic).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Position in an ordered list.
    Index(usize),
    /// Name of an object property.
    Property(String),
    /// Synthetic position of an entry in an unordered value list.
    ///
    /// A slot is only ever the tail of a recording path and never becomes a
    /// subtree key: records keyed by a slot live on the list's own node.
    Slot(usize),
}

impl PathSegment {
    pub fn property(name: impl Into<String>) -> Self {
        PathSegment::Property(name.into())
    }

    /// Returns `true` for list positions, ordered or unordered.
    pub fn is_numeric(&self) -> bool {
        matches!(self, PathSegment::Index(_) | PathSegment::Slot(_))
    }

    pub fn is_slot(&self) -> bool {
        matches!(self, PathSegment::Slot(_))
    }

    /// The numeric position of an index or slot.
    pub fn position(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) | PathSegment::Slot(i) => Some(*i),
            PathSegment::Property(_) => None,
        }
    }

    /// Loose equality used when matching keys across independently decoded
    /// trees: an index and a property name address the same child when the
    /// name is the decimal rendering of the index.
    pub fn addresses_same(&self, other: &PathSegment) -> bool {
        match (self, other) {
            (PathSegment::Index(i), PathSegment::Property(p))
            | (PathSegment::Property(p), PathSegment::Index(i)) => p == &i.to_string(),
            _ => self == other,
        }
    }

    /// The object key this segment addresses.
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Index(i) | PathSegment::Slot(i) => i.to_string(),
            PathSegment::Property(p) => p.clone(),
        }
    }

    /// Parse a subtree key: canonical decimal numbers are indices, so that
    /// `parse_key(k).as_key() == k` for every key.
    pub fn parse_key(key: &str) -> Self {
        match key.parse::<usize>() {
            Ok(i) if i.to_string() == key => PathSegment::Index(i),
            _ => PathSegment::Property(key.to_string()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            PathSegment::Property(p) => write!(f, "{p}"),
            PathSegment::Slot(i) => write!(f, "<{i}>"),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Property(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Property(name)
    }
}

/// The sequence of segments leading from a diff root to a node.
pub type PropertyPath = Vec<PathSegment>;

/// `Display` adapter for a path: segments joined by `/`, the root as `.`.
pub struct PathDisplay<'a>(pub &'a [PathSegment]);

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_sort_numerically_before_properties() {
        let mut keys = vec![
            PathSegment::property("b"),
            PathSegment::Index(10),
            PathSegment::property("a"),
            PathSegment::Index(2),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                PathSegment::Index(2),
                PathSegment::Index(10),
                PathSegment::property("a"),
                PathSegment::property("b"),
            ]
        );
    }

    #[test]
    fn parse_key_recognises_indices() {
        assert_eq!(PathSegment::parse_key("12"), PathSegment::Index(12));
        assert_eq!(PathSegment::parse_key("x1"), PathSegment::property("x1"));
        assert_eq!(PathSegment::parse_key(""), PathSegment::property(""));
        assert_eq!(PathSegment::parse_key("0"), PathSegment::Index(0));
    }

    #[test]
    fn parse_key_keeps_non_canonical_numbers_as_names() {
        for key in ["007", "+5", "00", "99999999999999999999999"] {
            let segment = PathSegment::parse_key(key);
            assert_eq!(segment, PathSegment::property(key));
            assert_eq!(segment.as_key(), key);
        }
        assert!(!PathSegment::Index(7).addresses_same(&PathSegment::property("007")));
    }

    #[test]
    fn loose_addressing() {
        assert!(PathSegment::Index(3).addresses_same(&PathSegment::property("3")));
        assert!(!PathSegment::Index(3).addresses_same(&PathSegment::Slot(3)));
    }

    #[test]
    fn path_display() {
        let path = vec![PathSegment::property("a"), PathSegment::Index(0), PathSegment::Slot(1)];
        assert_eq!(PathDisplay(&path).to_string(), "a/0/<1>");
        assert_eq!(PathDisplay(&[]).to_string(), ".");
    }
}
