use std::fmt;

use super::error::MutationError;

/// A parsed `segment(/segment)*` path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath<'p> {
    segments: Vec<&'p str>,
}

impl<'p> FieldPath<'p> {
    pub fn parse(path: &'p str) -> Result<Self, MutationError> {
        if path.is_empty() {
            return Err(MutationError::EmptyPath);
        }
        let segments: Vec<&'p str> = path.split('/').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(MutationError::InvalidPathSegment {
                segment: String::new(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[&'p str] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
