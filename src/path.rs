//! Declared header paths and suffix matching against header-tree leaves.
//!
//! A record field declares the labels of the header cells above its column, joined by
//! [`PATH_SEPARATOR`] (`"字段|字段1"`). The declaration only has to name the trailing
//! segments of the leaf's full path, so `"b|c"` binds to a leaf whose path is `a|b|c`.

use std::fmt;

pub const PATH_SEPARATOR: &str = "|";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredPath(Vec<String>);

impl DeclaredPath {
    pub fn parse(tag: &str) -> Self {
        Self(tag.split(PATH_SEPARATOR).map(str::to_string).collect())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, leaf_path: &[String]) -> bool {
        suffix_matches(&self.0, leaf_path)
    }
}

impl fmt::Display for DeclaredPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(PATH_SEPARATOR))
    }
}

impl From<&str> for DeclaredPath {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

/// True when `leaf_path` ends with exactly the segments of `declared`.
pub fn suffix_matches<S: AsRef<str>>(declared: &[S], leaf_path: &[String]) -> bool {
    if declared.len() > leaf_path.len() {
        return false;
    }
    let tail = &leaf_path[leaf_path.len() - declared.len()..];
    tail.iter()
        .zip(declared)
        .all(|(leaf, wanted)| leaf == wanted.as_ref())
}
