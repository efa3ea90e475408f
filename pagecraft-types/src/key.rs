//! Content addressing.
//!
//! Every overridable value on the site is addressed by a
//! `(page_slug, section_key, field)` triple. Call sites declare their keys
//! inline; there is no central schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unique address of one overridable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentKey {
    /// The page, e.g. `"home"` or `"cap-hdd"`.
    pub page_slug: String,
    /// A named region within the page, e.g. `"hero"`.
    pub section_key: String,
    /// The leaf property within the section. May be a dotted path into a
    /// stored list, see [`FieldPath`].
    pub field: String,
}

impl ContentKey {
    /// Creates a key. Use [`ContentKey::validate`] before persisting it.
    pub fn new(
        page_slug: impl Into<String>,
        section_key: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            page_slug: page_slug.into(),
            section_key: section_key.into(),
            field: field.into(),
        }
    }

    /// Checks that every part of the key is non-empty.
    pub fn validate(&self) -> crate::Result<()> {
        let parts = [
            ("page_slug", &self.page_slug),
            ("section_key", &self.section_key),
            ("field", &self.field),
        ];
        for (name, part) in parts {
            if part.trim().is_empty() {
                return Err(crate::Error::InvalidKey(format!("{name} is empty in {self}")));
            }
        }
        Ok(())
    }

    /// Parses the `field` part into a [`FieldPath`].
    pub fn path(&self) -> FieldPath {
        FieldPath::parse(&self.field)
    }

    /// Returns the key of the base field when `field` is a dotted path,
    /// or `None` for a flat field.
    pub fn base_key(&self) -> Option<ContentKey> {
        let path = self.path();
        if path.is_flat() {
            return None;
        }
        Some(ContentKey::new(
            self.page_slug.clone(),
            self.section_key.clone(),
            path.base,
        ))
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.page_slug, self.section_key, self.field)
    }
}

/// One step below the base field of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Array position, e.g. the `2` in `client_logos.2.imageUrl`.
    Index(usize),
    /// Object member, e.g. `imageUrl`.
    Key(String),
}

/// A field name split on `.`.
///
/// `"client_logos.2.imageUrl"` has base `client_logos` and segments
/// `[Index(2), Key("imageUrl")]`. A flat name like `"step_0_title"` has no
/// segments; underscores are part of the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub base: String,
    pub segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parses a field string. Empty segments (`"a..b"`) are ignored.
    pub fn parse(field: &str) -> Self {
        let mut parts = field.split('.').filter(|p| !p.is_empty());
        let base = parts.next().unwrap_or_default().to_string();
        let segments = parts
            .map(|p| match p.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(p.to_string()),
            })
            .collect();
        Self { base, segments }
    }

    /// True when the field has no path below its base.
    pub fn is_flat(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walks `root` along the segments. Returns `None` as soon as a step
    /// does not exist.
    pub fn walk<'a>(&self, root: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        self.segments.iter().try_fold(root, |node, segment| match segment {
            PathSegment::Index(i) => node.get(*i),
            PathSegment::Key(k) => node.get(k.as_str()),
        })
    }
}
