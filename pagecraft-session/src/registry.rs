//! Optional check of declared fields against stored content.
//!
//! Call sites declare keys without any central schema, so a typo in a key
//! silently leaves an override unused. Declaring a page's bindings here and
//! auditing the fetched tree surfaces those mismatches.

use pagecraft_types::{ContentKey, ContentTree, ValueKind};
use std::collections::BTreeMap;
use tracing::warn;

/// A stored field that does not line up with the declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryIssue {
    /// Stored, but no binding declares it. Usually a renamed field or a typo.
    Undeclared { key: ContentKey, stored: ValueKind },
    /// Declared with a different kind than the one stored.
    KindMismatch {
        key: ContentKey,
        declared: ValueKind,
        stored: ValueKind,
    },
}

/// Declared `(key, kind)` pairs.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    declared: BTreeMap<ContentKey, ValueKind>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field. Returns the previously declared kind, if any.
    pub fn declare(&mut self, key: ContentKey, kind: ValueKind) -> Option<ValueKind> {
        let previous = self.declared.insert(key.clone(), kind);
        if let Some(previous) = previous.filter(|p| *p != kind) {
            warn!(%key, %previous, %kind, "field declared twice with different kinds");
        }
        previous
    }

    pub fn kind_of(&self, key: &ContentKey) -> Option<ValueKind> {
        self.declared.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Compares one page's stored fields with the declarations. A stored
    /// Json field also counts as declared when some declared key is a
    /// dotted path into it.
    pub fn audit(&self, page_slug: &str, tree: &ContentTree) -> Vec<RegistryIssue> {
        let mut issues = Vec::new();
        for (section, field, value) in tree.entries() {
            let key = ContentKey::new(page_slug, section, field);
            let stored = value.kind();
            match self.kind_of(&key) {
                Some(declared) if !declared.accepts(stored) => {
                    issues.push(RegistryIssue::KindMismatch {
                        key,
                        declared,
                        stored,
                    });
                }
                Some(_) => {}
                None if stored == ValueKind::Json && self.has_path_into(&key) => {}
                None => issues.push(RegistryIssue::Undeclared { key, stored }),
            }
        }
        issues
    }

    fn has_path_into(&self, base: &ContentKey) -> bool {
        self.declared
            .keys()
            .any(|declared| declared.base_key().as_ref() == Some(base))
    }
}
