//! The per-page read model.

use crate::{ContentKey, ContentValue, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Field name → value, for one section.
pub type SectionMap = BTreeMap<String, ContentValue>;

/// All stored overrides of one page, as `section → field → value`.
///
/// Built fresh on every fetch. Consumers receive it behind an `Arc` and
/// never mutate it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTree {
    sections: BTreeMap<String, SectionMap>,
}

impl ContentTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from stored rows.
    ///
    /// Rows with an unknown content type or a malformed Json payload are
    /// skipped with a warning. When two rows share a key the later one wins.
    pub fn from_rows(rows: impl IntoIterator<Item = StoredRow>) -> Self {
        let mut tree = Self::new();
        for row in rows {
            match row.to_field() {
                Ok(field) => {
                    tree.insert(&field.key, field.value);
                }
                Err(e) => {
                    warn!(
                        page = %row.page_slug,
                        section = %row.section_key,
                        field = %row.field_key,
                        "skipping stored row: {e}"
                    );
                }
            }
        }
        tree
    }

    /// Looks up a value by section and field.
    pub fn get(&self, section_key: &str, field: &str) -> Option<&ContentValue> {
        self.sections.get(section_key)?.get(field)
    }

    /// Looks up a value by key. The page part of the key is not checked;
    /// a tree only ever holds one page.
    pub fn get_key(&self, key: &ContentKey) -> Option<&ContentValue> {
        self.get(&key.section_key, &key.field)
    }

    /// Returns one section's fields.
    pub fn section(&self, section_key: &str) -> Option<&SectionMap> {
        self.sections.get(section_key)
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn insert(&mut self, key: &ContentKey, value: ContentValue) -> Option<ContentValue> {
        self.sections
            .entry(key.section_key.clone())
            .or_default()
            .insert(key.field.clone(), value)
    }

    /// Section keys in sorted order.
    pub fn section_keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Every `(section, field, value)` triple in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &ContentValue)> {
        self.sections.iter().flat_map(|(section, fields)| {
            fields
                .iter()
                .map(move |(field, value)| (section.as_str(), field.as_str(), value))
        })
    }

    /// Number of stored fields across all sections.
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One stored override: a key and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentField {
    pub key: ContentKey,
    pub value: ContentValue,
}

impl ContentField {
    pub fn new(key: ContentKey, value: ContentValue) -> Self {
        Self { key, value }
    }
}

/// The flat row a gateway persists. Json payloads are stored as JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRow {
    pub page_slug: String,
    pub section_key: String,
    pub field_key: String,
    pub content_type: String,
    pub value: String,
}

impl StoredRow {
    /// Flattens a field into its stored row.
    pub fn from_field(field: &ContentField) -> Self {
        Self {
            page_slug: field.key.page_slug.clone(),
            section_key: field.key.section_key.clone(),
            field_key: field.key.field.clone(),
            content_type: field.value.kind().as_str().to_string(),
            value: field.value.to_stored(),
        }
    }

    /// Decodes the row back into a typed field.
    pub fn to_field(&self) -> crate::Result<ContentField> {
        let kind: ValueKind = self.content_type.parse()?;
        let value = ContentValue::from_stored(kind, &self.value)?;
        Ok(ContentField {
            key: ContentKey::new(&self.page_slug, &self.section_key, &self.field_key),
            value,
        })
    }
}
