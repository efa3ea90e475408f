//! Content resolution.
//!
//! Precedence, highest first: the pending change (only passed in while
//! editing), the stored override, the call site's default. A candidate that
//! is empty or of the wrong kind does not count.

use pagecraft_types::{ContentKey, ContentTree, ContentValue, PendingBuffer, ValueKind};
use tracing::{debug, warn};

/// Which layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pending,
    Stored,
    Default,
}

/// A resolved value and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: ContentValue,
    pub source: Source,
}

trait Layer {
    const SOURCE: Source;

    fn lookup(&self, key: &ContentKey) -> Option<&ContentValue>;
}

impl Layer for ContentTree {
    const SOURCE: Source = Source::Stored;

    fn lookup(&self, key: &ContentKey) -> Option<&ContentValue> {
        self.get_key(key)
    }
}

impl Layer for PendingBuffer {
    const SOURCE: Source = Source::Pending;

    fn lookup(&self, key: &ContentKey) -> Option<&ContentValue> {
        self.get(key)
    }
}

/// Resolves values against one page's tree and, while editing, the
/// pending buffer.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    tree: &'a ContentTree,
    pending: Option<&'a PendingBuffer>,
}

impl<'a> Resolver<'a> {
    pub fn new(tree: &'a ContentTree) -> Self {
        Self {
            tree,
            pending: None,
        }
    }

    /// Adds the pending layer. Pass `None` outside edit mode.
    #[must_use]
    pub fn with_pending(mut self, pending: Option<&'a PendingBuffer>) -> Self {
        self.pending = pending;
        self
    }

    /// The value to render for `key`. Never fails; the worst case is
    /// `default`. The expected kind is the kind of `default`.
    pub fn resolve(&self, key: &ContentKey, default: ContentValue) -> ContentValue {
        self.resolve_with_source(key, default).value
    }

    pub fn resolve_with_source(&self, key: &ContentKey, default: ContentValue) -> Resolution {
        let expected = default.kind();

        if let Some(pending) = self.pending {
            if let Some(value) = candidate(pending, key, expected) {
                return Resolution {
                    value,
                    source: Source::Pending,
                };
            }
        }

        if let Some(value) = candidate(self.tree, key, expected) {
            return Resolution {
                value,
                source: Source::Stored,
            };
        }

        Resolution {
            value: default,
            source: Source::Default,
        }
    }
}

/// The usable value a layer holds for `key`: the exact entry, or for a
/// dotted field the leaf inside the base field's Json.
fn candidate<L: Layer>(layer: &L, key: &ContentKey, expected: ValueKind) -> Option<ContentValue> {
    if let Some(value) = layer.lookup(key) {
        if usable(value, key, expected, L::SOURCE) {
            return Some(value.clone());
        }
    }

    let base = key.base_key()?;
    let root = layer.lookup(&base)?.as_json()?;
    let leaf = key.path().walk(root)?;
    let Some(value) = ContentValue::from_json_leaf(expected, leaf) else {
        warn!(%key, %expected, layer = ?L::SOURCE, "list item has the wrong shape, ignoring");
        return None;
    };
    usable(&value, key, expected, L::SOURCE).then_some(value)
}

fn usable(value: &ContentValue, key: &ContentKey, expected: ValueKind, source: Source) -> bool {
    if !expected.accepts(value.kind()) {
        warn!(
            %key,
            %expected,
            found = %value.kind(),
            layer = ?source,
            "override type mismatch, ignoring"
        );
        return false;
    }
    if value.is_empty() {
        debug!(%key, layer = ?source, "empty override, falling through");
        return false;
    }
    true
}
