//! Field bindings: what page code actually calls.
//!
//! A binding is declared with a key and a default, renders through the
//! resolver, and in edit mode turns input into a staged change. Bindings
//! hold no state of their own.
//!
//! A binding never stages an input equal to what it currently renders, so
//! a blur without an edit leaves the buffer alone.

use crate::context::ContentContext;
use crate::error::{SessionError, SessionResult};
use crate::registry::FieldRegistry;
use crate::resolver::Source;
use pagecraft_types::{ContentKey, ContentValue, ValueKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Common surface of every binding.
pub trait FieldBinding {
    fn key(&self) -> &ContentKey;

    /// The kind this binding stages.
    fn kind(&self) -> ValueKind;

    /// Records this binding's field in `registry`.
    fn declare(&self, registry: &mut FieldRegistry) {
        registry.declare(self.key().clone(), self.kind());
    }
}

fn stage_if_changed(
    ctx: &ContentContext,
    key: &ContentKey,
    current: &ContentValue,
    next: ContentValue,
) -> SessionResult<bool> {
    if current == &next {
        debug!(%key, "input unchanged, nothing staged");
        return Ok(false);
    }
    ctx.stage(key.clone(), next)?;
    Ok(true)
}

// ── Text ─────────────────────────────────────────────────────────

/// Rendered output of a [`TextBinding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub value: String,
    /// Whether to render an inline-editable surface.
    pub editable: bool,
    pub source: Source,
}

/// A plain or multiline (rich) text field.
#[derive(Debug, Clone)]
pub struct TextBinding {
    key: ContentKey,
    default: String,
    multiline: bool,
}

impl TextBinding {
    pub fn new(key: ContentKey, default: impl Into<String>) -> Self {
        Self {
            key,
            default: default.into(),
            multiline: false,
        }
    }

    /// Enables multiline formatting; edits are staged as rich text.
    #[must_use]
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    fn wrap(&self, text: String) -> ContentValue {
        if self.multiline {
            ContentValue::RichText(text)
        } else {
            ContentValue::Text(text)
        }
    }

    pub fn render(&self, ctx: &ContentContext) -> RenderedText {
        let resolved = ctx.resolve_with_source(&self.key, self.wrap(self.default.clone()));
        let value = match resolved.value {
            ContentValue::Text(s) | ContentValue::RichText(s) => s,
            _ => self.default.clone(),
        };
        RenderedText {
            value,
            editable: ctx.is_edit_mode(),
            source: resolved.source,
        }
    }

    /// Handles blur/change of the editable surface. Returns whether a
    /// change was staged.
    pub fn input(&self, ctx: &ContentContext, text: &str) -> SessionResult<bool> {
        let current = self.wrap(self.render(ctx).value);
        stage_if_changed(ctx, &self.key, &current, self.wrap(text.to_string()))
    }
}

impl FieldBinding for TextBinding {
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn kind(&self) -> ValueKind {
        if self.multiline {
            ValueKind::RichText
        } else {
            ValueKind::Text
        }
    }
}

// ── Image ────────────────────────────────────────────────────────

/// What the external uploader hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Public URL of the stored file.
    pub url: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub url: String,
    pub editable: bool,
    pub source: Source,
}

/// An image field; the value is the image URL.
#[derive(Debug, Clone)]
pub struct ImageBinding {
    key: ContentKey,
    default_url: String,
}

impl ImageBinding {
    pub fn new(key: ContentKey, default_url: impl Into<String>) -> Self {
        Self {
            key,
            default_url: default_url.into(),
        }
    }

    pub fn render(&self, ctx: &ContentContext) -> RenderedImage {
        let resolved =
            ctx.resolve_with_source(&self.key, ContentValue::Image(self.default_url.clone()));
        let url = match resolved.value {
            ContentValue::Image(url) => url,
            _ => self.default_url.clone(),
        };
        RenderedImage {
            url,
            editable: ctx.is_edit_mode(),
            source: resolved.source,
        }
    }

    /// Points the field at a new URL. Returns whether a change was staged.
    pub fn replace(&self, ctx: &ContentContext, url: &str) -> SessionResult<bool> {
        let current = ContentValue::Image(self.render(ctx).url);
        stage_if_changed(ctx, &self.key, &current, ContentValue::image(url))
    }

    /// Stages the result of an upload.
    pub fn apply_upload(&self, ctx: &ContentContext, upload: &UploadedImage) -> SessionResult<bool> {
        debug!(key = %self.key, file = ?upload.file_name, "applying uploaded image");
        self.replace(ctx, &upload.url)
    }
}

impl FieldBinding for ImageBinding {
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Image
    }
}

// ── Repeater ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedList<T> {
    pub items: Vec<T>,
    pub editable: bool,
    pub source: Source,
}

/// A list of structured items (client logos, process steps, ...) stored as
/// one Json array.
///
/// Every edit stages the entire new array once; there are no item-level
/// patches. Removing the last item stages an empty list, which resolves back
/// to the defaults.
#[derive(Debug, Clone)]
pub struct RepeaterBinding<T> {
    key: ContentKey,
    default: Vec<T>,
}

impl<T> RepeaterBinding<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq,
{
    pub fn new(key: ContentKey, default: Vec<T>) -> Self {
        Self { key, default }
    }

    fn default_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.default).unwrap_or_else(|e| {
            warn!(key = %self.key, "default items do not serialize: {e}");
            serde_json::Value::Array(Vec::new())
        })
    }

    pub fn render(&self, ctx: &ContentContext) -> RenderedList<T> {
        let resolved = ctx.resolve_with_source(&self.key, ContentValue::Json(self.default_json()));
        let (items, source) = match resolved.value {
            ContentValue::Json(value) if resolved.source != Source::Default => {
                match serde_json::from_value::<Vec<T>>(value) {
                    Ok(items) => (items, resolved.source),
                    Err(e) => {
                        warn!(key = %self.key, "stored list does not match item shape, using defaults: {e}");
                        (self.default.clone(), Source::Default)
                    }
                }
            }
            _ => (self.default.clone(), Source::Default),
        };
        RenderedList {
            items,
            editable: ctx.is_edit_mode(),
            source,
        }
    }

    /// The items currently rendered.
    pub fn items(&self, ctx: &ContentContext) -> Vec<T> {
        self.render(ctx).items
    }

    /// Replaces the whole list. Returns whether a change was staged.
    pub fn replace_all(&self, ctx: &ContentContext, items: Vec<T>) -> SessionResult<bool> {
        let current = self.items(ctx);
        if current == items {
            debug!(key = %self.key, "list unchanged, nothing staged");
            return Ok(false);
        }
        let value = serde_json::to_value(&items)?;
        ctx.stage(self.key.clone(), ContentValue::Json(value))?;
        Ok(true)
    }

    /// Appends an item.
    pub fn add(&self, ctx: &ContentContext, item: T) -> SessionResult<bool> {
        let mut items = self.items(ctx);
        items.push(item);
        self.replace_all(ctx, items)
    }

    /// Removes the item at `index` and returns it.
    pub fn remove(&self, ctx: &ContentContext, index: usize) -> SessionResult<T> {
        let mut items = self.items(ctx);
        check_index(index, items.len())?;
        let removed = items.remove(index);
        self.replace_all(ctx, items)?;
        Ok(removed)
    }

    /// Replaces the item at `index`.
    pub fn update(&self, ctx: &ContentContext, index: usize, item: T) -> SessionResult<bool> {
        let mut items = self.items(ctx);
        check_index(index, items.len())?;
        items[index] = item;
        self.replace_all(ctx, items)
    }

    /// Moves the item at `from` so it ends up at `to`.
    pub fn move_item(&self, ctx: &ContentContext, from: usize, to: usize) -> SessionResult<bool> {
        let mut items = self.items(ctx);
        check_index(from, items.len())?;
        check_index(to, items.len())?;
        let item = items.remove(from);
        items.insert(to, item);
        self.replace_all(ctx, items)
    }
}

fn check_index(index: usize, len: usize) -> SessionResult<()> {
    if index >= len {
        return Err(SessionError::IndexOutOfRange { index, len });
    }
    Ok(())
}

impl<T> FieldBinding for RepeaterBinding<T> {
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Json
    }
}
