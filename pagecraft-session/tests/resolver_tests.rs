use pagecraft_session::{Resolver, Source};
use pagecraft_types::{ContentKey, ContentTree, ContentValue, PendingBuffer, PendingChange};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn key() -> ContentKey {
    ContentKey::new("home", "hero", "title")
}

fn tree_with(value: ContentValue) -> ContentTree {
    let mut tree = ContentTree::new();
    tree.insert(&key(), value);
    tree
}

fn pending_with(value: ContentValue) -> PendingBuffer {
    let mut pending = PendingBuffer::new();
    pending.stage(PendingChange::new(key(), value));
    pending
}

// ── Precedence ───────────────────────────────────────────────────

#[test]
fn default_when_nothing_stored() {
    let tree = ContentTree::new();
    let resolved = Resolver::new(&tree).resolve_with_source(&key(), ContentValue::text("Default"));
    assert_eq!(resolved.value, ContentValue::text("Default"));
    assert_eq!(resolved.source, Source::Default);
}

#[test]
fn stored_beats_default() {
    let tree = tree_with(ContentValue::text("Stored"));
    let resolved = Resolver::new(&tree).resolve_with_source(&key(), ContentValue::text("Default"));
    assert_eq!(resolved.value, ContentValue::text("Stored"));
    assert_eq!(resolved.source, Source::Stored);
}

#[test]
fn pending_beats_stored() {
    let tree = tree_with(ContentValue::text("Stored"));
    let pending = pending_with(ContentValue::text("Pending"));
    let resolved = Resolver::new(&tree)
        .with_pending(Some(&pending))
        .resolve_with_source(&key(), ContentValue::text("Default"));
    assert_eq!(resolved.value, ContentValue::text("Pending"));
    assert_eq!(resolved.source, Source::Pending);
}

#[test]
fn pending_ignored_without_edit_mode() {
    let tree = tree_with(ContentValue::text("Stored"));
    let resolved = Resolver::new(&tree)
        .with_pending(None)
        .resolve(&key(), ContentValue::text("Default"));
    assert_eq!(resolved, ContentValue::text("Stored"));
}

// ── Empty and mismatched overrides ───────────────────────────────

#[test]
fn empty_string_falls_back_to_default() {
    let tree = tree_with(ContentValue::text(""));
    let resolved = Resolver::new(&tree).resolve(&key(), ContentValue::text("Default"));
    assert_eq!(resolved, ContentValue::text("Default"));
}

#[test]
fn empty_list_falls_back_to_default() {
    let tree = tree_with(ContentValue::Json(json!([])));
    let default = ContentValue::Json(json!([{"title": "Survey"}]));
    let resolved = Resolver::new(&tree).resolve(&key(), default.clone());
    assert_eq!(resolved, default);
}

#[test]
fn empty_pending_falls_through_to_stored() {
    let tree = tree_with(ContentValue::text("Stored"));
    let pending = pending_with(ContentValue::text(""));
    let resolved = Resolver::new(&tree)
        .with_pending(Some(&pending))
        .resolve(&key(), ContentValue::text("Default"));
    assert_eq!(resolved, ContentValue::text("Stored"));
}

#[test]
fn json_where_text_expected_is_ignored() {
    let tree = tree_with(ContentValue::Json(json!({"title": "raw"})));
    let resolved = Resolver::new(&tree).resolve(&key(), ContentValue::text("Default"));
    assert_eq!(resolved, ContentValue::text("Default"));
}

#[test]
fn text_where_image_expected_is_ignored() {
    let tree = tree_with(ContentValue::text("/img/a.png"));
    let resolved = Resolver::new(&tree).resolve(&key(), ContentValue::image("/img/default.png"));
    assert_eq!(resolved, ContentValue::image("/img/default.png"));
}

#[test]
fn mismatched_pending_falls_through_to_stored() {
    let tree = tree_with(ContentValue::image("/stored.png"));
    let pending = pending_with(ContentValue::text("not an image"));
    let resolved = Resolver::new(&tree)
        .with_pending(Some(&pending))
        .resolve(&key(), ContentValue::image("/default.png"));
    assert_eq!(resolved, ContentValue::image("/stored.png"));
}

#[test]
fn rich_text_renders_where_text_expected() {
    let tree = tree_with(ContentValue::rich_text("<b>Bold</b>"));
    let resolved = Resolver::new(&tree).resolve(&key(), ContentValue::text("Default"));
    assert_eq!(resolved, ContentValue::rich_text("<b>Bold</b>"));
}

// ── Dotted fields ────────────────────────────────────────────────

#[test]
fn dotted_field_prefers_pending_list() {
    let logos = ContentKey::new("home", "trust_block", "client_logos");
    let item = ContentKey::new("home", "trust_block", "client_logos.0.imageUrl");

    let mut tree = ContentTree::new();
    tree.insert(&logos, ContentValue::Json(json!([{"imageUrl": "/stored.png"}])));
    let mut pending = PendingBuffer::new();
    pending.stage(PendingChange::new(
        logos,
        ContentValue::Json(json!([{"imageUrl": "/pending.png"}])),
    ));

    let resolver = Resolver::new(&tree);
    assert_eq!(
        resolver.resolve(&item, ContentValue::image("/d.png")),
        ContentValue::image("/stored.png")
    );
    assert_eq!(
        resolver
            .with_pending(Some(&pending))
            .resolve(&item, ContentValue::image("/d.png")),
        ContentValue::image("/pending.png")
    );
}

#[test]
fn exact_entry_wins_over_dotted_lookup() {
    let item = ContentKey::new("home", "trust_block", "client_logos.0.imageUrl");
    let mut tree = ContentTree::new();
    tree.insert(
        &ContentKey::new("home", "trust_block", "client_logos"),
        ContentValue::Json(json!([{"imageUrl": "/from-list.png"}])),
    );
    tree.insert(&item, ContentValue::image("/exact.png"));

    let resolved = Resolver::new(&tree).resolve(&item, ContentValue::image("/d.png"));
    assert_eq!(resolved, ContentValue::image("/exact.png"));
}

// ── Properties ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Tag {
    Text,
    Image,
    Json,
}

fn tag_strategy() -> impl Strategy<Value = Tag> {
    prop_oneof![Just(Tag::Text), Just(Tag::Image), Just(Tag::Json)]
}

fn make(tag: Tag, s: &str) -> ContentValue {
    match tag {
        Tag::Text => ContentValue::text(s),
        Tag::Image => ContentValue::image(s),
        Tag::Json => {
            if s.is_empty() {
                ContentValue::Json(json!([]))
            } else {
                ContentValue::Json(json!([s]))
            }
        }
    }
}

fn payload() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{0,8}").unwrap()
}

proptest! {
    /// Pending (when editing) beats non-empty stored, which beats default,
    /// for every value tag.
    #[test]
    fn precedence_holds_for_all_tags(
        tag in tag_strategy(),
        default in "[a-z]{1,8}",
        stored in prop::option::of(payload()),
        pending in prop::option::of(payload()),
        editing in any::<bool>(),
    ) {
        let default_value = make(tag, &default);

        let mut tree = ContentTree::new();
        if let Some(s) = &stored {
            tree.insert(&key(), make(tag, s));
        }
        let mut buffer = PendingBuffer::new();
        if let Some(p) = &pending {
            buffer.stage(PendingChange::new(key(), make(tag, p)));
        }

        let resolved = Resolver::new(&tree)
            .with_pending(editing.then_some(&buffer))
            .resolve_with_source(&key(), default_value.clone());

        let pending_value = pending.as_deref().filter(|p| editing && !p.is_empty());
        let stored_value = stored.as_deref().filter(|s| !s.is_empty());

        if let Some(p) = pending_value {
            prop_assert_eq!(resolved.value, make(tag, p));
            prop_assert_eq!(resolved.source, Source::Pending);
        } else if let Some(s) = stored_value {
            prop_assert_eq!(resolved.value, make(tag, s));
            prop_assert_eq!(resolved.source, Source::Stored);
        } else {
            prop_assert_eq!(resolved.value, default_value);
            prop_assert_eq!(resolved.source, Source::Default);
        }
    }
}
