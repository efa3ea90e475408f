#![allow(dead_code)]

use pagecraft_types::StoredRow;
use pagecraft_store::MemoryGateway;

pub const HOME_TITLE: &str = "Nigeria's Premier Trenchless & Pipeline Contractor";

/// Routes engine logs to the test output; set `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn row(page: &str, section: &str, field: &str, content_type: &str, value: &str) -> StoredRow {
    StoredRow {
        page_slug: page.into(),
        section_key: section.into(),
        field_key: field.into(),
        content_type: content_type.into(),
        value: value.into(),
    }
}

/// A gateway holding a few overrides for `home` and `cap-hdd`.
pub fn seeded_gateway() -> MemoryGateway {
    MemoryGateway::from_rows(vec![
        row("home", "hero", "title", "text", HOME_TITLE),
        row("home", "hero", "background", "image", "/img/hero.jpg"),
        row("home", "trust_block", "client_logos", "json", r#"[{"imageUrl":"/logos/a.png"}]"#),
        row("cap-hdd", "intro", "body", "richtext", "<p>Horizontal directional drilling</p>"),
    ])
}
