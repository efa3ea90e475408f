#![allow(dead_code)]

use pagecraft_session::{ContentContext, SessionConfig};
use pagecraft_store::{MemoryGateway, PersistenceGateway, StoreConfig};
use pagecraft_types::{ContentKey, StoredRow};
use std::sync::Arc;

pub const HOME_TITLE: &str = "Nigeria's Premier Trenchless & Pipeline Contractor";

/// Routes engine logs to the test output; set `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn hero_title() -> ContentKey {
    ContentKey::new("home", "hero", "title")
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

/// A context over `gateway` with default configuration.
pub fn context(gateway: &Arc<MemoryGateway>) -> ContentContext {
    init_tracing();
    ContentContext::build(
        Arc::clone(gateway) as Arc<dyn PersistenceGateway>,
        StoreConfig::default(),
        SessionConfig::default(),
    )
}

/// A context already in edit mode.
pub fn editing_context(gateway: &Arc<MemoryGateway>) -> ContentContext {
    let ctx = context(gateway);
    ctx.session().enter_edit_mode().unwrap();
    ctx
}
