//! End-to-end flows over an in-memory gateway.

mod common;

use common::{context, hero_title, HOME_TITLE};
use pagecraft_session::{ContentContext, SessionPhase, Source, TextBinding};
use pagecraft_store::MemoryGateway;
use pagecraft_types::ContentValue;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn resolve_title(ctx: &ContentContext) -> ContentValue {
    ctx.resolve(&hero_title(), ContentValue::text(HOME_TITLE))
}

#[tokio::test]
async fn edit_discard_edit_commit() {
    let gateway = Arc::new(MemoryGateway::new());
    let ctx = context(&gateway);
    ctx.store().fetch("home").await;

    assert_eq!(resolve_title(&ctx), ContentValue::text(HOME_TITLE));

    // First attempt is abandoned.
    ctx.session().enter_edit_mode().unwrap();
    ctx.stage(hero_title(), ContentValue::text("New Headline")).unwrap();
    assert_eq!(resolve_title(&ctx), ContentValue::text("New Headline"));
    ctx.session().exit_edit_mode();
    assert_eq!(resolve_title(&ctx), ContentValue::text(HOME_TITLE));

    // Second attempt is saved.
    ctx.session().enter_edit_mode().unwrap();
    ctx.stage(hero_title(), ContentValue::text("New Headline")).unwrap();
    let report = ctx.session().commit_all().await.unwrap();
    assert_eq!(report.committed, 1);
    assert_eq!(report.pages, vec!["home".to_string()]);
    assert!(ctx.store().status("home").is_stale);

    let page = ctx.store().ensure("home").await;
    assert_eq!(
        page.tree.get("hero", "title"),
        Some(&ContentValue::text("New Headline"))
    );
    assert_eq!(gateway.fetch_calls(), 2);

    ctx.session().exit_edit_mode();
    assert_eq!(ctx.session().phase(), SessionPhase::Viewing);
    assert_eq!(resolve_title(&ctx), ContentValue::text("New Headline"));
}

#[tokio::test]
async fn mounted_page_rerenders_after_commit() {
    let gateway = Arc::new(MemoryGateway::new());
    let ctx = context(&gateway);
    let title = TextBinding::new(hero_title(), HOME_TITLE);
    let mount = ctx.store().mount("home");

    mount.load().await;
    assert_eq!(title.render(&ctx).source, Source::Default);

    ctx.session().enter_edit_mode().unwrap();
    title.input(&ctx, "Trenchless Experts").unwrap();
    assert_eq!(title.render(&ctx).source, Source::Pending);

    ctx.session().commit_all().await.unwrap();
    // Still editing with an empty buffer; the stale tree is still served.
    assert_eq!(title.render(&ctx).source, Source::Default);

    let page = mount.load().await;
    assert!(page.error.is_none());
    let rendered = title.render(&ctx);
    assert_eq!(rendered.value, "Trenchless Experts");
    assert_eq!(rendered.source, Source::Stored);
    assert!(rendered.editable);
}

#[tokio::test]
async fn failed_commit_can_be_retried_after_fix() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.reject(hero_title(), "row locked");
    let ctx = context(&gateway);
    let title = TextBinding::new(hero_title(), HOME_TITLE);

    ctx.session().enter_edit_mode().unwrap();
    title.input(&ctx, "Retry Me").unwrap();
    assert!(ctx.session().commit_all().await.is_err());

    // The edit is still visible and still pending.
    assert_eq!(title.render(&ctx).value, "Retry Me");
    assert!(ctx.session().last_commit_failure().is_some());

    gateway.accept(&hero_title());
    ctx.session().commit_all().await.unwrap();
    ctx.store().ensure("home").await;
    ctx.session().exit_edit_mode();

    assert_eq!(title.render(&ctx).value, "Retry Me");
}
