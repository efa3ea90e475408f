//! Live content overrides for Pagecraft pages.
//!
//! Every piece of page copy, every image and every repeated list on the site
//! is declared at its call site with a hard-coded default and a
//! `(page, section, field)` key. This crate decides what actually renders
//! and lets an administrator change it in place.
//!
//! # Components
//!
//! - **Resolver**: picks the rendered value from pending edit, stored
//!   override, or default, in that order
//! - **Session**: the edit-mode state machine and the pending change buffer,
//!   committed to the gateway as one batch
//! - **Bindings**: text, image and repeater fields that render through the
//!   resolver and stage edits through the session
//! - **Registry**: optional check of declared fields against stored ones
//!
//! # Example
//!
//! ```
//! use pagecraft_session::{ContentContext, SessionConfig, TextBinding};
//! use pagecraft_store::{MemoryGateway, StoreConfig};
//! use pagecraft_types::ContentKey;
//! use std::sync::Arc;
//!
//! let ctx = ContentContext::build(
//!     Arc::new(MemoryGateway::new()),
//!     StoreConfig::default(),
//!     SessionConfig::default(),
//! );
//! let title = TextBinding::new(ContentKey::new("home", "hero", "title"), "Welcome");
//!
//! assert_eq!(title.render(&ctx).value, "Welcome");
//!
//! ctx.session().enter_edit_mode().unwrap();
//! title.input(&ctx, "New Headline").unwrap();
//! assert_eq!(title.render(&ctx).value, "New Headline");
//! ```

mod auth;
mod binding;
mod config;
mod context;
mod error;
mod registry;
mod resolver;
mod session;

pub use auth::{AllowAll, Authorizer, DenyAll, StaticAuthorizer};
pub use binding::{
    FieldBinding, ImageBinding, RenderedImage, RenderedList, RenderedText, RepeaterBinding,
    TextBinding, UploadedImage,
};
pub use config::SessionConfig;
pub use context::ContentContext;
pub use error::{SessionError, SessionResult};
pub use registry::{FieldRegistry, RegistryIssue};
pub use resolver::{Resolution, Resolver, Source};
pub use session::{CommitFailure, CommitReport, EditSession, SessionPhase};
