//! Composition root handed to every field binding.

use crate::auth::Authorizer;
use crate::config::SessionConfig;
use crate::error::SessionResult;
use crate::resolver::{Resolution, Resolver};
use crate::session::EditSession;
use pagecraft_store::{ContentStoreClient, PersistenceGateway, StoreConfig};
use pagecraft_types::{ContentKey, ContentValue};
use std::sync::Arc;

/// The store and the session a page renders against.
#[derive(Clone)]
pub struct ContentContext {
    store: Arc<ContentStoreClient>,
    session: Arc<EditSession>,
}

impl ContentContext {
    pub fn new(store: Arc<ContentStoreClient>, session: Arc<EditSession>) -> Self {
        Self { store, session }
    }

    /// Wires a store client and an open session around one gateway.
    pub fn build(
        gateway: Arc<dyn PersistenceGateway>,
        store_config: StoreConfig,
        session_config: SessionConfig,
    ) -> Self {
        let store = Arc::new(ContentStoreClient::new(Arc::clone(&gateway), store_config));
        let session = Arc::new(EditSession::new(gateway, Arc::clone(&store), session_config));
        Self::new(store, session)
    }

    /// Like [`ContentContext::build`], with edit mode gated by `authorizer`.
    pub fn build_with_authorizer(
        gateway: Arc<dyn PersistenceGateway>,
        store_config: StoreConfig,
        session_config: SessionConfig,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let store = Arc::new(ContentStoreClient::new(Arc::clone(&gateway), store_config));
        let session = Arc::new(EditSession::with_authorizer(
            gateway,
            Arc::clone(&store),
            session_config,
            authorizer,
        ));
        Self::new(store, session)
    }

    pub fn store(&self) -> &Arc<ContentStoreClient> {
        &self.store
    }

    pub fn session(&self) -> &Arc<EditSession> {
        &self.session
    }

    pub fn is_edit_mode(&self) -> bool {
        self.session.is_edit_mode()
    }

    pub fn resolve(&self, key: &ContentKey, default: ContentValue) -> ContentValue {
        self.resolve_with_source(key, default).value
    }

    /// Resolves against the page's cached tree and, while editing, the
    /// pending buffer.
    pub fn resolve_with_source(&self, key: &ContentKey, default: ContentValue) -> Resolution {
        let tree = self.store.tree(&key.page_slug);
        let pending = self.session.pending();
        Resolver::new(&tree)
            .with_pending(pending.as_deref())
            .resolve_with_source(key, default)
    }

    pub fn stage(&self, key: ContentKey, value: ContentValue) -> SessionResult<()> {
        self.session.stage(key, value)
    }
}
