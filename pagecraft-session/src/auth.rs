//! Edit-mode authorization.
//!
//! Login and roles live in the admin shell. The session only asks one
//! question before entering edit mode.

use std::sync::atomic::{AtomicBool, Ordering};

/// Decides whether the current user may enter edit mode.
pub trait Authorizer: Send + Sync {
    fn can_edit(&self) -> bool;
}

/// Lets everyone edit. Suitable for local previews and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn can_edit(&self) -> bool {
        true
    }
}

/// Lets no one edit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn can_edit(&self) -> bool {
        false
    }
}

/// A switch the admin shell flips on login and logout.
#[derive(Debug, Default)]
pub struct StaticAuthorizer {
    allowed: AtomicBool,
}

impl StaticAuthorizer {
    pub fn new(allowed: bool) -> Self {
        Self {
            allowed: AtomicBool::new(allowed),
        }
    }

    pub fn set(&self, allowed: bool) {
        self.allowed.store(allowed, Ordering::SeqCst);
    }
}

impl Authorizer for StaticAuthorizer {
    fn can_edit(&self) -> bool {
        self.allowed.load(Ordering::SeqCst)
    }
}
