use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Login state shared by everything that talks to the backend.
///
/// Cloning is cheap and every clone sees the same state. Once a write comes
/// back unauthorized the session is marked expired and stays that way until
/// [`SessionContext::renew`] is called by whoever owns the login flow.
#[derive(Debug, Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    user_id: Option<String>,
    token: RwLock<Option<String>>,
    expired: AtomicBool,
}

impl SessionContext {
    pub fn new(user_id: Option<String>, token: Option<String>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                user_id,
                token: RwLock::new(token),
                expired: AtomicBool::new(false),
            }),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None, None)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.inner.user_id.as_deref()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_expired(&self) -> bool {
        self.inner.expired.load(Ordering::SeqCst)
    }

    pub fn expire(&self) {
        if !self.inner.expired.swap(true, Ordering::SeqCst) {
            tracing::warn!(
                "Session expired for user {}",
                self.user_id().unwrap_or("<anonymous>")
            );
        }
    }

    /// Install a fresh token and allow writes again.
    pub fn renew(&self, token: impl Into<String>) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.into());
        self.inner.expired.store(false, Ordering::SeqCst);
        tracing::info!("Session renewed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_expiry() {
        let session = SessionContext::new(Some("u-1".into()), Some("t".into()));
        let other = session.clone();
        assert!(!other.is_expired());
        session.expire();
        assert!(other.is_expired());
        assert_eq!(other.user_id(), Some("u-1"));
    }

    #[test]
    fn renew_replaces_token_and_clears_expiry() {
        let session = SessionContext::anonymous();
        assert_eq!(session.token(), None);
        session.expire();
        session.renew("fresh");
        assert!(!session.is_expired());
        assert_eq!(session.token().as_deref(), Some("fresh"));
    }
}
