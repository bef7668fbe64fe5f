use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::models::user::User;

#[derive(Debug, Default)]
struct HintState {
    hinted: bool,
    profile: Option<User>,
}

/// Client-held hint that a session cookie is present. Not an authorization
/// decision; the server re-validates every request.
#[derive(Debug, Clone, Default)]
pub struct SessionHint {
    inner: Arc<RwLock<HintState>>,
}

impl SessionHint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_from_cookie_presence(&self, present: bool) {
        self.write().hinted = present;
        debug!(present, "session hint set from cookie presence");
    }

    pub fn mark_authenticated(&self, profile: User) {
        let mut state = self.write();
        state.hinted = true;
        state.profile = Some(profile);
    }

    pub fn store_profile(&self, profile: User) {
        self.write().profile = Some(profile);
    }

    pub fn is_hinted(&self) -> bool {
        self.read().hinted
    }

    pub fn profile(&self) -> Option<User> {
        self.read().profile.clone()
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.hinted = false;
        state.profile = None;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HintState> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HintState> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Role, User};

    fn profile() -> User {
        User {
            id: "u1".to_string(),
            name: "Asha Rahman".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            role: Role::User,
            status: None,
        }
    }

    #[test]
    fn starts_unhinted() {
        let hint = SessionHint::new();
        assert!(!hint.is_hinted());
        assert!(hint.profile().is_none());
    }

    #[test]
    fn clear_drops_hint_and_profile() {
        let hint = SessionHint::new();
        hint.mark_authenticated(profile());
        assert!(hint.is_hinted());

        hint.clear();
        assert!(!hint.is_hinted());
        assert!(hint.profile().is_none());
    }

    #[test]
    fn cookie_presence_sets_hint_without_profile() {
        let hint = SessionHint::new();
        hint.set_from_cookie_presence(true);
        assert!(hint.is_hinted());
        assert!(hint.profile().is_none());
    }
}
