use immersion_models::{Identity, SyncStatus};
use std::time::{Duration, Instant};

/// Last sync status, which hides itself a while after finishing
#[derive(Debug, Clone)]
pub struct SyncIndicator {
    current: Option<(SyncStatus, Instant)>,
    clear_after: Duration,
}

impl SyncIndicator {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            current: None,
            clear_after,
        }
    }

    pub fn set(&mut self, status: SyncStatus) {
        self.current = Some((status, Instant::now()));
    }

    /// In-progress never expires; terminal states expire after `clear_after`
    pub fn status_at(&self, now: Instant) -> Option<SyncStatus> {
        let (status, since) = self.current?;
        if status.is_terminal() && now.saturating_duration_since(since) >= self.clear_after {
            return None;
        }
        Some(status)
    }

    pub fn status(&self) -> Option<SyncStatus> {
        self.status_at(Instant::now())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Who is signed in, plus their sync status
#[derive(Debug, Clone)]
pub struct Session {
    identity: Option<Identity>,
    indicator: SyncIndicator,
}

impl Session {
    pub fn new(status_clear_after: Duration) -> Self {
        Self {
            identity: None,
            indicator: SyncIndicator::new(status_clear_after),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns true when nobody (or a different user) was signed in before
    pub fn sign_in(&mut self, identity: Identity) -> bool {
        let transition = self
            .identity
            .as_ref()
            .map_or(true, |current| current.user_id != identity.user_id);
        self.identity = Some(identity);
        transition
    }

    /// Set the identity without counting as a sign-in (restored session, refreshed tokens)
    pub fn update_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
        self.indicator.clear();
    }

    pub fn indicator(&self) -> &SyncIndicator {
        &self.indicator
    }

    pub fn set_status(&mut self, status: SyncStatus) {
        self.indicator.set(status);
    }
}
