//! Verification codes that tie a chat identity to an OAuth callback.
//!
//! The OAuth redirect handler receives an authorization grant but has no
//! idea which chat user it belongs to. It [`issue`](LinkStore::issue)s a
//! random code for the grant and shows it to the user, who sends
//! `verify <code>` to the bot. The bot [`redeem`](LinkStore::redeem)s the
//! code exactly once, before it expires.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

pub trait LinkStore: Send + Sync {
    /// Store `grant` and return the code the user must send back.
    fn issue(&self, grant: String, now: DateTime<Utc>) -> String;

    /// Take the grant for `code`. `None` if unknown, already used or expired.
    fn redeem(&self, code: &str, now: DateTime<Utc>) -> Option<String>;

    /// Drop expired entries, returning how many were removed. `issue` calls
    /// this, so codes nobody redeems do not accumulate.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}

#[derive(Debug, Clone)]
struct PendingLink {
    grant: String,
    expires_at: DateTime<Utc>,
}

/// Process-local [`LinkStore`].
#[derive(Clone)]
pub struct InMemoryLinkStore {
    pending: Arc<DashMap<String, PendingLink>>,
    ttl: Duration,
}

impl InMemoryLinkStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl LinkStore for InMemoryLinkStore {
    fn issue(&self, grant: String, now: DateTime<Utc>) -> String {
        let evicted = self.purge_expired(now);
        if evicted > 0 {
            debug!(evicted, "evicted abandoned verification codes");
        }
        let code = Uuid::new_v4().simple().to_string();
        self.pending.insert(
            code.clone(),
            PendingLink {
                grant,
                expires_at: now + self.ttl,
            },
        );
        debug!(pending = self.pending.len(), "issued verification code");
        code
    }

    fn redeem(&self, code: &str, now: DateTime<Utc>) -> Option<String> {
        let (_, link) = self.pending.remove(code)?;
        (now < link.expires_at).then_some(link.grant)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, link| now < link.expires_at);
        before - self.pending.len()
    }
}
