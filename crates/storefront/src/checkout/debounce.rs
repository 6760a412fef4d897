//! Debounced customer lookups.
//!
//! Every keystroke in the checkout email field may reach the server. Each
//! call waits for the quiet interval and then runs only if no newer call for
//! the same key arrived meanwhile. Superseded calls return `None` without
//! running their action.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default quiet interval before a lookup fires.
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(500);

/// Schedules actions per key, keeping only the latest one.
#[derive(Debug, Clone)]
pub struct LookupDebouncer {
    quiet: Duration,
    inner: Arc<Mutex<Pending>>,
}

/// Latest ticket per key, plus the ticket counter.
#[derive(Debug, Default)]
struct Pending {
    next_ticket: u64,
    latest: HashMap<String, u64>,
}

/// Registration for one call. Dropping it forgets the key if this call is
/// still the latest, so keys do not pile up.
struct Ticket<'a> {
    debouncer: &'a LookupDebouncer,
    key: String,
    id: u64,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.debouncer.inner.lock()
            && pending.latest.get(&self.key) == Some(&self.id)
        {
            pending.latest.remove(&self.key);
        }
    }
}

impl Default for LookupDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_INTERVAL)
    }
}

impl LookupDebouncer {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            inner: Arc::new(Mutex::new(Pending::default())),
        }
    }

    #[must_use]
    pub const fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    /// Wait out the quiet interval, then run `action` if this is still the
    /// latest call for `key`.
    ///
    /// Returns `None` when a newer call for the same key superseded this one.
    pub async fn debounce<F, Fut, T>(&self, key: &str, action: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.register(key)?;
        tokio::time::sleep(self.quiet).await;

        if !self.is_latest(&ticket) {
            tracing::debug!(key = %key, "Lookup superseded");
            return None;
        }
        Some(action().await)
    }

    /// Number of keys with a call still waiting or running.
    #[must_use]
    pub fn pending_keys(&self) -> usize {
        self.inner.lock().map_or(0, |pending| pending.latest.len())
    }

    fn register(&self, key: &str) -> Option<Ticket<'_>> {
        let Ok(mut pending) = self.inner.lock() else {
            tracing::warn!("Debouncer state poisoned, skipping lookup");
            return None;
        };
        pending.next_ticket = pending.next_ticket.wrapping_add(1);
        let id = pending.next_ticket;
        pending.latest.insert(key.to_string(), id);
        Some(Ticket {
            debouncer: self,
            key: key.to_string(),
            id,
        })
    }

    fn is_latest(&self, ticket: &Ticket<'_>) -> bool {
        self.inner
            .lock()
            .is_ok_and(|pending| pending.latest.get(&ticket.key) == Some(&ticket.id))
    }
}
