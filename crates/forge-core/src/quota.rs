//! Strike Ledger: per-client sliding-window admission control.
//!
//! A "strike" is one fully settled rewrite (admitted AND upstream succeeded).
//! Admission prunes expired timestamps and counts what remains; the strike
//! itself is recorded only after settlement, so a failed upstream call never
//! consumes quota. Both the prune-and-count and the append run under the
//! DashMap per-key entry lock, so two requests can never tear one record.
//!
//! Count-on-success means concurrent in-flight requests from one client can
//! momentarily exceed the quota by the in-flight count. That asymmetry is the
//! policy: the ledger throttles settled work, it does not reserve slots.
//!
//! The ledger is bounded: when a new client would push the map past
//! `max_clients`, fully expired records are swept, then the stalest client is
//! evicted. An evicted client that returns starts with a fresh window.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Pool key for requests with no resolvable client address (e.g. behind a
/// proxy that strips forwarding headers). The whole pool shares one window.
pub const UNIDENTIFIED_CLIENT: &str = "unidentified";

/// Default sliding window: one watch of the Forge.
pub const DEFAULT_WINDOW_SECS: i64 = 3 * 60 * 60;

/// Default settled strikes per client per window.
pub const DEFAULT_MAX_STRIKES: usize = 5;

/// Default cap on distinct client records held in memory.
pub const DEFAULT_MAX_CLIENTS: usize = 10_000;

/// Admission decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Provisionally allowed; `remaining` slots left before this strike settles.
    Allowed { remaining: usize },
    /// Window is full. `strikes` settled strikes counted at check time;
    /// `retry_after_secs` is when the oldest in-window strike expires.
    Denied {
        strikes: usize,
        retry_after_secs: i64,
    },
}

/// Per-client sliding-window ledger of settled strike timestamps.
pub struct StrikeLedger {
    strikes: DashMap<String, Vec<DateTime<Utc>>>,
    window: Duration,
    max_strikes: usize,
    max_clients: usize,
}

impl StrikeLedger {
    pub fn new(window: Duration, max_strikes: usize, max_clients: usize) -> Self {
        Self {
            strikes: DashMap::new(),
            window,
            max_strikes,
            max_clients: max_clients.max(1),
        }
    }

    /// Ledger with the stock policy: 5 strikes per 3-hour window.
    pub fn with_defaults() -> Self {
        Self::new(
            Duration::seconds(DEFAULT_WINDOW_SECS),
            DEFAULT_MAX_STRIKES,
            DEFAULT_MAX_CLIENTS,
        )
    }

    /// Check whether `client_id` may forge another strike at `now`.
    ///
    /// Prunes expired timestamps in place; the caller must follow a successful
    /// upstream round-trip with [`StrikeLedger::record_strike`].
    pub fn admit(&self, client_id: &str, now: DateTime<Utc>) -> Admission {
        if !self.strikes.contains_key(client_id) && self.strikes.len() >= self.max_clients {
            self.evict_stalest(now);
        }

        let mut entry = self.strikes.entry(client_id.to_string()).or_default();
        let horizon = now - self.window;
        entry.retain(|t| *t > horizon);

        let count = entry.len();
        if count >= self.max_strikes {
            let retry_after_secs = entry
                .first()
                .map(|t| (*t + self.window - now).num_seconds().max(0))
                .unwrap_or(0);
            tracing::info!(
                target: "forge::quota",
                client = client_id,
                strikes = count,
                retry_after_secs,
                "strike window full, request denied"
            );
            Admission::Denied {
                strikes: count,
                retry_after_secs,
            }
        } else {
            Admission::Allowed {
                remaining: self.max_strikes - count,
            }
        }
    }

    /// Settle one strike against `client_id`. Call only after the upstream
    /// round-trip fully succeeded.
    pub fn record_strike(&self, client_id: &str, now: DateTime<Utc>) {
        let mut entry = self.strikes.entry(client_id.to_string()).or_default();
        entry.push(now);
        tracing::debug!(
            target: "forge::quota",
            client = client_id,
            strikes = entry.len(),
            "strike settled"
        );
    }

    /// Number of distinct client records currently held.
    pub fn client_count(&self) -> usize {
        self.strikes.len()
    }

    /// Sweep records whose every timestamp has expired; if the map is still at
    /// capacity, drop the client whose newest strike is oldest.
    fn evict_stalest(&self, now: DateTime<Utc>) {
        let horizon = now - self.window;
        self.strikes.retain(|_, stamps| stamps.iter().any(|t| *t > horizon));

        if self.strikes.len() < self.max_clients {
            return;
        }
        let stalest = self
            .strikes
            .iter()
            .min_by_key(|r| r.value().last().copied().unwrap_or(DateTime::<Utc>::MIN_UTC))
            .map(|r| r.key().clone());
        if let Some(key) = stalest {
            tracing::debug!(target: "forge::quota", client = %key, "evicting stalest client record");
            self.strikes.remove(&key);
        }
    }
}
