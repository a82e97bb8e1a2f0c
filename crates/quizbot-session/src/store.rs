//! Session store with TTL expiry and capacity eviction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use quizbot_types::UserId;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::session::{Session, SessionState, SessionUpdate};
use crate::ttl::TtlPolicy;

/// Authoritative mapping from user to [`Session`].
///
/// Sessions are kept in insertion order. Reads never reorder them: when the
/// store is full, `set` evicts the session that was *created* longest ago,
/// while idle sessions are reclaimed by TTL. Every operation runs under one
/// short lock, so operations are indivisible and never block on I/O.
pub struct SessionStore {
    sessions: Mutex<LruCache<UserId, Session>>,
    config: StoreConfig,
    ttl: TtlPolicy,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create a store backed by the system clock.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store with an explicit time source.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sessions: Mutex::new(LruCache::unbounded()),
            ttl: TtlPolicy::new(config.ttl),
            config,
            clock,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current monotonic time according to the store's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Number of stored sessions, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Create a fresh session for `user_id`, discarding any previous one.
    ///
    /// When the store is full, the oldest-inserted sessions are evicted one at
    /// a time until the new one fits. Replacing a user's session does not
    /// grow the store, so it never evicts anyone else.
    pub fn set(&self, user_id: UserId, state: SessionState) -> Session {
        let now = self.clock.now();
        let session = Session::new(user_id, state, now, self.clock.wall_time());

        let mut sessions = self.sessions.lock();
        if sessions.pop(&user_id).is_some() {
            debug!(user_id = %user_id, "Replacing existing session");
        }

        while sessions.len() >= self.config.max_sessions {
            match sessions.pop_lru() {
                Some((evicted, _)) => {
                    debug!(user_id = %evicted, "Evicting oldest session to make room");
                }
                None => break,
            }
        }

        sessions.push(user_id, session.clone());

        trace!(
            user_id = %user_id,
            ticket = %session.current_ticket,
            store_size = sessions.len(),
            "Session created"
        );

        session
    }

    /// Get a live session, refreshing its activity time.
    ///
    /// An expired session is removed and reported as absent.
    pub fn get(&self, user_id: UserId) -> Option<Session> {
        self.touch(user_id, SessionUpdate::default())
    }

    /// Merge `update` into a live session and refresh its activity time.
    pub fn update(&self, user_id: UserId, update: SessionUpdate) -> Option<Session> {
        self.touch(user_id, update)
    }

    fn touch(&self, user_id: UserId, update: SessionUpdate) -> Option<Session> {
        self.with_mut(user_id, |session| {
            session.apply(update);
            trace!(user_id = %user_id, index = session.current_question_index, "Session touched");
            session.clone()
        })
    }

    /// Mutable access to a live session under the store lock. Refreshes its
    /// activity time.
    ///
    /// The closure runs as one indivisible step, so a read-modify-write
    /// cannot interleave with another operation on the same store.
    pub fn with_mut<F, R>(&self, user_id: UserId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();

        if self.ttl.is_expired(sessions.peek(&user_id)?.last_activity_at, now) {
            sessions.pop(&user_id);
            debug!(user_id = %user_id, "Session expired, removing from store");
            return None;
        }

        // peek_mut leaves insertion order alone
        let session = sessions.peek_mut(&user_id)?;
        session.last_activity_at = now;
        Some(f(session))
    }

    /// Read a live session without refreshing its activity time.
    pub fn peek(&self, user_id: UserId) -> Option<Session> {
        let now = self.clock.now();
        let sessions = self.sessions.lock();
        sessions
            .peek(&user_id)
            .filter(|s| !self.ttl.is_expired(s.last_activity_at, now))
            .cloned()
    }

    /// Remove a session. Returns whether one was stored.
    pub fn delete(&self, user_id: UserId) -> bool {
        let removed = self.sessions.lock().pop(&user_id).is_some();
        if removed {
            debug!(user_id = %user_id, "Session deleted");
        }
        removed
    }

    /// Whether a live session exists. Like [`get`](Self::get), this refreshes
    /// the session's activity time.
    pub fn has(&self, user_id: UserId) -> bool {
        self.get(user_id).is_some()
    }

    /// Remove every expired session. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock();

        let expired: Vec<UserId> = sessions
            .iter()
            .filter(|(_, s)| self.ttl.is_expired(s.last_activity_at, now))
            .map(|(id, _)| *id)
            .collect();

        for user_id in &expired {
            sessions.pop(user_id);
        }

        if !expired.is_empty() {
            debug!(
                count = expired.len(),
                remaining = sessions.len(),
                "Swept expired sessions"
            );
        }

        expired.len()
    }

    pub fn stats(&self) -> StoreStats {
        let active_count = self.len();
        StoreStats {
            active_count,
            capacity: self.config.max_sessions,
            ttl: self.config.ttl,
            utilization: active_count as f64 / self.config.max_sessions as f64 * 100.0,
        }
    }
}

/// Session store statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    /// Stored sessions, including expired ones awaiting the next sweep.
    pub active_count: usize,

    /// Maximum number of sessions.
    pub capacity: usize,

    pub ttl: Duration,

    /// `active_count / capacity` as a percentage.
    pub utilization: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::Error;
    use quizbot_types::TicketId;

    fn store_with(max: usize, ttl: Duration) -> (SessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = StoreConfig::new().with_max_sessions(max).with_ttl(ttl);
        let store = SessionStore::with_clock(config, clock.clone()).unwrap();
        (store, clock)
    }

    fn minute() -> Duration {
        Duration::from_secs(60)
    }

    #[test]
    fn test_set_then_get() {
        let (store, _) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));

        let session = store.get(UserId(1)).unwrap();
        assert_eq!(session.current_ticket, TicketId(1));
        assert_eq!(session.current_question_index, 1);
        assert_eq!(session.answered(), 0);
    }

    #[test]
    fn test_get_missing() {
        let (store, _) = store_with(10, minute());
        assert!(store.get(UserId(42)).is_none());
        assert!(!store.has(UserId(42)));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = StoreConfig::new().with_max_sessions(0);
        assert!(matches!(
            SessionStore::new(config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_sweep_interval_fails_fast() {
        let config = StoreConfig {
            sweep_interval: Duration::ZERO,
            ..StoreConfig::new()
        };
        assert!(matches!(
            SessionStore::new(config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_expires_after_ttl() {
        let (store, clock) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));

        clock.advance(Duration::from_secs(61));

        assert!(store.get(UserId(1)).is_none());
        // Expired entry was removed as a side effect
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_alive_at_exactly_ttl() {
        let (store, clock) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));

        clock.advance(minute());

        assert!(store.get(UserId(1)).is_some());
    }

    #[test]
    fn test_get_refreshes_activity() {
        let (store, clock) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));

        clock.advance(Duration::from_secs(40));
        let touched = store.get(UserId(1)).unwrap();
        assert_eq!(touched.last_activity_at, clock.now());

        // 80s since creation but only 40s since the read
        clock.advance(Duration::from_secs(40));
        assert!(store.get(UserId(1)).is_some());
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let (store, clock) = store_with(10, minute());
        let created = store.set(UserId(1), SessionState::new(TicketId(1)));

        clock.advance(Duration::from_secs(40));
        let peeked = store.peek(UserId(1)).unwrap();
        assert_eq!(peeked.last_activity_at, created.last_activity_at);

        clock.advance(Duration::from_secs(40));
        assert!(store.peek(UserId(1)).is_none());
    }

    #[test]
    fn test_has_refreshes_activity() {
        let (store, clock) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));

        clock.advance(Duration::from_secs(40));
        assert!(store.has(UserId(1)));
        clock.advance(Duration::from_secs(40));
        assert!(store.has(UserId(1)));
    }

    #[test]
    fn test_update_merges_and_refreshes() {
        let (store, clock) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(2)));

        clock.advance(Duration::from_secs(30));
        let updated = store
            .update(
                UserId(1),
                SessionUpdate::new().question_index(2).incorrect_count(1),
            )
            .unwrap();

        assert_eq!(updated.current_ticket, TicketId(2));
        assert_eq!(updated.current_question_index, 2);
        assert_eq!(updated.incorrect_count, 1);
        assert_eq!(updated.last_activity_at, clock.now());
        assert_eq!(store.peek(UserId(1)).unwrap(), updated);
    }

    #[test]
    fn test_update_missing_or_expired() {
        let (store, clock) = store_with(10, minute());
        assert!(store.update(UserId(1), SessionUpdate::new()).is_none());

        store.set(UserId(1), SessionState::new(TicketId(2)));
        clock.advance(Duration::from_secs(120));
        assert!(
            store
                .update(UserId(1), SessionUpdate::new().question_index(5))
                .is_none()
        );
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_with_mut() {
        let (store, clock) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(2)));
        clock.advance(Duration::from_secs(10));

        let index = store.with_mut(UserId(1), |s| {
            s.correct_count += 1;
            s.current_question_index += 1;
            s.current_question_index
        });

        assert_eq!(index, Some(2));
        let session = store.peek(UserId(1)).unwrap();
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.last_activity_at, clock.now());
        assert_eq!(store.with_mut(UserId(9), |s| s.correct_count), None);
    }

    #[test]
    fn test_set_overwrites_without_merging() {
        let (store, _) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));
        store.update(UserId(1), SessionUpdate::new().question_index(3).correct_count(2));

        let fresh = store.set(UserId(1), SessionState::new(TicketId(9)));

        assert_eq!(fresh.current_ticket, TicketId(9));
        assert_eq!(fresh.current_question_index, 1);
        assert_eq!(fresh.correct_count, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest_inserted() {
        let (store, _) = store_with(2, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));
        store.set(UserId(2), SessionState::new(TicketId(1)));
        store.set(UserId(3), SessionState::new(TicketId(1)));

        assert_eq!(store.len(), 2);
        assert!(store.peek(UserId(1)).is_none());
        assert!(store.peek(UserId(2)).is_some());
        assert!(store.peek(UserId(3)).is_some());
    }

    #[test]
    fn test_reads_do_not_protect_from_capacity_eviction() {
        let (store, _) = store_with(2, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));
        store.set(UserId(2), SessionState::new(TicketId(1)));

        // Still the oldest insertion, so still the first to go
        store.get(UserId(1));
        store.set(UserId(3), SessionState::new(TicketId(1)));

        assert!(store.peek(UserId(1)).is_none());
        assert!(store.peek(UserId(2)).is_some());
    }

    #[test]
    fn test_replacing_at_capacity_evicts_nobody() {
        let (store, _) = store_with(2, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));
        store.set(UserId(2), SessionState::new(TicketId(1)));

        store.set(UserId(1), SessionState::new(TicketId(4)));

        assert_eq!(store.len(), 2);
        assert!(store.peek(UserId(2)).is_some());
        // The replacement counts as the newest insertion
        store.set(UserId(3), SessionState::new(TicketId(1)));
        assert!(store.peek(UserId(2)).is_none());
        assert_eq!(store.peek(UserId(1)).unwrap().current_ticket, TicketId(4));
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let (store, _) = store_with(5, minute());
        for i in 0..50 {
            store.set(UserId(i % 13), SessionState::new(TicketId(1)));
            assert!(store.len() <= 5);
        }
    }

    #[test]
    fn test_delete() {
        let (store, _) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));

        assert!(store.delete(UserId(1)));
        assert!(!store.delete(UserId(1)));
        assert!(store.get(UserId(1)).is_none());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (store, clock) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));
        store.set(UserId(2), SessionState::new(TicketId(1)));

        clock.advance(Duration::from_secs(45));
        store.set(UserId(3), SessionState::new(TicketId(1)));
        store.get(UserId(1));

        clock.advance(Duration::from_secs(30));
        let removed = store.sweep();

        assert_eq!(removed, 1);
        assert!(store.peek(UserId(1)).is_some());
        assert!(store.peek(UserId(2)).is_none());
        assert!(store.peek(UserId(3)).is_some());
        assert_eq!(store.sweep(), 0);
    }

    #[test]
    fn test_expiry_does_not_depend_on_sweep() {
        let (store, clock) = store_with(10, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));

        clock.advance(Duration::from_secs(30));
        store.sweep();
        clock.advance(Duration::from_secs(31));

        // Never swept after expiring, still absent
        assert_eq!(store.len(), 1);
        assert!(store.get(UserId(1)).is_none());
    }

    #[test]
    fn test_stats() {
        let (store, _) = store_with(4, minute());
        store.set(UserId(1), SessionState::new(TicketId(1)));

        let stats = store.stats();
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.ttl, minute());
        assert!((stats.utilization - 25.0).abs() < f64::EPSILON);
    }
}
