use crate::Result;
use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicU64, Ordering};
use ohno::IntoAppError;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Bounds concurrent upstream requests and remembers rate-limit pauses.
///
/// Call [`Throttler::acquire`] before each request and hold the permit while the
/// request is in flight; at most `max_concurrent` requests run at once. When a request
/// learns that the upstream quota is exhausted it calls [`Throttler::pause_until`], after
/// which [`Throttler::is_paused`] reports `true` until the reset time passes so that
/// optional work can be skipped instead of hammering the upstream.
///
/// When several pauses overlap, the one ending last wins.
#[derive(Debug)]
pub struct Throttler {
    semaphore: Semaphore,
    resume_at: Mutex<Option<DateTime<Utc>>>,
    pauses: AtomicU64,
}

impl Throttler {
    /// Create a throttler that allows at most `max_concurrent` requests at a time.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Arc<Self> {
        Arc::new(Self {
            semaphore: Semaphore::new(max_concurrent.max(1)),
            resume_at: Mutex::new(None),
            pauses: AtomicU64::new(0),
        })
    }

    /// Wait for a free concurrency slot.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore.acquire().await.into_app_err("throttler closed")
    }

    /// Returns whether a rate-limit pause is in effect.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused_until().is_some()
    }

    /// The time the current pause ends, if one is in effect.
    #[must_use]
    pub fn paused_until(&self) -> Option<DateTime<Utc>> {
        let mut guard = self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
        match *guard {
            Some(resume_at) if resume_at > Utc::now() => Some(resume_at),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }

    /// Pause optional work until `resume_at`.
    ///
    /// Returns `true` when this call established or extended the pause, `false` when a
    /// pause ending at the same time or later was already in effect.
    pub fn pause_until(&self, resume_at: DateTime<Utc>) -> bool {
        let mut guard = self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some_and(|existing| existing >= resume_at) {
            return false;
        }
        *guard = Some(resume_at);
        let _ = self.pauses.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Number of times a pause was established or extended.
    ///
    /// Comparing two readings tells whether a pause began in between, even one that has already ended.
    #[must_use]
    pub fn pause_count(&self) -> u64 {
        self.pauses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicUsize;
    use core::time::Duration;

    #[tokio::test]
    async fn limits_concurrency() {
        let throttler = Throttler::new(2);
        let active = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);

        let work = (0..10).map(|_| async {
            let _permit = throttler.acquire().await.unwrap();
            let current = active.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = max_seen.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = active.fetch_sub(1, Ordering::SeqCst);
        });

        let _ = futures_util::future::join_all(work).await;

        assert!(max_seen.load(Ordering::SeqCst) <= 2);
        assert!(max_seen.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn zero_concurrency_still_allows_progress() {
        let throttler = Throttler::new(0);
        assert_eq!(throttler.semaphore.available_permits(), 1);
    }

    #[test]
    fn pause_in_future_is_active() {
        let throttler = Throttler::new(1);
        assert!(!throttler.is_paused());

        let resume_at = Utc::now() + chrono::Duration::minutes(5);
        assert!(throttler.pause_until(resume_at));
        assert!(throttler.is_paused());
        assert_eq!(throttler.paused_until(), Some(resume_at));
    }

    #[test]
    fn pause_in_past_is_ignored() {
        let throttler = Throttler::new(1);
        let _ = throttler.pause_until(Utc::now() - chrono::Duration::seconds(1));
        assert!(!throttler.is_paused());
    }

    #[test]
    fn longest_pause_wins() {
        let throttler = Throttler::new(1);
        let long = Utc::now() + chrono::Duration::minutes(10);
        let short = Utc::now() + chrono::Duration::minutes(1);

        assert!(throttler.pause_until(long));
        assert!(!throttler.pause_until(short));
        assert_eq!(throttler.paused_until(), Some(long));
    }

    #[test]
    fn pause_count_tracks_established_pauses() {
        let throttler = Throttler::new(1);
        assert_eq!(throttler.pause_count(), 0);

        let long = Utc::now() + chrono::Duration::minutes(10);
        assert!(throttler.pause_until(long));
        assert!(!throttler.pause_until(long - chrono::Duration::minutes(1)));
        assert_eq!(throttler.pause_count(), 1);

        let _ = throttler.pause_until(long + chrono::Duration::minutes(1));
        assert_eq!(throttler.pause_count(), 2);
    }
}
