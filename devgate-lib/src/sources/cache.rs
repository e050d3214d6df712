//! An in-memory cache with a per-entry maximum age.
//!
//! [`Cache`] exists to avoid repeating calls to rate-limited upstreams within one
//! running process. Entries are stored as JSON values so any serializable payload can
//! be kept under a string key. Nothing is persisted across restarts.

use crate::Result;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::IntoAppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const LOG_TARGET: &str = "     cache";

/// How long an entry stays usable unless configured otherwise.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(15 * 60);

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    fetched_at: DateTime<Utc>,
}

/// A shared, TTL-aware key/value cache.
///
/// Cloning a `Cache` yields another handle to the same entries. Lookups of stale
/// entries behave exactly like lookups of keys that were never set; the stale entry is
/// dropped on the way out rather than by a background sweeper.
#[derive(Clone)]
pub struct Cache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    max_age: Duration,
    clock: Clock,
}

impl core::fmt::Debug for Cache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cache")
            .field("entries", &self.len())
            .field("max_age", &self.max_age)
            .field("clock", &"<dyn Fn>")
            .finish()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}

impl Cache {
    /// Create a cache that uses the system clock.
    #[must_use]
    pub fn new(max_age: Duration) -> Self {
        Self::with_clock(max_age, Utc::now)
    }

    /// Create a cache that reads the current time from `clock`.
    #[must_use]
    pub fn with_clock(max_age: Duration, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_age,
            clock: Arc::new(clock),
        }
    }

    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Look up a fresh entry.
    ///
    /// Returns `None` when the key was never set, when the entry is older than the
    /// maximum age, or when the stored value does not decode as `T`.
    #[must_use]
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let now = (self.clock)();

        let value = {
            let mut entries = self.lock();
            let entry = entries.get(key)?;

            // Future timestamps (clock moved backwards) count as fresh
            let age = now.signed_duration_since(entry.fetched_at).to_std().unwrap_or(Duration::ZERO);
            if age >= self.max_age {
                log::debug!(
                    target: LOG_TARGET,
                    "Cache expired for {key} (age: {}s, max age: {}s)",
                    age.as_secs(),
                    self.max_age.as_secs()
                );
                let _ = entries.remove(key);
                return None;
            }

            log::debug!(target: LOG_TARGET, "Cache hit for {key} (age: {}s)", age.as_secs());
            entry.value.clone()
        };

        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Cache miss for {key}: {e:#}");
                None
            }
        }
    }

    /// Store a value, replacing whatever was stored under `key`.
    pub fn set<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).into_app_err_with(|| format!("serializing cache entry '{key}'"))?;
        let entry = Entry {
            value,
            fetched_at: (self.clock)(),
        };

        let _ = self.lock().insert(key.to_string(), entry);
        Ok(())
    }

    /// Remove one entry. Returns whether an entry was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry.
    pub fn invalidate_all(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including ones that have gone stale but were not looked up since.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build the cache key for a namespace and subject, e.g. `github/octocat`.
pub fn cache_key(namespace: &str, subject: &str) -> String {
    format!("{namespace}/{}", subject.to_lowercase())
}
