// Digest handling: SharePoint request digests expire after 30 minutes, so
// we cache the value with its retrieval time and reuse it while fresh.
// One cache instance is shared across every upload in a process run.

use anyhow::Result;
use std::time::{Duration, SystemTime};

/// Reuse window. Kept under the service's 30-minute expiry so a digest is
/// never sent moments before it lapses.
const DIGEST_LIFESPAN: Duration = Duration::from_secs(25 * 60);

/// A request digest together with the time it was retrieved.
#[derive(Debug, Clone)]
pub struct Digest {
    pub value: String,
    pub retrieved: SystemTime,
}

impl Digest {
    /// Whether this digest is still usable at `now`.
    pub fn is_fresh(&self, now: SystemTime) -> bool {
        match now.duration_since(self.retrieved) {
            Ok(age) => age < DIGEST_LIFESPAN,
            // Clock went backwards; the digest was retrieved "in the
            // future" so it cannot have expired yet.
            Err(_) => true,
        }
    }
}

/// Single-slot digest cache. Not per-site or per-credential: a process run
/// targets one site, so every upload shares the same slot. Callers pass it
/// `&mut`; the flow is single-threaded so no locking is needed.
#[derive(Debug, Default)]
pub struct DigestCache {
    slot: Option<Digest>,
}

impl DigestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached digest if it is still fresh at `now`, otherwise
    /// call `request` for a new value, store it stamped with `now`, and
    /// return that. The boolean reports whether a refresh happened (the
    /// caller logs it). A failed request leaves the slot untouched.
    pub fn get_or_refresh<F>(&mut self, now: SystemTime, request: F) -> Result<(Digest, bool)>
    where
        F: FnOnce() -> Result<String>,
    {
        if let Some(cached) = &self.slot {
            if cached.is_fresh(now) {
                return Ok((cached.clone(), false));
            }
        }
        let value = request()?;
        let digest = Digest {
            value,
            retrieved: now,
        };
        self.slot = Some(digest.clone());
        Ok((digest, true))
    }
}
