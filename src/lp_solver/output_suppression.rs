//! Output suppression utilities for LP solvers
//!
//! CBC prints progress chatter straight to stdout, which would end up
//! interleaved with the plan report. This module wraps the `gag` crate in a
//! thread-safe singleton so the backend can silence the stream for the
//! duration of a solve.
//!
//! **Important**: `gag` can only create one instance per output stream per
//! process. Once a gag is created it cannot be recreated, so handles share a
//! single instance through Arc reference counting.

use gag::Gag;
use std::sync::{Arc, Mutex, Weak};

/// A thread-safe wrapper around a Gag instance
pub struct GagHandle {
    _gag: Arc<Gag>,
}

impl GagHandle {
    /// Get a handle that suppresses stdout. Multiple callers share the same
    /// underlying Gag instance; the gag persists until all handles are dropped.
    pub fn stdout() -> Result<Self, std::io::Error> {
        STDOUT_GAG_MANAGER.get_gag()
    }

    /// Get a handle that suppresses stderr.
    pub fn stderr() -> Result<Self, std::io::Error> {
        STDERR_GAG_MANAGER.get_gag()
    }
}

/// Thread-safe manager for a single Gag instance, held through a weak
/// reference so the stream is released once no solve is in flight.
struct GagManager {
    weak_gag: Mutex<Weak<Gag>>,
    create_gag: fn() -> Result<Gag, std::io::Error>,
}

impl GagManager {
    const fn new(create_fn: fn() -> Result<Gag, std::io::Error>) -> Self {
        Self {
            weak_gag: Mutex::new(Weak::new()),
            create_gag: create_fn,
        }
    }

    fn get_gag(&self) -> Result<GagHandle, std::io::Error> {
        let mut weak_gag_guard = self.weak_gag.lock().unwrap();

        // Reuse the existing gag if one is still alive
        if let Some(gag) = weak_gag_guard.upgrade() {
            return Ok(GagHandle { _gag: gag });
        }

        let gag = match (self.create_gag)() {
            Ok(gag) => gag,
            Err(e) => {
                // A racing caller may have created it in the meantime
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    if let Some(existing_gag) = weak_gag_guard.upgrade() {
                        return Ok(GagHandle { _gag: existing_gag });
                    }
                }
                return Err(e);
            }
        };

        let gag_arc = Arc::new(gag);
        *weak_gag_guard = Arc::downgrade(&gag_arc);

        Ok(GagHandle { _gag: gag_arc })
    }
}

static STDOUT_GAG_MANAGER: GagManager = GagManager::new(Gag::stdout);
static STDERR_GAG_MANAGER: GagManager = GagManager::new(Gag::stderr);
