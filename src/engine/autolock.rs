//! Background inactivity timer driving `VaultEngine::lock`.
//!
//! Per the design notes: the timer holds only a weak reference to the
//! engine's shared state, so the last `VaultEngine` handle being
//! dropped lets this thread exit on its own instead of keeping the
//! process alive.

use std::sync::{Mutex, Weak};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::EngineInner;
use crate::model::VaultState;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn the auto-lock watcher for one "arming" generation. Exits when
/// the engine is dropped, locked, or superseded by a newer arming.
pub fn spawn(weak: Weak<Mutex<EngineInner>>, generation: u64) {
    thread::spawn(move || loop {
        thread::sleep(POLL_INTERVAL);

        let Some(inner) = weak.upgrade() else {
            return;
        };

        let mut guard = inner.lock().unwrap();
        if guard.generation != generation || guard.state != VaultState::Unlocked {
            return;
        }

        if guard.auto_lock_timeout.is_zero() {
            continue;
        }

        if guard.last_activity.elapsed() >= guard.auto_lock_timeout {
            debug!("auto-lock timer fired, locking vault");
            guard.master_key = None;
            guard.state = VaultState::Locked;
            return;
        }
    });
}
