//! Per-key async locks.
//!
//! Mutations that touch the same session or channel run one at a time;
//! unrelated keys never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub(crate) async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut table = self.table.lock().await;
            // Entries nobody holds or waits on can go.
            table.retain(|_, slot| Arc::strong_count(slot) > 1);
            table.entry(key.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }
}
