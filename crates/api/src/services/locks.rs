use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// In-process serialization of booking writes per (operator, date)
/// partition. The store-level advisory lock is the authoritative guard; this
/// registry keeps same-partition requests from one process queued in memory
/// so they never contend on the database lock timeout. Unrelated partitions
/// proceed independently.
#[derive(Default)]
pub struct PartitionLocks {
    inner: Mutex<HashMap<(Uuid, NaiveDate), Arc<AsyncMutex<()>>>>,
}

impl PartitionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the partition's mutex, creating it on first use. The guard
    /// is owned so it can be held across await points.
    pub async fn acquire(&self, operator_id: Uuid, date: NaiveDate) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().expect("partition lock map poisoned");
            map.entry((operator_id, date))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }
}
