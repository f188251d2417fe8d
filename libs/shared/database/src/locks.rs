use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Key of the scheduling critical section: one doctor on one calendar day.
/// Keys order by doctor, then date; several keys are always taken in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DoctorDay {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
}

impl DoctorDay {
    pub fn new(doctor_id: Uuid, date: NaiveDate) -> Self {
        Self { doctor_id, date }
    }
}

/// Serializes read-availability-then-insert sequences per doctor-day so two
/// bookings for the same doctor and hour cannot both pass the free-slot check.
///
/// Process-local only. Deployments running several API instances against the
/// same database also need a unique index on `appointments (doctor_id, date)`.
#[derive(Default)]
pub struct SchedulingLocks {
    locks: Mutex<HashMap<DoctorDay, Arc<AsyncMutex<()>>>>,
}

pub struct DoctorDayGuard {
    pub key: DoctorDay,
    _guard: OwnedMutexGuard<()>,
}

impl SchedulingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, doctor_id: Uuid, date: NaiveDate) -> DoctorDayGuard {
        let key = DoctorDay { doctor_id, date };
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Entries nobody holds or waits on can go.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(key).or_default().clone()
        };

        debug!("Waiting for scheduling lock on doctor {} for {}", doctor_id, date);
        let guard = lock.lock_owned().await;
        DoctorDayGuard { key, _guard: guard }
    }

    /// Takes every lock in `keys`, in key order, so two callers needing the
    /// same pair of doctor-days cannot deadlock.
    pub async fn acquire_all(&self, keys: impl IntoIterator<Item = DoctorDay>) -> Vec<DoctorDayGuard> {
        let mut keys: Vec<DoctorDay> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.acquire(key.doctor_id, key.date).await);
        }
        guards
    }

    pub fn held(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

/// Serializes writes to doctor records. Identity uniqueness is checked and
/// every edit re-reads its row while this is held.
#[derive(Default)]
pub struct DoctorRecordLock {
    lock: Arc<AsyncMutex<()>>,
}

impl DoctorRecordLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> OwnedMutexGuard<()> {
        self.lock.clone().lock_owned().await
    }
}
