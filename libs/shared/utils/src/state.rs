use std::sync::Arc;

use tracing::{info, warn};

use shared_config::AppConfig;
use shared_database::{
    DoctorRecordLock, InMemoryRecordStore, RecordStore, SchedulingLocks, SupabaseRecordStore,
};

/// State shared by every cell router: configuration, the record store, the
/// doctor-day scheduling locks and the doctor record write lock.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RecordStore>,
    pub scheduling_locks: Arc<SchedulingLocks>,
    pub doctor_writes: Arc<DoctorRecordLock>,
}

impl AppState {
    /// Picks the PostgREST store when Supabase is configured, otherwise keeps
    /// records in memory.
    pub fn from_config(config: AppConfig) -> Self {
        let store: Arc<dyn RecordStore> = if config.is_configured() {
            info!("Using PostgREST record store at {}", config.supabase_url);
            Arc::new(SupabaseRecordStore::new(&config))
        } else {
            warn!("Supabase is not configured; records are kept in memory and lost on restart");
            Arc::new(InMemoryRecordStore::new())
        };

        Self::with_store(config, store)
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            scheduling_locks: Arc::new(SchedulingLocks::new()),
            doctor_writes: Arc::new(DoctorRecordLock::new()),
        }
    }

    pub fn in_memory() -> Self {
        Self::with_store(AppConfig::default(), Arc::new(InMemoryRecordStore::new()))
    }
}
