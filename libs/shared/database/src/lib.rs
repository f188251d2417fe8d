pub mod locks;
pub mod memory;
pub mod postgrest;
pub mod store;
pub mod supabase;

pub use locks::{DoctorDay, DoctorRecordLock, SchedulingLocks};
pub use memory::InMemoryRecordStore;
pub use postgrest::SupabaseRecordStore;
pub use store::{RecordStore, StoreError, StoreResult};
