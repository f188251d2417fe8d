pub mod doctor;
pub mod availability;
pub mod matching;

pub use doctor::DoctorService;
pub use availability::{AvailabilityService, BusinessHours};
pub use matching::SpecializationMatcher;
