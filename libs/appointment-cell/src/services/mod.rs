pub mod booking;
pub mod consistency;
pub mod current_day;
pub mod lifecycle;

pub use booking::AppointmentBookingService;
pub use consistency::SchedulingConsistencyService;
pub use current_day::{current_day_appointments, resolve_business_day, CurrentDayService};
pub use lifecycle::AppointmentLifecycleService;
