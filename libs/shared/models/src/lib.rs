pub mod appointment;
pub mod error;
pub mod payment;
pub mod person;
pub mod treatment;

pub use appointment::{Appointment, AppointmentStatus};
pub use payment::Payment;
pub use person::{name_matches, normalize_email, normalize_name, Address, Doctor, Gender, Patient};
pub use treatment::{Treatment, TreatmentCategory};
