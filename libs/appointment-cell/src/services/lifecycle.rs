// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::services::availability::{available_slots, ensure_weekday};
use doctor_cell::BusinessHours;
use shared_database::{RecordStore, SchedulingLocks};
use shared_models::{Appointment, AppointmentStatus, Doctor, Patient, Treatment};

use crate::models::{AppointmentError, AppointmentUpdate, BookingTarget, CreateAppointmentRequest};
use crate::services::consistency::SchedulingConsistencyService;

/// A freshly booked appointment; always starts out `SCHEDULED`.
pub fn new_appointment(
    patient: Patient,
    treatment: Treatment,
    doctor: Doctor,
    date: NaiveDateTime,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        date,
        patient,
        treatment,
        doctor,
        status: AppointmentStatus::default(),
    }
}

/// Checks that `doctor` can take `treatment` at `date`, given everything
/// already booked. `exclude` names an appointment being moved, whose own slot
/// does not count as taken.
///
/// Checks run in a fixed order: specialization, weekday, hourly grid, free slot.
pub fn validate_booking(
    doctor: &Doctor,
    treatment: &Treatment,
    date: NaiveDateTime,
    booked: &[Appointment],
    exclude: Option<Uuid>,
) -> Result<(), AppointmentError> {
    if !doctor.offers(treatment.category) {
        return Err(AppointmentError::SpecializationMismatch {
            doctor: doctor.full_name(),
            category: treatment.category,
        });
    }

    ensure_weekday(date.date())?;

    if !BusinessHours::CLINIC.is_slot_start(date.time()) {
        return Err(AppointmentError::OffGridTime(date));
    }

    let others: Vec<Appointment> = booked.iter()
        .filter(|appointment| Some(appointment.id) != exclude)
        .cloned()
        .collect();
    let open = available_slots(doctor, date.date(), &others)?;

    if open.is_empty() {
        return Err(AppointmentError::NoSlotsAvailable {
            doctor: doctor.full_name(),
            date: date.date(),
        });
    }
    if !open.contains(&date.time()) {
        return Err(AppointmentError::SlotUnavailable {
            doctor: doctor.full_name(),
            date,
        });
    }

    Ok(())
}

/// Where `current` has to move for `change`, or `None` when the change does
/// not touch its slot, doctor or treatment.
pub fn retarget(current: &Appointment, change: &AppointmentUpdate) -> Option<BookingTarget> {
    let target = BookingTarget::from(current);
    match *change {
        AppointmentUpdate::Date { date } => Some(BookingTarget { date, ..target }),
        AppointmentUpdate::Doctor { doctor_id, date } => Some(BookingTarget { doctor_id, date, ..target }),
        AppointmentUpdate::Treatment { treatment_id, doctor_id, date } => Some(BookingTarget {
            treatment_id,
            doctor_id: doctor_id.unwrap_or(target.doctor_id),
            date: date.unwrap_or(target.date),
            ..target
        }),
        AppointmentUpdate::Patient { .. } | AppointmentUpdate::Status { .. } => None,
    }
}

/// Creates appointments and applies field-level changes to them.
pub struct AppointmentLifecycleService {
    consistency: SchedulingConsistencyService,
}

impl AppointmentLifecycleService {
    pub fn new(store: Arc<dyn RecordStore>, locks: Arc<SchedulingLocks>) -> Self {
        Self {
            consistency: SchedulingConsistencyService::new(store, locks),
        }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Booking patient {} with doctor {} at {}", request.patient_id, request.doctor_id, request.date);

        let appointment = self.consistency.commit(BookingTarget::from(&request)).await?;
        info!(
            target: "audit",
            action = "add appointment",
            entity = %appointment.id,
            "Appointment booked with Dr. {} at {}",
            appointment.doctor.full_name(),
            appointment.date
        );

        Ok(appointment)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        change: AppointmentUpdate,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Applying {:?} to appointment {}", change, appointment_id);

        let updated = self.consistency.apply(appointment_id, &change).await?;
        info!(target: "audit", action = "update appointment", entity = %appointment_id, "Appointment updated");

        Ok(updated)
    }
}
