// libs/appointment-cell/src/services/consistency.rs
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use shared_database::{DoctorDay, RecordStore, SchedulingLocks, StoreError};
use shared_models::{Appointment, Doctor, Patient, Treatment};

use crate::models::{AppointmentError, AppointmentUpdate, BookingTarget};
use crate::services::lifecycle::{new_appointment, retarget, validate_booking};

/// Runs the read-availability-then-write sequence for one doctor-day under
/// that doctor-day's lock, so two requests can never both claim a slot.
pub struct SchedulingConsistencyService {
    store: Arc<dyn RecordStore>,
    locks: Arc<SchedulingLocks>,
}

/// Doctor-days `change` touches: the one `current` occupies and, for a move,
/// the one it lands on. Sorted and deduplicated.
fn doctor_days(current: &Appointment, change: &AppointmentUpdate) -> Vec<DoctorDay> {
    let mut days = vec![DoctorDay::new(current.doctor.id, current.day())];
    if let Some(target) = retarget(current, change) {
        days.push(DoctorDay::new(target.doctor_id, target.date.date()));
    }
    days.sort();
    days.dedup();
    days
}

impl SchedulingConsistencyService {
    pub fn new(store: Arc<dyn RecordStore>, locks: Arc<SchedulingLocks>) -> Self {
        Self { store, locks }
    }

    /// Validates `target` and persists it as a new appointment.
    #[instrument(skip(self))]
    pub async fn commit(&self, target: BookingTarget) -> Result<Appointment, AppointmentError> {
        let _guard = self.locks.acquire(target.doctor_id, target.date.date()).await;
        self.write(target, None).await
    }

    /// Applies one field-level change to a stored appointment.
    ///
    /// The appointment is re-read while holding the locks of the doctor-day it
    /// occupies and of the one it moves to, and the new value is built from
    /// that fresh row. If it moved while this call waited, the locks no longer
    /// cover it and the call starts over.
    #[instrument(skip(self))]
    pub async fn apply(
        &self,
        appointment_id: Uuid,
        change: &AppointmentUpdate,
    ) -> Result<Appointment, AppointmentError> {
        let mut days = doctor_days(&self.current(appointment_id).await?, change);

        loop {
            let _guards = self.locks.acquire_all(days.iter().copied()).await;
            let current = self.current(appointment_id).await?;

            let needed = doctor_days(&current, change);
            if needed != days {
                debug!("Appointment {} moved while waiting for its lock", appointment_id);
                days = needed;
                continue;
            }

            return self.apply_locked(current, change).await;
        }
    }

    async fn apply_locked(
        &self,
        current: Appointment,
        change: &AppointmentUpdate,
    ) -> Result<Appointment, AppointmentError> {
        if let Some(target) = retarget(&current, change) {
            return self.write(target, Some(&current)).await;
        }

        let updated = match *change {
            AppointmentUpdate::Patient { patient_id } => {
                let patient = self.store.get_patient(patient_id).await?
                    .ok_or(AppointmentError::PatientNotFound(patient_id))?;
                Appointment { patient, ..current }
            }
            AppointmentUpdate::Status { status } => Appointment { status, ..current },
            _ => return Ok(current),
        };

        Ok(self.store.update_appointment(updated.id, updated).await?)
    }

    async fn current(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store.get_appointment(appointment_id).await?
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    /// Caller holds the lock of `target`'s doctor-day, and of `existing`'s
    /// when moving it. `existing` keeps its id and status.
    async fn write(
        &self,
        target: BookingTarget,
        existing: Option<&Appointment>,
    ) -> Result<Appointment, AppointmentError> {
        let (patient, treatment, doctor) = self.resolve(&target).await?;
        let booked = self.store.list_appointments().await?;
        validate_booking(&doctor, &treatment, target.date, &booked, existing.map(|a| a.id))?;

        let doctor_name = doctor.full_name();
        let result = match existing {
            None => {
                let appointment = new_appointment(patient, treatment, doctor, target.date);
                self.store.insert_appointment(appointment).await
            }
            Some(current) => {
                let appointment = Appointment {
                    id: current.id,
                    date: target.date,
                    patient,
                    treatment,
                    doctor,
                    status: current.status,
                };
                self.store.update_appointment(current.id, appointment).await
            }
        };

        result.map_err(|err| match err {
            // A unique (doctor_id, date) index caught a booking from another instance.
            StoreError::Conflict(msg) => {
                warn!("Store rejected booking at {}: {}", target.date, msg);
                AppointmentError::SlotUnavailable {
                    doctor: doctor_name,
                    date: target.date,
                }
            }
            other => AppointmentError::Store(other),
        })
    }

    async fn resolve(&self, target: &BookingTarget) -> Result<(Patient, Treatment, Doctor), AppointmentError> {
        let patient = self.store.get_patient(target.patient_id).await?
            .ok_or(AppointmentError::PatientNotFound(target.patient_id))?;
        let doctor = self.store.get_doctor(target.doctor_id).await?
            .ok_or(AppointmentError::DoctorNotFound(target.doctor_id))?;
        let treatment = self.store.get_treatment(target.treatment_id).await?
            .ok_or(AppointmentError::TreatmentNotFound(target.treatment_id))?;

        debug!("Resolved booking references for doctor {}", doctor.id);
        Ok((patient, treatment, doctor))
    }
}
