// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::services::availability::{available_slots, ensure_weekday};
use doctor_cell::services::matching::doctors_for_category;
use shared_database::RecordStore;
use shared_models::{name_matches, Appointment};

use crate::models::{AppointmentError, BookingOptions, DoctorOption};

/// Read side of appointments plus deletion and the booking chooser.
pub struct AppointmentBookingService {
    store: Arc<dyn RecordStore>,
}

impl AppointmentBookingService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Every appointment, earliest first.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments = self.store.list_appointments().await?;
        appointments.sort_by_key(|appointment| appointment.date);
        Ok(appointments)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store.get_appointment(appointment_id).await?
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    pub async fn appointments_for_patient(&self, name: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.list_appointments().await?;
        Ok(appointments.into_iter()
            .filter(|a| name_matches(&a.patient.first_name, &a.patient.last_name, name))
            .collect())
    }

    pub async fn appointments_for_doctor(&self, name: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.list_appointments().await?;
        Ok(appointments.into_iter()
            .filter(|a| name_matches(&a.doctor.first_name, &a.doctor.last_name, name))
            .collect())
    }

    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        if !self.store.appointment_exists(appointment_id).await? {
            return Err(AppointmentError::NotFound(appointment_id));
        }

        self.store.delete_appointment(appointment_id).await?;
        info!(target: "audit", action = "delete appointment", entity = %appointment_id, "Appointment deleted");

        Ok(())
    }

    /// Doctors who can perform the treatment, each with their open slots on
    /// `date`. Both lists may be empty; the caller then picks another date or
    /// treatment.
    pub async fn booking_options(
        &self,
        treatment_id: Uuid,
        date: NaiveDate,
    ) -> Result<BookingOptions, AppointmentError> {
        ensure_weekday(date)?;

        let treatment = self.store.get_treatment(treatment_id).await?
            .ok_or(AppointmentError::TreatmentNotFound(treatment_id))?;
        let doctors = self.store.list_doctors().await?;
        let booked = self.store.list_appointments().await?;

        let mut options = Vec::new();
        for doctor in doctors_for_category(treatment.category, &doctors) {
            let slots = available_slots(&doctor, date, &booked)?;
            options.push(DoctorOption { doctor, available_slots: slots });
        }
        debug!("{} doctors can perform {} on {}", options.len(), treatment.name, date);

        Ok(BookingOptions {
            treatment_id,
            category: treatment.category,
            date,
            doctors: options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_utils::test_utils::{ClinicFixtures, SeededClinic};

    #[tokio::test]
    async fn test_list_is_sorted_by_date() {
        let clinic = SeededClinic::new().await;
        clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 11, 9)).await;
        clinic.book(&clinic.jones, &clinic.peeling, ClinicFixtures::at(2024, 6, 10, 14)).await;
        clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 8)).await;

        let listed = AppointmentBookingService::new(clinic.store.clone()).list_appointments().await.unwrap();

        let dates: Vec<_> = listed.iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![
            ClinicFixtures::at(2024, 6, 10, 8),
            ClinicFixtures::at(2024, 6, 10, 14),
            ClinicFixtures::at(2024, 6, 11, 9),
        ]);
    }

    #[tokio::test]
    async fn test_search_by_doctor_and_patient_name() {
        let clinic = SeededClinic::new().await;
        clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 9)).await;
        clinic.book(&clinic.jones, &clinic.peeling, ClinicFixtures::at(2024, 6, 10, 9)).await;
        let service = AppointmentBookingService::new(clinic.store.clone());

        let smith = service.appointments_for_doctor("smith").await.unwrap();
        assert_eq!(smith.len(), 1);
        assert_eq!(smith[0].doctor.id, clinic.smith.id);

        assert_eq!(service.appointments_for_patient("Maria Ionescu").await.unwrap().len(), 2);
        assert!(service.appointments_for_patient("Popescu").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booking_options_lists_qualified_doctors_with_slots() {
        let clinic = SeededClinic::new().await;
        clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 9)).await;
        let service = AppointmentBookingService::new(clinic.store.clone());

        let options = service.booking_options(clinic.ecg.id, ClinicFixtures::date(2024, 6, 10)).await.unwrap();

        assert_eq!(options.doctors.len(), 1);
        assert_eq!(options.doctors[0].doctor.id, clinic.smith.id);
        assert_eq!(options.doctors[0].available_slots.len(), 7);

        assert_matches!(
            service.booking_options(clinic.ecg.id, ClinicFixtures::date(2024, 6, 9)).await,
            Err(AppointmentError::InvalidDate(_))
        );
        assert_matches!(
            service.booking_options(Uuid::new_v4(), ClinicFixtures::date(2024, 6, 10)).await,
            Err(AppointmentError::TreatmentNotFound(_))
        );
    }

    #[tokio::test]
    async fn test_delete_appointment() {
        let clinic = SeededClinic::new().await;
        let booked = clinic.book(&clinic.smith, &clinic.ecg, ClinicFixtures::at(2024, 6, 10, 9)).await;
        let service = AppointmentBookingService::new(clinic.store.clone());

        service.delete_appointment(booked.id).await.unwrap();

        assert_matches!(service.get_appointment(booked.id).await, Err(AppointmentError::NotFound(_)));
        assert_matches!(service.delete_appointment(booked.id).await, Err(AppointmentError::NotFound(_)));
    }
}
