use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use tracing::debug;
use uuid::Uuid;

use shared_database::RecordStore;
use shared_models::{Appointment, Doctor};

use crate::models::{AvailabilityError, AvailableSlotsResponse, DoctorError};

/// Daily booking window. Slots start on the hour from `opening_hour` up to,
/// but not including, `closing_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub opening_hour: u32,
    pub closing_hour: u32,
    pub slot_minutes: u32,
}

impl BusinessHours {
    pub const CLINIC: BusinessHours = BusinessHours {
        opening_hour: 8,
        closing_hour: 16,
        slot_minutes: 60,
    };

    /// Every slot start of the day in ascending order.
    pub fn slots(&self) -> Vec<NaiveTime> {
        (self.opening_hour * 60..self.closing_hour * 60)
            .step_by(self.slot_minutes as usize)
            .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
            .collect()
    }

    /// True when `time` is exactly one of the slot starts.
    pub fn is_slot_start(&self, time: NaiveTime) -> bool {
        time.second() == 0 && time.nanosecond() == 0 && self.slots().contains(&time)
    }
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn ensure_weekday(date: NaiveDate) -> Result<(), AvailabilityError> {
    if is_weekday(date) {
        Ok(())
    } else {
        Err(AvailabilityError::Weekend { date, weekday: date.weekday() })
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AvailabilityError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AvailabilityError::UnparsableDate(raw.to_string()))
}

/// Open slots for `doctor` on `date`.
///
/// Every appointment of that doctor on that date consumes the slot starting
/// at its exact time-of-day. An appointment off the hourly grid matches no
/// slot and consumes nothing. The result may be empty.
pub fn available_slots(
    doctor: &Doctor,
    date: NaiveDate,
    appointments: &[Appointment],
) -> Result<Vec<NaiveTime>, AvailabilityError> {
    ensure_weekday(date)?;

    let mut slots = BusinessHours::CLINIC.slots();
    for appointment in appointments
        .iter()
        .filter(|appointment| appointment.is_with(doctor) && appointment.day() == date)
    {
        slots.retain(|slot| *slot != appointment.time_of_day());
    }

    Ok(slots)
}

pub struct AvailabilityService {
    store: Arc<dyn RecordStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<AvailableSlotsResponse, DoctorError> {
        debug!("Calculating available slots for doctor {} on {}", doctor_id, date);

        ensure_weekday(date)?;

        let doctor = self.store.get_doctor(doctor_id).await?
            .ok_or(DoctorError::NotFound(doctor_id))?;
        let appointments = self.store.list_appointments().await?;

        let slots = available_slots(&doctor, date, &appointments)?;
        debug!("Doctor {} has {} open slots on {}", doctor_id, slots.len(), date);

        Ok(AvailableSlotsResponse {
            doctor_id,
            doctor_name: doctor.full_name(),
            date,
            available_slots: slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::TreatmentCategory;
    use shared_utils::test_utils::ClinicFixtures;

    fn hour(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_clinic_hours_yield_eight_hourly_slots() {
        let slots = BusinessHours::CLINIC.slots();

        assert_eq!(slots, (8..16).map(hour).collect::<Vec<_>>());
        assert!(BusinessHours::CLINIC.is_slot_start(hour(15)));
        assert!(!BusinessHours::CLINIC.is_slot_start(hour(16)));
        assert!(!BusinessHours::CLINIC.is_slot_start(NaiveTime::from_hms_opt(9, 30, 0).unwrap()));
    }

    #[test]
    fn test_free_weekday_has_every_slot() {
        let doctor = ClinicFixtures::doctor("John", "Smith", &[TreatmentCategory::Cardiology]);
        let wednesday = ClinicFixtures::date(2024, 6, 12);

        let slots = available_slots(&doctor, wednesday, &[]).unwrap();
        assert_eq!(slots.len(), 8);
        assert_eq!(slots.first(), Some(&hour(8)));
        assert_eq!(slots.last(), Some(&hour(15)));
    }

    #[test]
    fn test_booked_slot_is_excluded() {
        let doctor = ClinicFixtures::doctor("John", "Smith", &[TreatmentCategory::Cardiology]);
        let patient = ClinicFixtures::patient("Maria", "Ionescu");
        let ecg = ClinicFixtures::treatment("ECG", TreatmentCategory::Cardiology, 120.0);
        let booked = ClinicFixtures::appointment(&patient, &ecg, &doctor, ClinicFixtures::at(2024, 6, 10, 10));

        let slots = available_slots(&doctor, ClinicFixtures::date(2024, 6, 10), &[booked]).unwrap();
        assert_eq!(slots.len(), 7);
        assert!(!slots.contains(&hour(10)));
    }

    #[test]
    fn test_other_doctors_and_days_do_not_consume_slots() {
        let smith = ClinicFixtures::doctor("John", "Smith", &[TreatmentCategory::Cardiology]);
        let jones = ClinicFixtures::doctor("Emma", "Jones", &[TreatmentCategory::Cardiology]);
        let patient = ClinicFixtures::patient("Maria", "Ionescu");
        let ecg = ClinicFixtures::treatment("ECG", TreatmentCategory::Cardiology, 120.0);
        let appointments = vec![
            ClinicFixtures::appointment(&patient, &ecg, &jones, ClinicFixtures::at(2024, 6, 10, 9)),
            ClinicFixtures::appointment(&patient, &ecg, &smith, ClinicFixtures::at(2024, 6, 11, 9)),
        ];

        let slots = available_slots(&smith, ClinicFixtures::date(2024, 6, 10), &appointments).unwrap();
        assert_eq!(slots.len(), 8);
    }

    #[test]
    fn test_off_grid_appointment_blocks_nothing() {
        let doctor = ClinicFixtures::doctor("John", "Smith", &[TreatmentCategory::Cardiology]);
        let patient = ClinicFixtures::patient("Maria", "Ionescu");
        let ecg = ClinicFixtures::treatment("ECG", TreatmentCategory::Cardiology, 120.0);
        let off_grid = ClinicFixtures::date(2024, 6, 10).and_hms_opt(9, 30, 0).unwrap();
        let appointment = ClinicFixtures::appointment(&patient, &ecg, &doctor, off_grid);

        let slots = available_slots(&doctor, ClinicFixtures::date(2024, 6, 10), &[appointment]).unwrap();
        assert_eq!(slots.len(), 8);
    }

    #[test]
    fn test_weekends_are_rejected() {
        let doctor = ClinicFixtures::doctor("John", "Smith", &[TreatmentCategory::Cardiology]);

        let saturday = ClinicFixtures::date(2024, 6, 8);
        let sunday = ClinicFixtures::date(2024, 6, 9);
        assert_eq!(
            available_slots(&doctor, saturday, &[]),
            Err(AvailabilityError::Weekend { date: saturday, weekday: Weekday::Sat })
        );
        assert!(available_slots(&doctor, sunday, &[]).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-06-10"), Ok(ClinicFixtures::date(2024, 6, 10)));
        assert_eq!(parse_date("10/06/2024"), Err(AvailabilityError::UnparsableDate("10/06/2024".to_string())));
    }
}
