// libs/appointment-cell/src/services/current_day.rs
use std::sync::Arc;

use chrono::{Datelike, Days, Local, NaiveDate};
use tracing::debug;

use shared_database::RecordStore;
use shared_models::Appointment;

use crate::models::{AppointmentError, CurrentDayAppointments};

/// The business day to report on: `today` itself on weekdays, the following
/// Monday on Saturday (+2) and Sunday (+1).
pub fn resolve_business_day(today: NaiveDate) -> NaiveDate {
    let weekday = today.weekday().number_from_monday();
    if weekday >= 6 {
        today + Days::new(u64::from(8 - weekday))
    } else {
        today
    }
}

/// Appointments on the resolved business day, earliest first. Appointments
/// sharing a date-time keep their input order.
pub fn current_day_appointments(all: &[Appointment], today: NaiveDate) -> Vec<Appointment> {
    let day = resolve_business_day(today);
    let mut appointments: Vec<Appointment> = all.iter()
        .filter(|appointment| appointment.day() == day)
        .cloned()
        .collect();
    appointments.sort_by_key(|appointment| appointment.date);
    appointments
}

pub struct CurrentDayService {
    store: Arc<dyn RecordStore>,
}

impl CurrentDayService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// `today` defaults to the clinic's local date.
    pub async fn appointments_for(&self, today: Option<NaiveDate>) -> Result<CurrentDayAppointments, AppointmentError> {
        let today = today.unwrap_or_else(|| Local::now().date_naive());
        let day = resolve_business_day(today);
        if day != today {
            debug!("{} is a weekend day, reporting on {}", today, day);
        }

        let all = self.store.list_appointments().await?;
        let appointments = current_day_appointments(&all, today);

        Ok(CurrentDayAppointments {
            day,
            total: appointments.len(),
            appointments,
        })
    }
}
