// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::AvailabilityError;
use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{Appointment, AppointmentStatus, Doctor, TreatmentCategory};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub treatment_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDateTime,
}

/// One field-level change to an appointment.
///
/// Moving to another doctor always comes with a new date-time picked from that
/// doctor's calendar. A treatment change keeps the current doctor and
/// date-time unless new ones are given, and is re-validated against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum AppointmentUpdate {
    Date {
        date: NaiveDateTime,
    },
    Patient {
        patient_id: Uuid,
    },
    Doctor {
        doctor_id: Uuid,
        date: NaiveDateTime,
    },
    Treatment {
        treatment_id: Uuid,
        #[serde(default)]
        doctor_id: Option<Uuid>,
        #[serde(default)]
        date: Option<NaiveDateTime>,
    },
    Status {
        status: AppointmentStatus,
    },
}

/// Where an appointment should land: the ids it references and its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTarget {
    pub patient_id: Uuid,
    pub treatment_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDateTime,
}

impl From<&CreateAppointmentRequest> for BookingTarget {
    fn from(request: &CreateAppointmentRequest) -> Self {
        Self {
            patient_id: request.patient_id,
            treatment_id: request.treatment_id,
            doctor_id: request.doctor_id,
            date: request.date,
        }
    }
}

impl From<&Appointment> for BookingTarget {
    fn from(appointment: &Appointment) -> Self {
        Self {
            patient_id: appointment.patient.id,
            treatment_id: appointment.treatment.id,
            doctor_id: appointment.doctor.id,
            date: appointment.date,
        }
    }
}

// ==============================================================================
// QUERY MODELS
// ==============================================================================

/// `today` stays raw so a bad value is reported as an invalid date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentDayQuery {
    pub today: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingOptionsQuery {
    pub treatment_id: Uuid,
    pub date: String,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CurrentDayAppointments {
    /// The business day actually reported on, after weekend roll-forward.
    pub day: NaiveDate,
    pub appointments: Vec<Appointment>,
    pub total: usize,
}

/// A qualified doctor and the slots still open for them on the requested day.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorOption {
    pub doctor: Doctor,
    pub available_slots: Vec<NaiveTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingOptions {
    pub treatment_id: Uuid,
    pub category: TreatmentCategory,
    pub date: NaiveDate,
    pub doctors: Vec<DoctorOption>,
}

// ==============================================================================
// ERROR MODELS
// ==============================================================================

/// Coarse classification callers branch on to decide between re-prompting
/// with different input and giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoMatch,
    InvalidDate,
    ReferentialViolation,
    PersistenceFailure,
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NoMatch => "no match",
            ErrorKind::InvalidDate => "invalid date",
            ErrorKind::ReferentialViolation => "referential violation",
            ErrorKind::PersistenceFailure => "persistence failure",
            ErrorKind::NotFound => "not found",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment {0} not found")]
    NotFound(Uuid),

    #[error("Patient {0} does not exist")]
    PatientNotFound(Uuid),

    #[error("Doctor {0} does not exist")]
    DoctorNotFound(Uuid),

    #[error("Treatment {0} does not exist")]
    TreatmentNotFound(Uuid),

    #[error("Dr. {doctor} does not offer {category} treatments")]
    SpecializationMismatch { doctor: String, category: TreatmentCategory },

    #[error(transparent)]
    InvalidDate(#[from] AvailabilityError),

    #[error("{0} does not start on an hourly slot between 08:00 and 15:00")]
    OffGridTime(NaiveDateTime),

    #[error("Dr. {doctor} has no free slots on {date}")]
    NoSlotsAvailable { doctor: String, date: NaiveDate },

    #[error("Dr. {doctor} is already booked at {date}")]
    SlotUnavailable { doctor: String, date: NaiveDateTime },

    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),
}

impl AppointmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppointmentError::NotFound(_) => ErrorKind::NotFound,
            AppointmentError::PatientNotFound(_)
            | AppointmentError::DoctorNotFound(_)
            | AppointmentError::TreatmentNotFound(_) => ErrorKind::ReferentialViolation,
            AppointmentError::SpecializationMismatch { .. }
            | AppointmentError::NoSlotsAvailable { .. }
            | AppointmentError::SlotUnavailable { .. } => ErrorKind::NoMatch,
            AppointmentError::InvalidDate(_) | AppointmentError::OffGridTime(_) => ErrorKind::InvalidDate,
            AppointmentError::Store(_) => ErrorKind::PersistenceFailure,
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NoMatch => AppError::Unavailable(message),
            ErrorKind::InvalidDate => AppError::InvalidDate(message),
            ErrorKind::ReferentialViolation | ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::PersistenceFailure => match err {
                AppointmentError::Store(StoreError::Unreachable(_)) => AppError::ExternalService(message),
                _ => AppError::Database(message),
            },
        }
    }
}
