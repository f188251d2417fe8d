use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{Address, Gender, Patient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: Address,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub medical_history: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientSearchQuery {
    pub name: String,
}

/// A patient as returned over HTTP, with the derived age alongside the record.
#[derive(Debug, Clone, Serialize)]
pub struct PatientProfile {
    #[serde(flatten)]
    pub patient: Patient,
    pub age: u32,
}

impl From<Patient> for PatientProfile {
    fn from(patient: Patient) -> Self {
        let age = patient.age();
        Self { patient, age }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient {0} not found")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid date of birth: {0}")]
    InvalidDateOfBirth(NaiveDate),

    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::InvalidDateOfBirth(_) => AppError::InvalidDate(err.to_string()),
            PatientError::Store(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            PatientError::Store(inner) => AppError::Database(inner.to_string()),
        }
    }
}
