use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub patient_id: Uuid,
    pub treatment_ids: Vec<Uuid>,
    /// Defaults to now.
    #[serde(default)]
    pub payment_date: Option<NaiveDateTime>,
}

/// Replacing the treatment list recomputes the total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePaymentRequest {
    pub patient_id: Option<Uuid>,
    pub treatment_ids: Option<Vec<Uuid>>,
    pub payment_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSearchQuery {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment {0} not found")]
    NotFound(Uuid),

    #[error("Patient {0} does not exist")]
    PatientNotFound(Uuid),

    #[error("Treatment {0} does not exist")]
    TreatmentNotFound(Uuid),

    #[error("A payment must cover at least one treatment")]
    NoTreatments,

    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotFound(_)
            | PaymentError::PatientNotFound(_)
            | PaymentError::TreatmentNotFound(_) => AppError::NotFound(err.to_string()),
            PaymentError::NoTreatments => AppError::ValidationError(err.to_string()),
            PaymentError::Store(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            PaymentError::Store(inner) => AppError::Database(inner.to_string()),
        }
    }
}
