use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::TreatmentCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTreatmentRequest {
    pub name: String,
    pub category: TreatmentCategory,
    pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTreatmentRequest {
    pub name: Option<String>,
    pub category: Option<TreatmentCategory>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreatmentSearchQuery {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TreatmentError {
    #[error("Treatment {0} not found")]
    NotFound(Uuid),

    #[error("Treatment name must not be empty")]
    EmptyName,

    #[error("Treatment price must be a non-negative amount, got {0}")]
    InvalidPrice(f64),

    #[error("Record store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<TreatmentError> for AppError {
    fn from(err: TreatmentError) -> Self {
        match err {
            TreatmentError::NotFound(_) => AppError::NotFound(err.to_string()),
            TreatmentError::EmptyName | TreatmentError::InvalidPrice(_) => {
                AppError::ValidationError(err.to_string())
            }
            TreatmentError::Store(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            TreatmentError::Store(inner) => AppError::Database(inner.to_string()),
        }
    }
}
