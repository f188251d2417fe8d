use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use shared_models::{Appointment, Doctor, Patient, Payment, Treatment};

/// Failures of the record store. `Conflict` is a constraint the store refused
/// (duplicate id, dangling or still-used reference); every other variant is a
/// persistence failure. Nothing is retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No {entity} row affected for id {id}")]
    NoRowsAffected { entity: &'static str, id: Uuid },

    #[error("Record store unreachable: {0}")]
    Unreachable(String),

    #[error("Record store conflict: {0}")]
    Conflict(String),

    #[error("Record store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed record: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence of clinic records.
///
/// Appointments and payments come back hydrated with the patient, doctor and
/// treatments they reference. Ids are chosen by the caller before insert.
/// Deleting a patient, doctor or treatment still referenced by an appointment
/// fails with [`StoreError::Conflict`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>>;
    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>>;
    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient>;
    async fn update_patient(&self, id: Uuid, patient: Patient) -> StoreResult<Patient>;
    async fn delete_patient(&self, id: Uuid) -> StoreResult<()>;

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>>;
    async fn get_doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>>;
    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor>;
    async fn update_doctor(&self, id: Uuid, doctor: Doctor) -> StoreResult<Doctor>;
    async fn delete_doctor(&self, id: Uuid) -> StoreResult<()>;

    async fn list_treatments(&self) -> StoreResult<Vec<Treatment>>;
    async fn get_treatment(&self, id: Uuid) -> StoreResult<Option<Treatment>>;
    async fn insert_treatment(&self, treatment: Treatment) -> StoreResult<Treatment>;
    async fn update_treatment(&self, id: Uuid, treatment: Treatment) -> StoreResult<Treatment>;
    async fn delete_treatment(&self, id: Uuid) -> StoreResult<()>;

    async fn list_appointments(&self) -> StoreResult<Vec<Appointment>>;
    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>>;
    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment>;
    async fn update_appointment(&self, id: Uuid, appointment: Appointment) -> StoreResult<Appointment>;
    async fn delete_appointment(&self, id: Uuid) -> StoreResult<()>;

    async fn list_payments(&self) -> StoreResult<Vec<Payment>>;
    async fn get_payment(&self, id: Uuid) -> StoreResult<Option<Payment>>;
    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment>;
    async fn update_payment(&self, id: Uuid, payment: Payment) -> StoreResult<Payment>;
    async fn delete_payment(&self, id: Uuid) -> StoreResult<()>;

    async fn patient_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.get_patient(id).await?.is_some())
    }

    async fn doctor_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.get_doctor(id).await?.is_some())
    }

    async fn treatment_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.get_treatment(id).await?.is_some())
    }

    async fn appointment_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.get_appointment(id).await?.is_some())
    }

    async fn payment_exists(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.get_payment(id).await?.is_some())
    }
}
