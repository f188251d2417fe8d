use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::RecordStore;
use shared_models::{name_matches, normalize_email, normalize_name, Patient};

use crate::models::{CreatePatientRequest, PatientError, UpdatePatientRequest};

pub struct PatientService {
    store: Arc<dyn RecordStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Creating new patient profile for: {}", request.email);

        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: required_name(&request.first_name, "first name")?,
            last_name: required_name(&request.last_name, "last name")?,
            email: valid_email(&request.email)?,
            phone_number: request.phone_number.trim().to_string(),
            address: request.address,
            birth_date: valid_birth_date(request.birth_date)?,
            gender: request.gender,
            medical_history: request.medical_history.trim().to_string(),
        };

        let patient = self.store.insert_patient(patient).await?;
        info!(target: "audit", action = "add patient", entity = %patient.id, "Patient {} added", patient.full_name());

        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        self.store.get_patient(patient_id).await?
            .ok_or(PatientError::NotFound(patient_id))
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        Ok(self.store.list_patients().await?)
    }

    pub async fn search_patients_by_name(&self, name: &str) -> Result<Vec<Patient>, PatientError> {
        let patients = self.store.list_patients().await?;
        debug!("Searching {} patients for '{}'", patients.len(), name);

        Ok(patients.into_iter()
            .filter(|patient| name_matches(&patient.first_name, &patient.last_name, name))
            .collect())
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient profile: {}", patient_id);

        let current = self.get_patient(patient_id).await?;
        let updated = Patient {
            id: current.id,
            first_name: match request.first_name {
                Some(name) => required_name(&name, "first name")?,
                None => current.first_name,
            },
            last_name: match request.last_name {
                Some(name) => required_name(&name, "last name")?,
                None => current.last_name,
            },
            email: match request.email {
                Some(email) => valid_email(&email)?,
                None => current.email,
            },
            phone_number: request.phone_number
                .map(|phone| phone.trim().to_string())
                .unwrap_or(current.phone_number),
            address: request.address.unwrap_or(current.address),
            birth_date: match request.birth_date {
                Some(date) => valid_birth_date(date)?,
                None => current.birth_date,
            },
            gender: request.gender.unwrap_or(current.gender),
            medical_history: request.medical_history
                .map(|history| history.trim().to_string())
                .unwrap_or(current.medical_history),
        };

        let patient = self.store.update_patient(patient_id, updated).await?;
        info!(target: "audit", action = "update patient", entity = %patient_id, "Patient updated");

        Ok(patient)
    }

    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        if !self.store.patient_exists(patient_id).await? {
            return Err(PatientError::NotFound(patient_id));
        }

        self.store.delete_patient(patient_id).await?;
        info!(target: "audit", action = "delete patient", entity = %patient_id, "Patient deleted");

        Ok(())
    }
}

fn required_name(raw: &str, field: &str) -> Result<String, PatientError> {
    let name = normalize_name(raw);
    if name.is_empty() {
        return Err(PatientError::ValidationError(format!("Patient {} must not be empty", field)));
    }
    Ok(name)
}

fn valid_email(raw: &str) -> Result<String, PatientError> {
    normalize_email(raw)
        .ok_or_else(|| PatientError::ValidationError(format!("Not a valid email address: {}", raw)))
}

fn valid_birth_date(date: NaiveDate) -> Result<NaiveDate, PatientError> {
    if date > Local::now().date_naive() {
        return Err(PatientError::InvalidDateOfBirth(date));
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Days;
    use shared_database::InMemoryRecordStore;
    use shared_models::Gender;
    use shared_utils::test_utils::ClinicFixtures;

    fn request() -> CreatePatientRequest {
        CreatePatientRequest {
            first_name: "aNDREI".to_string(),
            last_name: "popescu".to_string(),
            email: " Andrei.Popescu@Example.COM ".to_string(),
            phone_number: "0744444444".to_string(),
            address: ClinicFixtures::address(),
            birth_date: ClinicFixtures::date(1985, 3, 14),
            gender: Gender::Male,
            medical_history: "Asthma".to_string(),
        }
    }

    fn service() -> PatientService {
        PatientService::new(Arc::new(InMemoryRecordStore::new()))
    }

    #[tokio::test]
    async fn test_create_patient_normalizes_fields() {
        let patient = service().create_patient(request()).await.unwrap();

        assert_eq!(patient.first_name, "Andrei");
        assert_eq!(patient.last_name, "Popescu");
        assert_eq!(patient.email, "andrei.popescu@example.com");
    }

    #[tokio::test]
    async fn test_create_patient_rejects_bad_input() {
        let service = service();

        let mut no_at = request();
        no_at.email = "andrei.example.com".to_string();
        assert_matches!(service.create_patient(no_at).await, Err(PatientError::ValidationError(_)));

        let mut unborn = request();
        unborn.birth_date = Local::now().date_naive() + Days::new(30);
        assert_matches!(service.create_patient(unborn).await, Err(PatientError::InvalidDateOfBirth(_)));

        let mut blank = request();
        blank.last_name = "   ".to_string();
        assert_matches!(service.create_patient(blank).await, Err(PatientError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_and_search() {
        let service = service();
        let patient = service.create_patient(request()).await.unwrap();

        let updated = service.update_patient(patient.id, UpdatePatientRequest {
            last_name: Some("ionescu-popa".to_string()),
            ..UpdatePatientRequest::default()
        }).await.unwrap();
        assert_eq!(updated.last_name, "Ionescu-popa");
        assert_eq!(updated.email, "andrei.popescu@example.com");

        assert_eq!(service.search_patients_by_name("IONESCU").await.unwrap().len(), 1);
        assert!(service.search_patients_by_name("Smith").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_patient() {
        let service = service();
        assert_matches!(service.get_patient(Uuid::new_v4()).await, Err(PatientError::NotFound(_)));
        assert_matches!(service.delete_patient(Uuid::new_v4()).await, Err(PatientError::NotFound(_)));
    }
}
