use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{DoctorRecordLock, RecordStore};
use shared_models::{name_matches, normalize_email, normalize_name, Doctor, TreatmentCategory};

use crate::models::{CreateDoctorRequest, DoctorError, UpdateDoctorRequest};

/// Doctor records. Every write runs under the shared [`DoctorRecordLock`]:
/// no two records may share an identity (name, email, phone), and edits are
/// built from the row as it is when the lock is held.
pub struct DoctorService {
    store: Arc<dyn RecordStore>,
    writes: Arc<DoctorRecordLock>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn RecordStore>, writes: Arc<DoctorRecordLock>) -> Self {
        Self { store, writes }
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor profile for: {}", request.email);

        let doctor = Doctor {
            id: Uuid::new_v4(),
            first_name: required_name(&request.first_name, "first name")?,
            last_name: required_name(&request.last_name, "last name")?,
            email: valid_email(&request.email)?,
            phone_number: request.phone_number.trim().to_string(),
            address: request.address,
            specializations: request.specializations,
        };

        let _writing = self.writes.acquire().await;
        self.ensure_unique(&doctor).await?;

        let doctor = self.store.insert_doctor(doctor).await?;
        info!(target: "audit", action = "add doctor", entity = %doctor.id, "Doctor {} added", doctor.full_name());

        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        self.store.get_doctor(doctor_id).await?
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self.store.list_doctors().await?)
    }

    pub async fn search_doctors_by_name(&self, name: &str) -> Result<Vec<Doctor>, DoctorError> {
        let doctors = self.store.list_doctors().await?;
        Ok(doctors.into_iter()
            .filter(|doctor| name_matches(&doctor.first_name, &doctor.last_name, name))
            .collect())
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);

        let doctor = self.edit(doctor_id, |current| {
            Ok(Doctor {
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
                specializations: request.specializations.unwrap_or(current.specializations),
            })
        }).await?;
        info!(target: "audit", action = "update doctor", entity = %doctor_id, "Doctor updated");

        Ok(doctor)
    }

    pub async fn add_specialization(
        &self,
        doctor_id: Uuid,
        category: TreatmentCategory,
    ) -> Result<Doctor, DoctorError> {
        self.edit(doctor_id, |mut doctor| {
            doctor.specializations.insert(category);
            Ok(doctor)
        }).await
    }

    pub async fn remove_specialization(
        &self,
        doctor_id: Uuid,
        category: TreatmentCategory,
    ) -> Result<Doctor, DoctorError> {
        self.edit(doctor_id, |mut doctor| {
            doctor.specializations.remove(&category);
            Ok(doctor)
        }).await
    }

    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        let _writing = self.writes.acquire().await;
        if !self.store.doctor_exists(doctor_id).await? {
            return Err(DoctorError::NotFound(doctor_id));
        }

        self.store.delete_doctor(doctor_id).await?;
        info!(target: "audit", action = "delete doctor", entity = %doctor_id, "Doctor deleted");

        Ok(())
    }

    /// Re-reads the doctor under the write lock and stores `change` applied to it.
    async fn edit<F>(&self, doctor_id: Uuid, change: F) -> Result<Doctor, DoctorError>
    where
        F: FnOnce(Doctor) -> Result<Doctor, DoctorError>,
    {
        let _writing = self.writes.acquire().await;

        let updated = change(self.get_doctor(doctor_id).await?)?;
        self.ensure_unique(&updated).await?;

        Ok(self.store.update_doctor(doctor_id, updated).await?)
    }

    async fn ensure_unique(&self, doctor: &Doctor) -> Result<(), DoctorError> {
        let taken = self.store.list_doctors().await?
            .into_iter()
            .any(|other| other.id != doctor.id && other == *doctor);

        if taken {
            warn!("Rejected duplicate doctor record for {}", doctor.full_name());
            return Err(DoctorError::DuplicateIdentity(doctor.full_name()));
        }
        Ok(())
    }
}

fn required_name(raw: &str, field: &str) -> Result<String, DoctorError> {
    let name = normalize_name(raw);
    if name.is_empty() {
        return Err(DoctorError::ValidationError(format!("Doctor {} must not be empty", field)));
    }
    Ok(name)
}

fn valid_email(raw: &str) -> Result<String, DoctorError> {
    normalize_email(raw)
        .ok_or_else(|| DoctorError::ValidationError(format!("Not a valid email address: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_database::InMemoryRecordStore;
    use shared_models::Address;

    fn service() -> DoctorService {
        DoctorService::new(Arc::new(InMemoryRecordStore::new()), Arc::new(DoctorRecordLock::new()))
    }

    fn request(first_name: &str, last_name: &str) -> CreateDoctorRequest {
        CreateDoctorRequest {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}.{}@clinic.com", first_name, last_name),
            phone_number: "0722000000".to_string(),
            address: Address::default(),
            specializations: [TreatmentCategory::Cardiology].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_identity_is_rejected_on_create() {
        let doctors = service();
        doctors.create_doctor(request("John", "Smith")).await.unwrap();

        // Same identity once names and email are normalized.
        assert_matches!(
            doctors.create_doctor(request("JOHN", "smith")).await,
            Err(DoctorError::DuplicateIdentity(_))
        );
        assert_eq!(doctors.list_doctors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_identity_is_rejected_on_update() {
        let doctors = service();
        doctors.create_doctor(request("John", "Smith")).await.unwrap();
        let other = doctors.create_doctor(request("Emma", "Jones")).await.unwrap();

        let result = doctors.update_doctor(other.id, UpdateDoctorRequest {
            first_name: Some("John".to_string()),
            last_name: Some("Smith".to_string()),
            email: Some("john.smith@clinic.com".to_string()),
            ..UpdateDoctorRequest::default()
        }).await;

        assert_matches!(result, Err(DoctorError::DuplicateIdentity(_)));
        assert_eq!(doctors.get_doctor(other.id).await.unwrap().last_name, "Jones");

        // Rewriting a doctor's own identity is not a duplicate.
        let same = doctors.update_doctor(other.id, UpdateDoctorRequest {
            phone_number: Some(" 0722000000 ".to_string()),
            ..UpdateDoctorRequest::default()
        }).await;
        assert!(same.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_creates_of_one_identity() {
        let doctors = Arc::new(service());

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let doctors = doctors.clone();
                tokio::spawn(async move { doctors.create_doctor(request("John", "Smith")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(doctors.list_doctors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_specialization_edits_are_all_kept() {
        let doctors = Arc::new(service());
        let doctor = doctors.create_doctor(request("John", "Smith")).await.unwrap();

        let added: Vec<_> = [TreatmentCategory::Dermatology, TreatmentCategory::Neurology, TreatmentCategory::Pediatrics]
            .into_iter()
            .map(|category| {
                let doctors = doctors.clone();
                tokio::spawn(async move { doctors.add_specialization(doctor.id, category).await })
            })
            .collect();
        for handle in added {
            handle.await.unwrap().unwrap();
        }

        let stored = doctors.get_doctor(doctor.id).await.unwrap();
        assert_eq!(stored.specializations.len(), 4);
    }
}
