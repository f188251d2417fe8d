use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{InMemoryRecordStore, RecordStore};
use shared_models::{
    Address, Appointment, AppointmentStatus, Doctor, Gender, Patient, Treatment, TreatmentCategory,
};

use crate::state::AppState;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            ..AppConfig::default()
        }
    }
}

/// Builders for clinic records used across cell tests.
pub struct ClinicFixtures;

impl ClinicFixtures {
    pub fn address() -> Address {
        Address {
            country: "Romania".to_string(),
            city: "Bucharest".to_string(),
            street: "Victoriei".to_string(),
            number: 12,
        }
    }

    pub fn patient(first_name: &str, last_name: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}.{}@example.com", first_name, last_name).to_lowercase(),
            phone_number: "0711111111".to_string(),
            address: Self::address(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Female,
            medical_history: "No known allergies".to_string(),
        }
    }

    pub fn doctor(first_name: &str, last_name: &str, specializations: &[TreatmentCategory]) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}.{}@clinic.com", first_name, last_name).to_lowercase(),
            phone_number: "0722222222".to_string(),
            address: Self::address(),
            specializations: specializations.iter().copied().collect(),
        }
    }

    pub fn treatment(name: &str, category: TreatmentCategory, price: f64) -> Treatment {
        Treatment {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category,
            price,
        }
    }

    pub fn appointment(patient: &Patient, treatment: &Treatment, doctor: &Doctor, date: NaiveDateTime) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            date,
            patient: patient.clone(),
            treatment: treatment.clone(),
            doctor: doctor.clone(),
            status: AppointmentStatus::Scheduled,
        }
    }

    /// `y-m-d` at `hour:00`.
    pub fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}

/// A small clinic: Dr. Smith (cardiology), Dr. Jones (dermatology), one
/// patient and one treatment per category, already persisted.
pub struct SeededClinic {
    pub state: AppState,
    pub store: Arc<dyn RecordStore>,
    pub smith: Doctor,
    pub jones: Doctor,
    pub patient: Patient,
    pub ecg: Treatment,
    pub peeling: Treatment,
}

impl SeededClinic {
    pub async fn new() -> Self {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let state = AppState::with_store(TestConfig::default().to_app_config(), store.clone());

        let smith = store
            .insert_doctor(ClinicFixtures::doctor("John", "Smith", &[TreatmentCategory::Cardiology]))
            .await
            .unwrap();
        let jones = store
            .insert_doctor(ClinicFixtures::doctor("Emma", "Jones", &[TreatmentCategory::Dermatology]))
            .await
            .unwrap();
        let patient = store
            .insert_patient(ClinicFixtures::patient("Maria", "Ionescu"))
            .await
            .unwrap();
        let ecg = store
            .insert_treatment(ClinicFixtures::treatment("ECG", TreatmentCategory::Cardiology, 120.0))
            .await
            .unwrap();
        let peeling = store
            .insert_treatment(ClinicFixtures::treatment("Chemical peeling", TreatmentCategory::Dermatology, 80.0))
            .await
            .unwrap();

        Self { state, store, smith, jones, patient, ecg, peeling }
    }

    pub async fn book(&self, doctor: &Doctor, treatment: &Treatment, date: NaiveDateTime) -> Appointment {
        self.store
            .insert_appointment(ClinicFixtures::appointment(&self.patient, treatment, doctor, date))
            .await
            .unwrap()
    }
}
