use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{Appointment, AppointmentStatus, Doctor, Patient, Payment, Treatment};

use crate::store::{RecordStore, StoreError, StoreResult};

/// Process-local record store. Rows keep insertion order and appointments
/// reference their patient, doctor and treatment by id, so edits to those
/// records show up in every appointment that points at them.
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct Tables {
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
    treatments: Vec<Treatment>,
    appointments: Vec<AppointmentRow>,
    payments: Vec<PaymentRow>,
}

#[derive(Debug, Clone)]
struct AppointmentRow {
    id: Uuid,
    date: NaiveDateTime,
    patient_id: Uuid,
    treatment_id: Uuid,
    doctor_id: Uuid,
    status: AppointmentStatus,
}

impl From<&Appointment> for AppointmentRow {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            date: appointment.date,
            patient_id: appointment.patient.id,
            treatment_id: appointment.treatment.id,
            doctor_id: appointment.doctor.id,
            status: appointment.status,
        }
    }
}

#[derive(Debug, Clone)]
struct PaymentRow {
    id: Uuid,
    patient_id: Uuid,
    treatments: Vec<Treatment>,
    total_amount: f64,
    payment_date: NaiveDateTime,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            patient_id: payment.patient.id,
            treatments: payment.treatments.clone(),
            total_amount: payment.total_amount,
            payment_date: payment.payment_date,
        }
    }
}

trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Patient {
    fn key(&self) -> Uuid { self.id }
}

impl Keyed for Doctor {
    fn key(&self) -> Uuid { self.id }
}

impl Keyed for Treatment {
    fn key(&self) -> Uuid { self.id }
}

impl Keyed for AppointmentRow {
    fn key(&self) -> Uuid { self.id }
}

impl Keyed for PaymentRow {
    fn key(&self) -> Uuid { self.id }
}

fn find<T: Keyed + Clone>(rows: &[T], id: Uuid) -> Option<T> {
    rows.iter().find(|row| row.key() == id).cloned()
}

fn insert<T: Keyed>(rows: &mut Vec<T>, value: T, entity: &'static str) -> StoreResult<()> {
    if rows.iter().any(|row| row.key() == value.key()) {
        return Err(StoreError::Conflict(format!("{} {} already exists", entity, value.key())));
    }
    rows.push(value);
    Ok(())
}

fn replace<T: Keyed>(rows: &mut [T], id: Uuid, value: T, entity: &'static str) -> StoreResult<()> {
    let slot = rows.iter_mut()
        .find(|row| row.key() == id)
        .ok_or(StoreError::NoRowsAffected { entity, id })?;
    *slot = value;
    Ok(())
}

fn remove<T: Keyed>(rows: &mut Vec<T>, id: Uuid, entity: &'static str) -> StoreResult<()> {
    let before = rows.len();
    rows.retain(|row| row.key() != id);
    if rows.len() == before {
        return Err(StoreError::NoRowsAffected { entity, id });
    }
    Ok(())
}

impl Tables {
    fn hydrate_appointment(&self, row: &AppointmentRow) -> StoreResult<Appointment> {
        Ok(Appointment {
            id: row.id,
            date: row.date,
            patient: find(&self.patients, row.patient_id)
                .ok_or_else(|| dangling("appointment", row.id, "patient", row.patient_id))?,
            treatment: find(&self.treatments, row.treatment_id)
                .ok_or_else(|| dangling("appointment", row.id, "treatment", row.treatment_id))?,
            doctor: find(&self.doctors, row.doctor_id)
                .ok_or_else(|| dangling("appointment", row.id, "doctor", row.doctor_id))?,
            status: row.status,
        })
    }

    fn hydrate_payment(&self, row: &PaymentRow) -> StoreResult<Payment> {
        Ok(Payment {
            id: row.id,
            patient: find(&self.patients, row.patient_id)
                .ok_or_else(|| dangling("payment", row.id, "patient", row.patient_id))?,
            treatments: row.treatments.clone(),
            total_amount: row.total_amount,
            payment_date: row.payment_date,
        })
    }

    fn check_appointment_references(&self, row: &AppointmentRow) -> StoreResult<()> {
        if find(&self.patients, row.patient_id).is_none() {
            return Err(dangling("appointment", row.id, "patient", row.patient_id));
        }
        if find(&self.treatments, row.treatment_id).is_none() {
            return Err(dangling("appointment", row.id, "treatment", row.treatment_id));
        }
        if find(&self.doctors, row.doctor_id).is_none() {
            return Err(dangling("appointment", row.id, "doctor", row.doctor_id));
        }
        Ok(())
    }

    fn check_unreferenced(&self, entity: &'static str, id: Uuid) -> StoreResult<()> {
        let referenced = self.appointments.iter().any(|row| match entity {
            "patient" => row.patient_id == id,
            "doctor" => row.doctor_id == id,
            "treatment" => row.treatment_id == id,
            _ => false,
        }) || (entity == "patient" && self.payments.iter().any(|row| row.patient_id == id));

        if referenced {
            return Err(StoreError::Conflict(format!("{} {} is still referenced", entity, id)));
        }
        Ok(())
    }
}

fn dangling(owner: &str, owner_id: Uuid, entity: &str, id: Uuid) -> StoreError {
    StoreError::Conflict(format!("{} {} references missing {} {}", owner, owner_id, entity, id))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.tables.read().await.patients.clone())
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(find(&self.tables.read().await.patients, id))
    }

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        insert(&mut self.tables.write().await.patients, patient.clone(), "patient")?;
        debug!("Stored patient {}", patient.id);
        Ok(patient)
    }

    async fn update_patient(&self, id: Uuid, mut patient: Patient) -> StoreResult<Patient> {
        patient.id = id;
        replace(&mut self.tables.write().await.patients, id, patient.clone(), "patient")?;
        Ok(patient)
    }

    async fn delete_patient(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_unreferenced("patient", id)?;
        remove(&mut tables.patients, id, "patient")
    }

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        Ok(self.tables.read().await.doctors.clone())
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>> {
        Ok(find(&self.tables.read().await.doctors, id))
    }

    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        insert(&mut self.tables.write().await.doctors, doctor.clone(), "doctor")?;
        debug!("Stored doctor {}", doctor.id);
        Ok(doctor)
    }

    async fn update_doctor(&self, id: Uuid, mut doctor: Doctor) -> StoreResult<Doctor> {
        doctor.id = id;
        replace(&mut self.tables.write().await.doctors, id, doctor.clone(), "doctor")?;
        Ok(doctor)
    }

    async fn delete_doctor(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_unreferenced("doctor", id)?;
        remove(&mut tables.doctors, id, "doctor")
    }

    async fn list_treatments(&self) -> StoreResult<Vec<Treatment>> {
        Ok(self.tables.read().await.treatments.clone())
    }

    async fn get_treatment(&self, id: Uuid) -> StoreResult<Option<Treatment>> {
        Ok(find(&self.tables.read().await.treatments, id))
    }

    async fn insert_treatment(&self, treatment: Treatment) -> StoreResult<Treatment> {
        insert(&mut self.tables.write().await.treatments, treatment.clone(), "treatment")?;
        debug!("Stored treatment {}", treatment.id);
        Ok(treatment)
    }

    async fn update_treatment(&self, id: Uuid, mut treatment: Treatment) -> StoreResult<Treatment> {
        treatment.id = id;
        replace(&mut self.tables.write().await.treatments, id, treatment.clone(), "treatment")?;
        Ok(treatment)
    }

    async fn delete_treatment(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_unreferenced("treatment", id)?;
        remove(&mut tables.treatments, id, "treatment")
    }

    async fn list_appointments(&self) -> StoreResult<Vec<Appointment>> {
        let tables = self.tables.read().await;
        tables.appointments.iter()
            .map(|row| tables.hydrate_appointment(row))
            .collect()
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        let tables = self.tables.read().await;
        find(&tables.appointments, id)
            .map(|row| tables.hydrate_appointment(&row))
            .transpose()
    }

    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.write().await;
        let row = AppointmentRow::from(&appointment);
        tables.check_appointment_references(&row)?;
        insert(&mut tables.appointments, row.clone(), "appointment")?;
        debug!("Stored appointment {} at {}", row.id, row.date);
        tables.hydrate_appointment(&row)
    }

    async fn update_appointment(&self, id: Uuid, appointment: Appointment) -> StoreResult<Appointment> {
        let mut tables = self.tables.write().await;
        let mut row = AppointmentRow::from(&appointment);
        row.id = id;
        tables.check_appointment_references(&row)?;
        replace(&mut tables.appointments, id, row.clone(), "appointment")?;
        tables.hydrate_appointment(&row)
    }

    async fn delete_appointment(&self, id: Uuid) -> StoreResult<()> {
        remove(&mut self.tables.write().await.appointments, id, "appointment")
    }

    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        tables.payments.iter()
            .map(|row| tables.hydrate_payment(row))
            .collect()
    }

    async fn get_payment(&self, id: Uuid) -> StoreResult<Option<Payment>> {
        let tables = self.tables.read().await;
        find(&tables.payments, id)
            .map(|row| tables.hydrate_payment(&row))
            .transpose()
    }

    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment> {
        let mut tables = self.tables.write().await;
        let row = PaymentRow::from(&payment);
        if find(&tables.patients, row.patient_id).is_none() {
            return Err(dangling("payment", row.id, "patient", row.patient_id));
        }
        insert(&mut tables.payments, row.clone(), "payment")?;
        tables.hydrate_payment(&row)
    }

    async fn update_payment(&self, id: Uuid, payment: Payment) -> StoreResult<Payment> {
        let mut tables = self.tables.write().await;
        let mut row = PaymentRow::from(&payment);
        row.id = id;
        if find(&tables.patients, row.patient_id).is_none() {
            return Err(dangling("payment", row.id, "patient", row.patient_id));
        }
        replace(&mut tables.payments, id, row.clone(), "payment")?;
        tables.hydrate_payment(&row)
    }

    async fn delete_payment(&self, id: Uuid) -> StoreResult<()> {
        remove(&mut self.tables.write().await.payments, id, "payment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use shared_models::{Address, Gender, TreatmentCategory};

    fn patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            first_name: "Maria".to_string(),
            last_name: "Ionescu".to_string(),
            email: "maria@example.com".to_string(),
            phone_number: "0711111111".to_string(),
            address: Address::default(),
            birth_date: NaiveDate::from_ymd_opt(1985, 3, 2).unwrap(),
            gender: Gender::Female,
            medical_history: "none".to_string(),
        }
    }

    fn doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            email: "smith@clinic.com".to_string(),
            phone_number: "0722222222".to_string(),
            address: Address::default(),
            specializations: [TreatmentCategory::Cardiology].into_iter().collect(),
        }
    }

    fn treatment() -> Treatment {
        Treatment {
            id: Uuid::new_v4(),
            name: "ECG".to_string(),
            category: TreatmentCategory::Cardiology,
            price: 120.0,
        }
    }

    async fn seeded() -> (InMemoryRecordStore, Appointment) {
        let store = InMemoryRecordStore::new();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            patient: store.insert_patient(patient()).await.unwrap(),
            treatment: store.insert_treatment(treatment()).await.unwrap(),
            doctor: store.insert_doctor(doctor()).await.unwrap(),
            status: AppointmentStatus::Scheduled,
        };
        let appointment = store.insert_appointment(appointment).await.unwrap();
        (store, appointment)
    }

    #[tokio::test]
    async fn test_appointments_reflect_referenced_record_edits() {
        let (store, appointment) = seeded().await;

        let mut renamed = appointment.patient.clone();
        renamed.last_name = "Popescu".to_string();
        store.update_patient(renamed.id, renamed).await.unwrap();

        let reloaded = store.get_appointment(appointment.id).await.unwrap().unwrap();
        assert_eq!(reloaded.patient.last_name, "Popescu");
    }

    #[tokio::test]
    async fn test_delete_of_referenced_doctor_is_refused() {
        let (store, appointment) = seeded().await;

        let result = store.delete_doctor(appointment.doctor.id).await;
        assert_matches!(result, Err(StoreError::Conflict(_)));
        assert!(store.doctor_exists(appointment.doctor.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_of_missing_row_affects_nothing() {
        let store = InMemoryRecordStore::new();
        let missing = patient();

        let result = store.update_patient(missing.id, missing.clone()).await;
        assert_matches!(result, Err(StoreError::NoRowsAffected { entity: "patient", .. }));
        assert_matches!(store.delete_appointment(Uuid::new_v4()).await, Err(StoreError::NoRowsAffected { .. }));
    }

    #[tokio::test]
    async fn test_appointment_with_unknown_patient_is_refused() {
        let (store, appointment) = seeded().await;

        let mut orphan = appointment.clone();
        orphan.id = Uuid::new_v4();
        orphan.patient.id = Uuid::new_v4();

        assert_matches!(store.insert_appointment(orphan).await, Err(StoreError::Conflict(_)));
        assert_eq!(store.list_appointments().await.unwrap().len(), 1);
    }
}
