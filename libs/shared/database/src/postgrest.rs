use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{Appointment, Doctor, Patient, Payment, Treatment};

use crate::store::{RecordStore, StoreError, StoreResult};
use crate::supabase::SupabaseClient;

const APPOINTMENT_SELECT: &str =
    "*,patient:patients(*),doctor:doctors(*),treatment:treatments(*)";
const PAYMENT_SELECT: &str = "*,patient:patients(*)";

/// Record store backed by a PostgREST (Supabase) endpoint.
///
/// Expected tables: `patients`, `doctors` (`specializations text[]`),
/// `treatments`, `appointments` (`patient_id`, `doctor_id`, `treatment_id`
/// foreign keys) and `payments` (`patient_id`, `treatments jsonb`).
pub struct SupabaseRecordStore {
    supabase: SupabaseClient,
    token: String,
}

impl SupabaseRecordStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            token: config.store_token().to_string(),
        }
    }

    fn representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        filter: Option<Uuid>,
        order: Option<&str>,
    ) -> StoreResult<Vec<T>> {
        let mut path = format!("/rest/v1/{}?select={}", table, urlencoding::encode(select));
        if let Some(id) = filter {
            path.push_str(&format!("&id=eq.{}", id));
        }
        if let Some(order) = order {
            path.push_str(&format!("&order={}", order));
        }

        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(&self.token),
            None,
        ).await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        id: Uuid,
    ) -> StoreResult<Option<T>> {
        let rows = self.select_rows(table, select, Some(id), None).await?;
        Ok(rows.into_iter().next())
    }

    async fn write_row<T: DeserializeOwned>(
        &self,
        method: Method,
        table: &'static str,
        select: &str,
        id: Uuid,
        row: Value,
    ) -> StoreResult<T> {
        let path = if method == Method::POST {
            format!("/rest/v1/{}?select={}", table, urlencoding::encode(select))
        } else {
            format!("/rest/v1/{}?id=eq.{}&select={}", table, id, urlencoding::encode(select))
        };

        let rows: Vec<Value> = self.supabase.request_with_headers(
            method,
            &path,
            Some(&self.token),
            Some(row),
            Some(Self::representation()),
        ).await?;

        let row = rows.into_iter()
            .next()
            .ok_or(StoreError::NoRowsAffected { entity: entity_name(table), id })?;
        debug!("Wrote {} row {}", table, id);
        Ok(serde_json::from_value(row)?)
    }

    async fn delete_row(&self, table: &'static str, id: Uuid) -> StoreResult<()> {
        let path = format!("/rest/v1/{}?id=eq.{}", table, id);

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            Some(&self.token),
            None,
            Some(Self::representation()),
        ).await?;

        if rows.is_empty() {
            return Err(StoreError::NoRowsAffected { entity: entity_name(table), id });
        }
        debug!("Deleted {} row {}", table, id);
        Ok(())
    }

    async fn insert_plain<T: Serialize + DeserializeOwned>(
        &self,
        table: &'static str,
        id: Uuid,
        value: &T,
    ) -> StoreResult<T> {
        self.write_row(Method::POST, table, "*", id, serde_json::to_value(value)?).await
    }

    async fn update_plain<T: Serialize + DeserializeOwned>(
        &self,
        table: &'static str,
        id: Uuid,
        value: &T,
    ) -> StoreResult<T> {
        let mut row = serde_json::to_value(value)?;
        if let Some(fields) = row.as_object_mut() {
            fields.insert("id".to_string(), json!(id));
        }
        self.write_row(Method::PATCH, table, "*", id, row).await
    }
}

fn entity_name(table: &str) -> &'static str {
    match table {
        "patients" => "patient",
        "doctors" => "doctor",
        "treatments" => "treatment",
        "appointments" => "appointment",
        "payments" => "payment",
        _ => "record",
    }
}

fn appointment_row(id: Uuid, appointment: &Appointment) -> Value {
    json!({
        "id": id,
        "date": appointment.date,
        "patient_id": appointment.patient.id,
        "doctor_id": appointment.doctor.id,
        "treatment_id": appointment.treatment.id,
        "status": appointment.status,
    })
}

fn payment_row(id: Uuid, payment: &Payment) -> Value {
    json!({
        "id": id,
        "patient_id": payment.patient.id,
        "treatments": payment.treatments,
        "total_amount": payment.total_amount,
        "payment_date": payment.payment_date,
    })
}

#[async_trait]
impl RecordStore for SupabaseRecordStore {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        self.select_rows("patients", "*", None, Some("last_name.asc")).await
    }

    async fn get_patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        self.select_one("patients", "*", id).await
    }

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        self.insert_plain("patients", patient.id, &patient).await
    }

    async fn update_patient(&self, id: Uuid, patient: Patient) -> StoreResult<Patient> {
        self.update_plain("patients", id, &patient).await
    }

    async fn delete_patient(&self, id: Uuid) -> StoreResult<()> {
        self.delete_row("patients", id).await
    }

    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        self.select_rows("doctors", "*", None, Some("last_name.asc")).await
    }

    async fn get_doctor(&self, id: Uuid) -> StoreResult<Option<Doctor>> {
        self.select_one("doctors", "*", id).await
    }

    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        self.insert_plain("doctors", doctor.id, &doctor).await
    }

    async fn update_doctor(&self, id: Uuid, doctor: Doctor) -> StoreResult<Doctor> {
        self.update_plain("doctors", id, &doctor).await
    }

    async fn delete_doctor(&self, id: Uuid) -> StoreResult<()> {
        self.delete_row("doctors", id).await
    }

    async fn list_treatments(&self) -> StoreResult<Vec<Treatment>> {
        self.select_rows("treatments", "*", None, Some("name.asc")).await
    }

    async fn get_treatment(&self, id: Uuid) -> StoreResult<Option<Treatment>> {
        self.select_one("treatments", "*", id).await
    }

    async fn insert_treatment(&self, treatment: Treatment) -> StoreResult<Treatment> {
        self.insert_plain("treatments", treatment.id, &treatment).await
    }

    async fn update_treatment(&self, id: Uuid, treatment: Treatment) -> StoreResult<Treatment> {
        self.update_plain("treatments", id, &treatment).await
    }

    async fn delete_treatment(&self, id: Uuid) -> StoreResult<()> {
        self.delete_row("treatments", id).await
    }

    async fn list_appointments(&self) -> StoreResult<Vec<Appointment>> {
        self.select_rows("appointments", APPOINTMENT_SELECT, None, Some("date.asc")).await
    }

    async fn get_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        self.select_one("appointments", APPOINTMENT_SELECT, id).await
    }

    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let row = appointment_row(appointment.id, &appointment);
        self.write_row(Method::POST, "appointments", APPOINTMENT_SELECT, appointment.id, row).await
    }

    async fn update_appointment(&self, id: Uuid, appointment: Appointment) -> StoreResult<Appointment> {
        let row = appointment_row(id, &appointment);
        self.write_row(Method::PATCH, "appointments", APPOINTMENT_SELECT, id, row).await
    }

    async fn delete_appointment(&self, id: Uuid) -> StoreResult<()> {
        self.delete_row("appointments", id).await
    }

    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        self.select_rows("payments", PAYMENT_SELECT, None, Some("payment_date.asc")).await
    }

    async fn get_payment(&self, id: Uuid) -> StoreResult<Option<Payment>> {
        self.select_one("payments", PAYMENT_SELECT, id).await
    }

    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment> {
        let row = payment_row(payment.id, &payment);
        self.write_row(Method::POST, "payments", PAYMENT_SELECT, payment.id, row).await
    }

    async fn update_payment(&self, id: Uuid, payment: Payment) -> StoreResult<Payment> {
        let row = payment_row(id, &payment);
        self.write_row(Method::PATCH, "payments", PAYMENT_SELECT, id, row).await
    }

    async fn delete_payment(&self, id: Uuid) -> StoreResult<()> {
        self.delete_row("payments", id).await
    }
}
