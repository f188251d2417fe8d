use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::RecordStore;
use shared_models::{name_matches, Payment, Treatment};

use crate::models::{CreatePaymentRequest, PaymentError, UpdatePaymentRequest};

pub struct PaymentService {
    store: Arc<dyn RecordStore>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create_payment(&self, request: CreatePaymentRequest) -> Result<Payment, PaymentError> {
        let patient = self.store.get_patient(request.patient_id).await?
            .ok_or(PaymentError::PatientNotFound(request.patient_id))?;
        let treatments = self.billed_treatments(&request.treatment_ids).await?;

        let payment = Payment {
            id: Uuid::new_v4(),
            patient,
            total_amount: Payment::total_of(&treatments),
            treatments,
            payment_date: request.payment_date.unwrap_or_else(|| Local::now().naive_local()),
        };

        let payment = self.store.insert_payment(payment).await?;
        info!(
            target: "audit",
            action = "add payment",
            entity = %payment.id,
            "Payment of {:.2} recorded for {}",
            payment.total_amount,
            payment.patient.full_name()
        );

        Ok(payment)
    }

    pub async fn get_payment(&self, payment_id: Uuid) -> Result<Payment, PaymentError> {
        self.store.get_payment(payment_id).await?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, PaymentError> {
        Ok(self.store.list_payments().await?)
    }

    pub async fn payments_for_patient(&self, name: &str) -> Result<Vec<Payment>, PaymentError> {
        let payments = self.store.list_payments().await?;
        Ok(payments.into_iter()
            .filter(|p| name_matches(&p.patient.first_name, &p.patient.last_name, name))
            .collect())
    }

    pub async fn update_payment(
        &self,
        payment_id: Uuid,
        request: UpdatePaymentRequest,
    ) -> Result<Payment, PaymentError> {
        let current = self.get_payment(payment_id).await?;

        let patient = match request.patient_id {
            Some(patient_id) => self.store.get_patient(patient_id).await?
                .ok_or(PaymentError::PatientNotFound(patient_id))?,
            None => current.patient,
        };
        let treatments = match request.treatment_ids {
            Some(ids) => self.billed_treatments(&ids).await?,
            None => current.treatments,
        };

        let updated = Payment {
            id: current.id,
            patient,
            total_amount: Payment::total_of(&treatments),
            treatments,
            payment_date: request.payment_date.unwrap_or(current.payment_date),
        };

        let payment = self.store.update_payment(payment_id, updated).await?;
        info!(target: "audit", action = "update payment", entity = %payment_id, "Payment updated");

        Ok(payment)
    }

    pub async fn delete_payment(&self, payment_id: Uuid) -> Result<(), PaymentError> {
        if !self.store.payment_exists(payment_id).await? {
            return Err(PaymentError::NotFound(payment_id));
        }

        self.store.delete_payment(payment_id).await?;
        info!(target: "audit", action = "delete payment", entity = %payment_id, "Payment deleted");

        Ok(())
    }

    /// Looks up each treatment once, in first-seen order; repeated ids are
    /// billed a single time.
    async fn billed_treatments(&self, ids: &[Uuid]) -> Result<Vec<Treatment>, PaymentError> {
        let mut unique: Vec<Uuid> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        if unique.is_empty() {
            return Err(PaymentError::NoTreatments);
        }
        if unique.len() < ids.len() {
            debug!("Ignoring {} repeated treatment ids", ids.len() - unique.len());
        }

        let mut treatments = Vec::with_capacity(unique.len());
        for id in unique {
            let treatment = self.store.get_treatment(id).await?
                .ok_or(PaymentError::TreatmentNotFound(id))?;
            treatments.push(treatment);
        }
        Ok(treatments)
    }
}
