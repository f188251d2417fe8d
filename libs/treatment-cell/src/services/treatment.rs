use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_database::RecordStore;
use shared_models::Treatment;

use crate::models::{CreateTreatmentRequest, TreatmentError, UpdateTreatmentRequest};

pub struct TreatmentService {
    store: Arc<dyn RecordStore>,
}

impl TreatmentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create_treatment(&self, request: CreateTreatmentRequest) -> Result<Treatment, TreatmentError> {
        debug!("Creating treatment: {}", request.name);

        let treatment = Treatment {
            id: Uuid::new_v4(),
            name: required_name(&request.name)?,
            category: request.category,
            price: valid_price(request.price)?,
        };

        let treatment = self.store.insert_treatment(treatment).await?;
        info!(target: "audit", action = "add treatment", entity = %treatment.id, "Treatment {} added", treatment.name);

        Ok(treatment)
    }

    pub async fn get_treatment(&self, treatment_id: Uuid) -> Result<Treatment, TreatmentError> {
        self.store.get_treatment(treatment_id).await?
            .ok_or(TreatmentError::NotFound(treatment_id))
    }

    pub async fn list_treatments(&self) -> Result<Vec<Treatment>, TreatmentError> {
        Ok(self.store.list_treatments().await?)
    }

    /// Case-insensitive substring match on the treatment name.
    pub async fn search_treatments_by_name(&self, name: &str) -> Result<Vec<Treatment>, TreatmentError> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let treatments = self.store.list_treatments().await?;
        Ok(treatments.into_iter()
            .filter(|treatment| treatment.name.to_lowercase().contains(&query))
            .collect())
    }

    pub async fn update_treatment(
        &self,
        treatment_id: Uuid,
        request: UpdateTreatmentRequest,
    ) -> Result<Treatment, TreatmentError> {
        let current = self.get_treatment(treatment_id).await?;
        let updated = Treatment {
            id: current.id,
            name: match request.name {
                Some(name) => required_name(&name)?,
                None => current.name,
            },
            category: request.category.unwrap_or(current.category),
            price: match request.price {
                Some(price) => valid_price(price)?,
                None => current.price,
            },
        };

        let treatment = self.store.update_treatment(treatment_id, updated).await?;
        info!(target: "audit", action = "update treatment", entity = %treatment_id, "Treatment updated");

        Ok(treatment)
    }

    pub async fn delete_treatment(&self, treatment_id: Uuid) -> Result<(), TreatmentError> {
        if !self.store.treatment_exists(treatment_id).await? {
            return Err(TreatmentError::NotFound(treatment_id));
        }

        self.store.delete_treatment(treatment_id).await?;
        info!(target: "audit", action = "delete treatment", entity = %treatment_id, "Treatment deleted");

        Ok(())
    }
}

fn required_name(raw: &str) -> Result<String, TreatmentError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(TreatmentError::EmptyName);
    }
    Ok(name.to_string())
}

fn valid_price(price: f64) -> Result<f64, TreatmentError> {
    if !price.is_finite() || price < 0.0 {
        return Err(TreatmentError::InvalidPrice(price));
    }
    Ok(price)
}
