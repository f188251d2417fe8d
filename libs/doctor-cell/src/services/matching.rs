use std::sync::Arc;

use tracing::{debug, info};

use shared_database::{RecordStore, StoreResult};
use shared_models::{Doctor, Treatment, TreatmentCategory};

/// Doctors qualified for `category`, in input order. Empty when nobody is.
pub fn doctors_for_category(category: TreatmentCategory, doctors: &[Doctor]) -> Vec<Doctor> {
    doctors.iter()
        .filter(|doctor| doctor.offers(category))
        .cloned()
        .collect()
}

/// Treatments classified under `category`, in input order.
pub fn treatments_for_category(category: TreatmentCategory, treatments: &[Treatment]) -> Vec<Treatment> {
    treatments.iter()
        .filter(|treatment| treatment.is_in(category))
        .cloned()
        .collect()
}

pub struct SpecializationMatcher {
    store: Arc<dyn RecordStore>,
}

impl SpecializationMatcher {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn doctors_for(&self, category: TreatmentCategory) -> StoreResult<Vec<Doctor>> {
        let doctors = self.store.list_doctors().await?;
        let matching = doctors_for_category(category, &doctors);

        if matching.is_empty() {
            info!("No doctors available for category {}", category);
        } else {
            debug!("{} of {} doctors offer {}", matching.len(), doctors.len(), category);
        }

        Ok(matching)
    }

    pub async fn treatments_for(&self, category: TreatmentCategory) -> StoreResult<Vec<Treatment>> {
        let treatments = self.store.list_treatments().await?;
        let matching = treatments_for_category(category, &treatments);

        if matching.is_empty() {
            info!("No treatments available for category {}", category);
        }

        Ok(matching)
    }
}
