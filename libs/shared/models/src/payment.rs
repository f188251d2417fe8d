use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::person::Patient;
use crate::treatment::Treatment;

/// A settled bill. `treatments` is a snapshot of what was billed, so later
/// price changes on the catalogue do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub patient: Patient,
    pub treatments: Vec<Treatment>,
    pub total_amount: f64,
    pub payment_date: NaiveDateTime,
}

impl Payment {
    pub fn total_of(treatments: &[Treatment]) -> f64 {
        treatments.iter().map(|t| t.price).sum()
    }
}
