use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::treatment::TreatmentCategory;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub country: String,
    pub city: String,
    pub street: String,
    pub number: i32,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}, {}", self.street, self.number, self.city, self.country)
    }
}

/// "jOHN" -> "John". Names are stored capitalised.
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Lowercased email, or `None` when it has no `@`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    email.contains('@').then_some(email)
}

/// Case-insensitive match of `query` against a first name, last name or the
/// full "first last" form.
pub fn name_matches(first_name: &str, last_name: &str, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }
    let full = format!("{} {}", first_name, last_name).to_lowercase();
    full.contains(&query)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: Address,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub medical_history: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Completed years of age on the given day.
    pub fn age_on(&self, day: NaiveDate) -> u32 {
        day.years_since(self.birth_date).unwrap_or(0)
    }

    pub fn age(&self) -> u32 {
        self.age_on(Local::now().date_naive())
    }
}

/// A doctor and the set of categories they are qualified to treat.
///
/// Two doctors compare equal when first name, last name, email and phone
/// number match, whatever their ids or specialization sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: Address,
    #[serde(default)]
    pub specializations: BTreeSet<TreatmentCategory>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn offers(&self, category: TreatmentCategory) -> bool {
        self.specializations.contains(&category)
    }
}

impl PartialEq for Doctor {
    fn eq(&self, other: &Self) -> bool {
        self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.email == other.email
            && self.phone_number == other.phone_number
    }
}

impl Eq for Doctor {}

impl Hash for Doctor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.first_name.hash(state);
        self.last_name.hash(state);
        self.email.hash(state);
        self.phone_number.hash(state);
    }
}
