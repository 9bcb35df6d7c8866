use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pending signup awaiting admin approval
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegistrationRequest {
    pub id: i32,
    pub email: String,
    pub prenom: String,
    pub nom: String,
    pub annee_diplome: i32,
    pub section_id: i32,
    pub section_nom: Option<String>,
    pub message: Option<String>,
    #[serde(skip_serializing)]
    pub registration_key: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RegistrationRequest {
    pub fn is_approved(&self) -> bool {
        self.registration_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub email: String,
    pub prenom: String,
    pub nom: String,
    pub annee_diplome: i32,
    pub section_id: i32,
    pub message: Option<String>,
}
