use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employer {
    pub id: i32,
    pub nom: String,
    pub secteur: Option<String>,
    pub ville: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Employer row with the number of users currently employed there
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployerSummary {
    pub id: i32,
    pub nom: String,
    pub secteur: Option<String>,
    pub ville: Option<String>,
    pub current_employees: i64,
}

/// A user who has (or had) a position at a given employer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub user_id: i32,
    pub prenom: String,
    pub nom: String,
    pub annee_diplome: Option<i32>,
    pub section_nom: Option<String>,
    pub poste: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEmployer {
    pub nom: String,
    pub secteur: Option<String>,
    pub ville: Option<String>,
}
