use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::employer::NewEmployer;

/// Raw `user_employment` row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employment {
    pub id: i32,
    pub user_id: i32,
    pub employer_id: i32,
    pub poste: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}

/// Employment row joined with its employer, as shown on profiles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmploymentRecord {
    pub id: i32,
    pub employer_id: i32,
    pub employer_nom: String,
    pub secteur: Option<String>,
    pub ville: Option<String>,
    pub poste: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub is_current: bool,
}

/// Which employer an employment row points at
#[derive(Debug, Clone)]
pub enum EmployerRef {
    Existing(i32),
    New(NewEmployer),
}

/// Validated input for creating or updating an employment row
#[derive(Debug, Clone)]
pub struct EmploymentInput {
    pub employer: EmployerRef,
    pub poste: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub is_current: bool,
}
