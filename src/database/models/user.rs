use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub prenom: String,
    pub nom: String,
    pub annee_diplome: Option<i32>,
    pub section_id: Option<i32>,
    pub section_nom: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub code_postal: Option<String>,
    pub pays: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub site_web: Option<String>,
    pub biographie: Option<String>,
    pub statut_emploi: Option<String>,
    pub is_admin: bool,
    pub is_approved: bool,
    pub is_active: bool,
    pub opt_out_contact: bool,
    pub opt_out_directory: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Blank out contact fields for viewers who may not see them
    pub fn without_contact(mut self) -> Self {
        self.email = String::new();
        self.telephone = None;
        self.adresse = None;
        self.code_postal = None;
        self
    }
}

/// Employment status stored in `users.statut_emploi`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    EnPoste,
    EnRecherche,
    Freelance,
    Etudiant,
    Autre,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 5] = [
        EmploymentStatus::EnPoste,
        EmploymentStatus::EnRecherche,
        EmploymentStatus::Freelance,
        EmploymentStatus::Etudiant,
        EmploymentStatus::Autre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::EnPoste => "en_poste",
            EmploymentStatus::EnRecherche => "en_recherche",
            EmploymentStatus::Freelance => "freelance",
            EmploymentStatus::Etudiant => "etudiant",
            EmploymentStatus::Autre => "autre",
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown employment status: {}", s))
    }
}

/// Insert payload for a user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub prenom: String,
    pub nom: String,
    pub annee_diplome: Option<i32>,
    pub section_id: Option<i32>,
    pub is_admin: bool,
    pub is_approved: bool,
}

/// Fields a member may change on their own profile
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub prenom: String,
    pub nom: String,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub code_postal: Option<String>,
    pub pays: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub site_web: Option<String>,
    pub biographie: Option<String>,
    pub statut_emploi: Option<EmploymentStatus>,
    pub opt_out_contact: bool,
    pub opt_out_directory: bool,
}

/// Fields an administrator may change on any account
#[derive(Debug, Clone, Default)]
pub struct AdminUserUpdate {
    pub profile: ProfileUpdate,
    pub email: String,
    pub annee_diplome: Option<i32>,
    pub section_id: Option<i32>,
    pub is_admin: bool,
    pub is_approved: bool,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employment_status_round_trips_through_str() {
        for status in EmploymentStatus::ALL {
            assert_eq!(status.as_str().parse::<EmploymentStatus>().unwrap(), status);
        }
        assert!("retraite".parse::<EmploymentStatus>().is_err());
    }

    #[test]
    fn employment_status_serializes_snake_case() {
        let value = serde_json::to_value(EmploymentStatus::EnRecherche).unwrap();
        assert_eq!(value, serde_json::json!("en_recherche"));
    }
}
