use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Section {
    pub id: i32,
    pub nom: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Section plus the number of users attached to it, for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SectionWithCount {
    pub id: i32,
    pub nom: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionInput {
    pub nom: String,
    pub description: Option<String>,
}
