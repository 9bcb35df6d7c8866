use serde::Serialize;
use sqlx::{Acquire, FromRow, Postgres};

use super::error::DatabaseError;
use super::models::EmployerSummary;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserTotals {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub admins: i64,
    pub opted_out_directory: i64,
    pub opted_out_contact: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RequestTotals {
    pub pending: i64,
    pub approved: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LabelCount {
    pub label: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct YearCount {
    pub annee_diplome: Option<i32>,
    pub count: i64,
}

/// Figures for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub users: UserTotals,
    pub requests: RequestTotals,
    pub employers: i64,
    pub by_section: Vec<LabelCount>,
    pub by_year: Vec<YearCount>,
    pub by_employment_status: Vec<LabelCount>,
    pub top_employers: Vec<EmployerSummary>,
}

pub async fn dashboard<'a, A>(conn: A, top_employers: i64) -> Result<DashboardStats, DatabaseError>
where
    A: Acquire<'a, Database = Postgres>,
{
    let mut conn = conn.acquire().await?;

    let users = sqlx::query_as::<_, UserTotals>(
        "SELECT COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_active) AS active,
                COUNT(*) FILTER (WHERE NOT is_active) AS inactive,
                COUNT(*) FILTER (WHERE is_admin) AS admins,
                COUNT(*) FILTER (WHERE opt_out_directory) AS opted_out_directory,
                COUNT(*) FILTER (WHERE opt_out_contact) AS opted_out_contact
         FROM users",
    )
    .fetch_one(&mut *conn)
    .await?;

    let requests = sqlx::query_as::<_, RequestTotals>(
        "SELECT COUNT(*) FILTER (WHERE registration_key IS NULL) AS pending,
                COUNT(*) FILTER (WHERE registration_key IS NOT NULL) AS approved
         FROM registration_requests",
    )
    .fetch_one(&mut *conn)
    .await?;

    let employers: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employers")
        .fetch_one(&mut *conn)
        .await?;

    let by_section = sqlx::query_as::<_, LabelCount>(
        "SELECT s.nom AS label, COUNT(u.id) AS count
         FROM sections s
         LEFT JOIN users u ON u.section_id = s.id AND u.is_active = TRUE
         GROUP BY s.id, s.nom
         ORDER BY s.nom ASC",
    )
    .fetch_all(&mut *conn)
    .await?;

    let by_year = sqlx::query_as::<_, YearCount>(
        "SELECT annee_diplome, COUNT(*) AS count
         FROM users
         WHERE is_active = TRUE
         GROUP BY annee_diplome
         ORDER BY annee_diplome DESC NULLS LAST",
    )
    .fetch_all(&mut *conn)
    .await?;

    let by_employment_status = sqlx::query_as::<_, LabelCount>(
        "SELECT statut_emploi AS label, COUNT(*) AS count
         FROM users
         WHERE is_active = TRUE
         GROUP BY statut_emploi
         ORDER BY count DESC, label ASC NULLS LAST",
    )
    .fetch_all(&mut *conn)
    .await?;

    let top_employers = sqlx::query_as::<_, EmployerSummary>(
        "SELECT e.id, e.nom, e.secteur, e.ville, COUNT(ue.id) AS current_employees
         FROM employers e
         JOIN user_employment ue ON ue.employer_id = e.id AND ue.is_current = TRUE
         JOIN users u ON u.id = ue.user_id AND u.is_active = TRUE AND u.is_approved = TRUE
         GROUP BY e.id
         ORDER BY current_employees DESC, e.nom ASC
         LIMIT $1",
    )
    .bind(top_employers)
    .fetch_all(&mut *conn)
    .await?;

    Ok(DashboardStats {
        users,
        requests,
        employers: employers.0,
        by_section,
        by_year,
        by_employment_status,
        top_employers,
    })
}
