use sqlx::PgExecutor;

use super::error::DatabaseError;
use super::models::{Employee, Employer, EmployerSummary, NewEmployer};
use crate::filter::filter_where::escape_like;

/// Optional filters for the employer list and export
#[derive(Debug, Clone, Default)]
pub struct EmployerFilter {
    pub search: Option<String>,
    pub secteur: Option<String>,
    pub ville: Option<String>,
}

pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Employer>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let employer = sqlx::query_as::<_, Employer>(
        "SELECT id, nom, secteur, ville, created_at FROM employers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(employer)
}

pub async fn create<'e, E>(executor: E, input: &NewEmployer) -> Result<Employer, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let employer = sqlx::query_as::<_, Employer>(
        "INSERT INTO employers (nom, secteur, ville) VALUES ($1, $2, $3)
         RETURNING id, nom, secteur, ville, created_at",
    )
    .bind(&input.nom)
    .bind(&input.secteur)
    .bind(&input.ville)
    .fetch_one(executor)
    .await?;
    Ok(employer)
}

/// Employers with their current-employee counts, ordered by name
pub async fn list_with_counts<'e, E>(
    executor: E,
    filter: &EmployerFilter,
) -> Result<Vec<EmployerSummary>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let search = filter
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)));
    let secteur = filter.secteur.as_deref().filter(|s| !s.is_empty());
    let ville = filter.ville.as_deref().filter(|s| !s.is_empty());

    let employers = sqlx::query_as::<_, EmployerSummary>(
        "SELECT e.id, e.nom, e.secteur, e.ville,
                COUNT(u.id) AS current_employees
         FROM employers e
         LEFT JOIN user_employment ue ON ue.employer_id = e.id AND ue.is_current = TRUE
         LEFT JOIN users u ON u.id = ue.user_id AND u.is_active = TRUE AND u.is_approved = TRUE
         WHERE ($1::TEXT IS NULL OR e.nom ILIKE $1)
           AND ($2::TEXT IS NULL OR lower(e.secteur) = lower($2))
           AND ($3::TEXT IS NULL OR lower(e.ville) = lower($3))
         GROUP BY e.id
         ORDER BY e.nom ASC, e.id ASC",
    )
    .bind(search)
    .bind(secteur)
    .bind(ville)
    .fetch_all(executor)
    .await?;
    Ok(employers)
}

/// Users with an employment row at this employer, current positions first.
/// Inactive, unapproved and directory-opted-out users are left out.
pub async fn get_employees<'e, E>(executor: E, employer_id: i32) -> Result<Vec<Employee>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT u.id AS user_id, u.prenom, u.nom, u.annee_diplome, s.nom AS section_nom,
                ue.poste, ue.date_debut, ue.date_fin, ue.is_current
         FROM user_employment ue
         JOIN users u ON u.id = ue.user_id
         LEFT JOIN sections s ON s.id = u.section_id
         WHERE ue.employer_id = $1
           AND u.is_active = TRUE
           AND u.is_approved = TRUE
           AND u.opt_out_directory = FALSE
         ORDER BY ue.is_current DESC, u.nom ASC, u.prenom ASC, ue.date_debut DESC NULLS LAST",
    )
    .bind(employer_id)
    .fetch_all(executor)
    .await?;
    Ok(employees)
}
