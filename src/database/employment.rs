use sqlx::{Acquire, PgConnection, PgExecutor, Postgres};

use super::employers;
use super::error::DatabaseError;
use super::models::{EmployerRef, Employment, EmploymentInput, EmploymentRecord};

const EMPLOYMENT_COLUMNS: &str =
    "id, user_id, employer_id, poste, date_debut, date_fin, is_current, created_at";

/// Employment history for a user, current position first, then most recent
pub async fn list_for_user<'e, E>(executor: E, user_id: i32) -> Result<Vec<EmploymentRecord>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let records = sqlx::query_as::<_, EmploymentRecord>(
        "SELECT ue.id, ue.employer_id, e.nom AS employer_nom, e.secteur, e.ville,
                ue.poste, ue.date_debut, ue.date_fin, ue.is_current
         FROM user_employment ue
         JOIN employers e ON e.id = ue.employer_id
         WHERE ue.user_id = $1
         ORDER BY ue.is_current DESC, ue.date_debut DESC NULLS LAST, ue.id DESC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(records)
}

/// Fetch one row, scoped to its owner
pub async fn find_for_user<'e, E>(executor: E, id: i32, user_id: i32) -> Result<Option<Employment>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, Employment>(&format!(
        "SELECT {} FROM user_employment WHERE id = $1 AND user_id = $2",
        EMPLOYMENT_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Add an employment row.
///
/// When the new row is current, the user's other current rows are cleared in
/// the same transaction, so at most one row per user has `is_current`.
pub async fn create<'a, A>(conn: A, user_id: i32, input: &EmploymentInput) -> Result<Employment, DatabaseError>
where
    A: Acquire<'a, Database = Postgres>,
{
    let mut tx = conn.begin().await?;

    let employer_id = resolve_employer(&mut *tx, &input.employer).await?;
    if input.is_current {
        clear_current(&mut *tx, user_id, None).await?;
    }

    let row = sqlx::query_as::<_, Employment>(&format!(
        "INSERT INTO user_employment (user_id, employer_id, poste, date_debut, date_fin, is_current)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        EMPLOYMENT_COLUMNS
    ))
    .bind(user_id)
    .bind(employer_id)
    .bind(&input.poste)
    .bind(input.date_debut)
    .bind(input.date_fin)
    .bind(input.is_current)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Update an employment row owned by `user_id`, with the same
/// single-current guarantee as [`create`]
pub async fn update<'a, A>(
    conn: A,
    id: i32,
    user_id: i32,
    input: &EmploymentInput,
) -> Result<Employment, DatabaseError>
where
    A: Acquire<'a, Database = Postgres>,
{
    let mut tx = conn.begin().await?;

    let owned = sqlx::query("SELECT id FROM user_employment WHERE id = $1 AND user_id = $2 FOR UPDATE")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if owned.is_none() {
        return Err(DatabaseError::NotFound(format!("Employment {} not found", id)));
    }

    let employer_id = resolve_employer(&mut *tx, &input.employer).await?;
    if input.is_current {
        clear_current(&mut *tx, user_id, Some(id)).await?;
    }

    let row = sqlx::query_as::<_, Employment>(&format!(
        "UPDATE user_employment
         SET employer_id = $3, poste = $4, date_debut = $5, date_fin = $6, is_current = $7
         WHERE id = $1 AND user_id = $2
         RETURNING {}",
        EMPLOYMENT_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .bind(employer_id)
    .bind(&input.poste)
    .bind(input.date_debut)
    .bind(input.date_fin)
    .bind(input.is_current)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

pub async fn delete<'e, E>(executor: E, id: i32, user_id: i32) -> Result<(), DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM user_employment WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Employment {} not found", id)));
    }
    Ok(())
}

/// Clear `is_current` on all of a user's rows, optionally sparing one
async fn clear_current<'e, E>(executor: E, user_id: i32, except: Option<i32>) -> Result<u64, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE user_employment SET is_current = FALSE
         WHERE user_id = $1 AND is_current = TRUE AND ($2::INT IS NULL OR id <> $2)",
    )
    .bind(user_id)
    .bind(except)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

async fn resolve_employer(conn: &mut PgConnection, employer: &EmployerRef) -> Result<i32, DatabaseError> {
    match employer {
        EmployerRef::Existing(id) => Ok(*id),
        EmployerRef::New(new) => Ok(employers::create(&mut *conn, new).await?.id),
    }
}
