use sqlx::{Acquire, PgExecutor, Postgres, Row};

use super::error::DatabaseError;
use super::models::{NewRegistration, NewUser, RegistrationRequest, User};
use super::users;

const REQUEST_SELECT: &str = "SELECT r.*, s.nom AS section_nom \
     FROM registration_requests r LEFT JOIN sections s ON s.id = r.section_id";

/// All requests, pending (not yet approved) first, oldest first
pub async fn list<'e, E>(executor: E) -> Result<Vec<RegistrationRequest>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let requests = sqlx::query_as::<_, RegistrationRequest>(&format!(
        "{} ORDER BY (r.registration_key IS NOT NULL) ASC, r.created_at ASC, r.id ASC",
        REQUEST_SELECT
    ))
    .fetch_all(executor)
    .await?;
    Ok(requests)
}

pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<RegistrationRequest>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let request = sqlx::query_as::<_, RegistrationRequest>(&format!("{} WHERE r.id = $1", REQUEST_SELECT))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(request)
}

pub async fn find_by_key<'e, E>(executor: E, key: &str) -> Result<Option<RegistrationRequest>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
        "{} WHERE r.registration_key = $1",
        REQUEST_SELECT
    ))
    .bind(key)
    .fetch_optional(executor)
    .await?;
    Ok(request)
}

pub async fn email_exists<'e, E>(executor: E, email: &str) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(
        "SELECT EXISTS(SELECT 1 FROM registration_requests WHERE lower(email) = lower($1)) AS found",
    )
    .bind(email)
    .fetch_one(executor)
    .await?;
    Ok(row.try_get("found")?)
}

pub async fn create<'e, E>(executor: E, request: &NewRegistration) -> Result<RegistrationRequest, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let created = sqlx::query_as::<_, RegistrationRequest>(
        "WITH inserted AS (
             INSERT INTO registration_requests (email, prenom, nom, annee_diplome, section_id, message)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *
         )
         SELECT r.*, s.nom AS section_nom
         FROM inserted r LEFT JOIN sections s ON s.id = r.section_id",
    )
    .bind(&request.email)
    .bind(&request.prenom)
    .bind(&request.nom)
    .bind(request.annee_diplome)
    .bind(request.section_id)
    .bind(&request.message)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

/// Attach a fresh one-time key; any earlier link for this request stops working
pub async fn approve<'e, E>(executor: E, id: i32, registration_key: &str) -> Result<RegistrationRequest, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let request = sqlx::query_as::<_, RegistrationRequest>(
        "WITH approved AS (
             UPDATE registration_requests
             SET registration_key = $2, approved_at = now()
             WHERE id = $1
             RETURNING *
         )
         SELECT r.*, s.nom AS section_nom
         FROM approved r LEFT JOIN sections s ON s.id = r.section_id",
    )
    .bind(id)
    .bind(registration_key)
    .fetch_optional(executor)
    .await?;

    request.ok_or_else(|| DatabaseError::NotFound(format!("Registration request {} not found", id)))
}

pub async fn delete<'e, E>(executor: E, id: i32) -> Result<(), DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM registration_requests WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Registration request {} not found", id)));
    }
    Ok(())
}

/// Consume an approved request: create the user and delete the request in
/// one transaction. The key is single-use.
pub async fn complete<'a, A>(conn: A, registration_key: &str, password_hash: &str) -> Result<User, DatabaseError>
where
    A: Acquire<'a, Database = Postgres>,
{
    let mut tx = conn.begin().await?;

    let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
        "{} WHERE r.registration_key = $1 FOR UPDATE OF r",
        REQUEST_SELECT
    ))
    .bind(registration_key)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Registration key not found".to_string()))?;

    let user = users::create(
        &mut *tx,
        &NewUser {
            email: request.email.to_lowercase(),
            password_hash: password_hash.to_string(),
            prenom: request.prenom.clone(),
            nom: request.nom.clone(),
            annee_diplome: Some(request.annee_diplome),
            section_id: Some(request.section_id),
            is_admin: false,
            is_approved: true,
        },
    )
    .await?;

    sqlx::query("DELETE FROM registration_requests WHERE id = $1")
        .bind(request.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(user)
}
