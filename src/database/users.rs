use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, FromRow, PgExecutor, Postgres, Row};

use super::error::DatabaseError;
use super::models::{AdminUserUpdate, NewUser, ProfileUpdate, User};
use super::query_builder::{bind_param_query, bind_param_query_as};
use crate::filter::DirectoryQuery;

const USER_SELECT: &str = "SELECT u.*, s.nom AS section_nom \
     FROM users u LEFT JOIN sections s ON s.id = u.section_id";

/// One line of the member directory
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DirectoryRow {
    pub id: i32,
    pub prenom: String,
    pub nom: String,
    pub email: String,
    pub annee_diplome: Option<i32>,
    pub section_id: Option<i32>,
    pub section_nom: Option<String>,
    pub employer_id: Option<i32>,
    pub employer_nom: Option<String>,
    pub poste: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub opt_out_contact: bool,
    pub opt_out_directory: bool,
    pub created_at: DateTime<Utc>,
}

/// Directory rows plus the unpaginated total
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryPage {
    pub rows: Vec<DirectoryRow>,
    pub total: i64,
}

pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<User>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE u.id = $1", USER_SELECT))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE lower(u.email) = lower($1)", USER_SELECT))
        .bind(email)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

pub async fn email_exists<'e, E>(executor: E, email: &str) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1)) AS found")
        .bind(email)
        .fetch_one(executor)
        .await?;
    Ok(row.try_get("found")?)
}

pub async fn create<'e, E>(executor: E, user: &NewUser) -> Result<User, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let created = sqlx::query_as::<_, User>(
        "WITH inserted AS (
             INSERT INTO users (email, password_hash, prenom, nom, annee_diplome, section_id,
                                is_admin, is_approved, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
             RETURNING *
         )
         SELECT i.*, s.nom AS section_nom
         FROM inserted i LEFT JOIN sections s ON s.id = i.section_id",
    )
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.prenom)
    .bind(&user.nom)
    .bind(user.annee_diplome)
    .bind(user.section_id)
    .bind(user.is_admin)
    .bind(user.is_approved)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

/// Apply a self-service profile edit
pub async fn update_profile<'e, E>(
    executor: E,
    id: i32,
    update: &ProfileUpdate,
) -> Result<User, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(
        "WITH updated AS (
             UPDATE users SET
                 prenom = $2, nom = $3, telephone = $4, adresse = $5, ville = $6,
                 code_postal = $7, pays = $8, linkedin = $9, github = $10, site_web = $11,
                 biographie = $12, statut_emploi = $13, opt_out_contact = $14,
                 opt_out_directory = $15, updated_at = now()
             WHERE id = $1
             RETURNING *
         )
         SELECT u.*, s.nom AS section_nom
         FROM updated u LEFT JOIN sections s ON s.id = u.section_id",
    )
    .bind(id)
    .bind(&update.prenom)
    .bind(&update.nom)
    .bind(&update.telephone)
    .bind(&update.adresse)
    .bind(&update.ville)
    .bind(&update.code_postal)
    .bind(&update.pays)
    .bind(&update.linkedin)
    .bind(&update.github)
    .bind(&update.site_web)
    .bind(&update.biographie)
    .bind(update.statut_emploi.map(|s| s.as_str()))
    .bind(update.opt_out_contact)
    .bind(update.opt_out_directory)
    .fetch_optional(executor)
    .await?;

    user.ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))
}

/// Apply an administrator edit, including account flags
pub async fn admin_update<'e, E>(
    executor: E,
    id: i32,
    update: &AdminUserUpdate,
) -> Result<User, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let profile = &update.profile;
    let user = sqlx::query_as::<_, User>(
        "WITH updated AS (
             UPDATE users SET
                 prenom = $2, nom = $3, telephone = $4, adresse = $5, ville = $6,
                 code_postal = $7, pays = $8, linkedin = $9, github = $10, site_web = $11,
                 biographie = $12, statut_emploi = $13, opt_out_contact = $14,
                 opt_out_directory = $15, email = $16, annee_diplome = $17, section_id = $18,
                 is_admin = $19, is_approved = $20, is_active = $21, updated_at = now()
             WHERE id = $1
             RETURNING *
         )
         SELECT u.*, s.nom AS section_nom
         FROM updated u LEFT JOIN sections s ON s.id = u.section_id",
    )
    .bind(id)
    .bind(&profile.prenom)
    .bind(&profile.nom)
    .bind(&profile.telephone)
    .bind(&profile.adresse)
    .bind(&profile.ville)
    .bind(&profile.code_postal)
    .bind(&profile.pays)
    .bind(&profile.linkedin)
    .bind(&profile.github)
    .bind(&profile.site_web)
    .bind(&profile.biographie)
    .bind(profile.statut_emploi.map(|s| s.as_str()))
    .bind(profile.opt_out_contact)
    .bind(profile.opt_out_directory)
    .bind(&update.email)
    .bind(update.annee_diplome)
    .bind(update.section_id)
    .bind(update.is_admin)
    .bind(update.is_approved)
    .bind(update.is_active)
    .fetch_optional(executor)
    .await?;

    user.ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))
}

pub async fn update_password<'e, E>(executor: E, id: i32, password_hash: &str) -> Result<(), DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("User {} not found", id)));
    }
    Ok(())
}

/// Flip `is_active` and return the new value
pub async fn toggle_active<'e, E>(executor: E, id: i32) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(
        "UPDATE users SET is_active = NOT is_active, updated_at = now() WHERE id = $1 RETURNING is_active",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    match row {
        Some(row) => Ok(row.try_get("is_active")?),
        None => Err(DatabaseError::NotFound(format!("User {} not found", id))),
    }
}

pub async fn touch_last_login<'e, E>(executor: E, id: i32) -> Result<(), DatabaseError>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Run the directory query and its independent count on one connection
pub async fn list_directory<'a, A>(conn: A, query: &DirectoryQuery) -> Result<DirectoryPage, DatabaseError>
where
    A: Acquire<'a, Database = Postgres>,
{
    let mut conn = conn.acquire().await?;

    let select = query.to_sql();
    tracing::debug!(sql = %select.query, "directory query");
    let mut q = sqlx::query_as::<_, DirectoryRow>(&select.query);
    for p in select.params.iter() {
        q = bind_param_query_as(q, p);
    }
    let rows = q.fetch_all(&mut *conn).await?;

    let count = query.to_count_sql();
    let mut q = sqlx::query(&count.query);
    for p in count.params.iter() {
        q = bind_param_query(q, p);
    }
    let total: i64 = q.fetch_one(&mut *conn).await?.try_get("count")?;

    Ok(DirectoryPage { rows, total })
}
