use sqlx::{PgExecutor, Row};

use super::error::DatabaseError;
use super::models::{Section, SectionInput, SectionWithCount};

pub async fn list<'e, E>(executor: E) -> Result<Vec<Section>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sections = sqlx::query_as::<_, Section>(
        "SELECT id, nom, description, created_at FROM sections ORDER BY nom ASC",
    )
    .fetch_all(executor)
    .await?;
    Ok(sections)
}

/// Sections with the number of users referencing each one
pub async fn list_with_counts<'e, E>(executor: E) -> Result<Vec<SectionWithCount>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sections = sqlx::query_as::<_, SectionWithCount>(
        "SELECT s.id, s.nom, s.description, s.created_at, COUNT(u.id) AS user_count
         FROM sections s
         LEFT JOIN users u ON u.section_id = s.id
         GROUP BY s.id
         ORDER BY s.nom ASC",
    )
    .fetch_all(executor)
    .await?;
    Ok(sections)
}

pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Section>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let section = sqlx::query_as::<_, Section>(
        "SELECT id, nom, description, created_at FROM sections WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(section)
}

pub async fn exists<'e, E>(executor: E, id: i32) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM sections WHERE id = $1) AS found")
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(row.try_get("found")?)
}

pub async fn create<'e, E>(executor: E, input: &SectionInput) -> Result<Section, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let section = sqlx::query_as::<_, Section>(
        "INSERT INTO sections (nom, description) VALUES ($1, $2)
         RETURNING id, nom, description, created_at",
    )
    .bind(&input.nom)
    .bind(&input.description)
    .fetch_one(executor)
    .await?;
    Ok(section)
}

pub async fn update<'e, E>(executor: E, id: i32, input: &SectionInput) -> Result<Section, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let section = sqlx::query_as::<_, Section>(
        "UPDATE sections SET nom = $2, description = $3 WHERE id = $1
         RETURNING id, nom, description, created_at",
    )
    .bind(id)
    .bind(&input.nom)
    .bind(&input.description)
    .fetch_optional(executor)
    .await?;

    section.ok_or_else(|| DatabaseError::NotFound(format!("Section {} not found", id)))
}

/// Delete a section; fails with [`DatabaseError::ForeignKey`] while any user
/// or registration request still references it
pub async fn delete<'e, E>(executor: E, id: i32) -> Result<(), DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM sections WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Section {} not found", id)));
    }
    Ok(())
}
