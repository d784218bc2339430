use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::map_location_row;

pub struct LocationRepo;

impl LocationRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Location>> {
        let rows = sqlx::query("SELECT * FROM locations ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_location_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Location>> {
        let row = sqlx::query("SELECT * FROM locations WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_location_row))
    }

    /// Look up a location by name, ignoring `excluding_id` (the location being renamed)
    pub async fn find_by_name(pool: &Pool<Sqlite>, name: &str, excluding_id: Option<i64>) -> Result<Option<Location>> {
        let row = sqlx::query("SELECT * FROM locations WHERE name = ? AND id != ?")
            .bind(name)
            .bind(excluding_id.unwrap_or(0))
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_location_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateLocationRequest) -> Result<Location> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO locations (name, door_number, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(req.name.trim())
        .bind(&req.door_number)
        .bind(&req.description)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Location not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateLocationRequest) -> Result<Location> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE locations SET name = ?, door_number = ?, description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(req.name.trim())
        .bind(&req.door_number)
        .bind(&req.description)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Location", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Location not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Location", &id.to_string()).into());
        }
        Ok(())
    }
}
