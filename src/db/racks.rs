use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::map_rack_row;

const SELECT_RACK: &str = r#"
    SELECT r.id, r.name, r.location_id, r.description, r.total_units, r.orientation,
           l.name AS location_name
    FROM racks r
    LEFT JOIN locations l ON l.id = r.location_id
"#;

/// Rack database operations. Callers validate dimensions and placements first.
pub struct RackRepo;

impl RackRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Rack>> {
        let rows = sqlx::query(&format!("{} ORDER BY l.name, r.name", SELECT_RACK))
            .fetch_all(pool)
            .await?;
        rows.iter().map(map_rack_row).collect()
    }

    pub async fn list_by_location(pool: &Pool<Sqlite>, location_id: i64) -> Result<Vec<Rack>> {
        let rows = sqlx::query(&format!("{} WHERE r.location_id = ? ORDER BY r.name", SELECT_RACK))
            .bind(location_id)
            .fetch_all(pool)
            .await?;
        rows.iter().map(map_rack_row).collect()
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Rack>> {
        let row = sqlx::query(&format!("{} WHERE r.id = ?", SELECT_RACK))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_rack_row).transpose()
    }

    pub async fn create(pool: &Pool<Sqlite>, rack: &Rack) -> Result<Rack> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO racks (name, location_id, description, total_units, orientation, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rack.name.trim())
        .bind(rack.location_id)
        .bind(&rack.description)
        .bind(rack.total_units)
        .bind(rack.orientation.as_str())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Rack not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, rack: &Rack) -> Result<Rack> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE racks SET name = ?, location_id = ?, description = ?, total_units = ?,
                             orientation = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(rack.name.trim())
        .bind(rack.location_id)
        .bind(&rack.description)
        .bind(rack.total_units)
        .bind(rack.orientation.as_str())
        .bind(now)
        .bind(rack.id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Rack", &rack.id.to_string()).into());
        }

        Self::get(pool, rack.id)
            .await?
            .context("Rack not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM racks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Rack", &id.to_string()).into());
        }
        Ok(())
    }
}
