use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, SqliteConnection};
use std::collections::HashMap;

use crate::models::*;

use super::row_helpers::{map_connection_row, map_hop_row};

const SELECT_CONNECTION: &str = r#"
    SELECT id, pc_id, switch_id, switch_port, is_switch_port_up, cable_color, cable_label
    FROM connections
"#;

const SELECT_HOP: &str = r#"
    SELECT connection_id, sequence, location_id, patch_panel_id, patch_panel_port,
           is_port_up, cable_color, cable_label
    FROM connection_hops
"#;

/// Connection database operations. A connection and its hops are always
/// written together in one transaction.
pub struct ConnectionRepo;

impl ConnectionRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Connection>> {
        let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_CONNECTION))
            .fetch_all(pool)
            .await?;
        let hop_rows = sqlx::query(&format!("{} ORDER BY connection_id, sequence", SELECT_HOP))
            .fetch_all(pool)
            .await?;

        let mut hops: HashMap<i64, Vec<Hop>> = HashMap::new();
        for row in &hop_rows {
            let connection_id: i64 = row.get("connection_id");
            hops.entry(connection_id).or_default().push(map_hop_row(row));
        }

        Ok(rows
            .iter()
            .map(|row| {
                let mut conn = map_connection_row(row);
                conn.hops = hops.remove(&conn.id).unwrap_or_default();
                conn
            })
            .collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Connection>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CONNECTION))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hop_rows = sqlx::query(&format!("{} WHERE connection_id = ? ORDER BY sequence", SELECT_HOP))
            .bind(id)
            .fetch_all(pool)
            .await?;

        let mut conn = map_connection_row(&row);
        conn.hops = hop_rows.iter().map(map_hop_row).collect();
        Ok(Some(conn))
    }

    pub async fn create(pool: &Pool<Sqlite>, canonical: &CanonicalConnection) -> Result<Connection> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO connections (pc_id, switch_id, switch_port, is_switch_port_up,
                                     cable_color, cable_label, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(canonical.pc_id)
        .bind(canonical.switch_id)
        .bind(&canonical.switch_port)
        .bind(canonical.is_switch_port_up)
        .bind(&canonical.cable.cable_color)
        .bind(&canonical.cable.cable_label)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        insert_hops(&mut *tx, id, &canonical.hops).await?;
        tx.commit().await?;

        Self::get(pool, id)
            .await?
            .context("Connection not found after creation")
    }

    /// Replace a connection's endpoints and its whole hop list
    pub async fn update(pool: &Pool<Sqlite>, id: i64, canonical: &CanonicalConnection) -> Result<Connection> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE connections SET pc_id = ?, switch_id = ?, switch_port = ?, is_switch_port_up = ?,
                                   cable_color = ?, cable_label = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(canonical.pc_id)
        .bind(canonical.switch_id)
        .bind(&canonical.switch_port)
        .bind(canonical.is_switch_port_up)
        .bind(&canonical.cable.cable_color)
        .bind(&canonical.cable.cable_label)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Connection", &id.to_string()).into());
        }

        sqlx::query("DELETE FROM connection_hops WHERE connection_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_hops(&mut *tx, id, &canonical.hops).await?;
        tx.commit().await?;

        Self::get(pool, id)
            .await?
            .context("Connection not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM connection_hops WHERE connection_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM connections WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Connection", &id.to_string()).into());
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn insert_hops(conn: &mut SqliteConnection, connection_id: i64, hops: &[Hop]) -> Result<()> {
    for hop in hops {
        sqlx::query(
            r#"
            INSERT INTO connection_hops (connection_id, sequence, location_id, patch_panel_id,
                                         patch_panel_port, is_port_up, cable_color, cable_label)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(connection_id)
        .bind(hop.sequence)
        .bind(hop.location_id)
        .bind(hop.patch_panel_id)
        .bind(&hop.patch_panel_port)
        .bind(hop.is_port_up)
        .bind(&hop.cable.cable_color)
        .bind(&hop.cable.cable_label)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
