use super::SiteStore;
use crate::error::StoreError;
use common::model::site::SiteRecord;
use log::debug;
use rusqlite::{params, Connection, Row};
use std::path::Path;

const CREATE_SITES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS sites (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        site_name TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        risk_status TEXT,
        site_type TEXT,
        authority TEXT,
        summer_capacity REAL,
        winter_capacity REAL,
        functional_location TEXT,
        licence_area TEXT,
        power_transformers TEXT,
        site_voltage TEXT,
        what3words TEXT,
        type TEXT,
        voltage_transformer_ratings TEXT,
        connection_queue TEXT,
        uploaded_by TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );";

const INSERT_SITE: &str = "
    INSERT INTO sites (
        site_name, latitude, longitude, risk_status, site_type, authority,
        summer_capacity, winter_capacity, functional_location, licence_area,
        power_transformers, site_voltage, what3words, type,
        voltage_transformer_ratings, connection_queue, uploaded_by
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

const SELECT_SITES: &str = "
    SELECT site_name, latitude, longitude, risk_status, site_type, authority,
           summer_capacity, winter_capacity, functional_location, licence_area,
           power_transformers, site_voltage, what3words, type,
           voltage_transformer_ratings, connection_queue, uploaded_by
    FROM sites ORDER BY id";

/// SQLite-backed site store. Each batch is written in its own transaction.
pub struct SqliteSiteStore {
    conn: Connection,
}

impl SqliteSiteStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(CREATE_SITES_TABLE)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sites", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All stored sites in insertion order.
    pub fn sites(&self) -> Result<Vec<SiteRecord>, StoreError> {
        let mut stmt = self.conn.prepare(SELECT_SITES)?;
        let sites = stmt
            .query_map([], read_site)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }
}

impl SiteStore for SqliteSiteStore {
    fn insert_batch(&mut self, batch: &[SiteRecord]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SITE)?;
            for site in batch {
                stmt.execute(params![
                    site.site_name,
                    site.latitude,
                    site.longitude,
                    site.risk_status.map(|s| s.as_str()),
                    site.site_type,
                    site.authority,
                    site.summer_capacity,
                    site.winter_capacity,
                    site.functional_location,
                    site.licence_area,
                    site.power_transformers,
                    site.site_voltage,
                    site.what3words,
                    site.r#type,
                    site.voltage_transformer_ratings,
                    site.connection_queue,
                    site.uploaded_by,
                ])?;
            }
        }
        tx.commit()?;
        debug!("committed batch of {} sites", batch.len());
        Ok(())
    }
}

fn read_site(row: &Row<'_>) -> rusqlite::Result<SiteRecord> {
    let risk_status: Option<String> = row.get(3)?;
    Ok(SiteRecord {
        site_name: row.get(0)?,
        latitude: row.get(1)?,
        longitude: row.get(2)?,
        risk_status: risk_status.and_then(|s| s.parse().ok()),
        site_type: row.get(4)?,
        authority: row.get(5)?,
        summer_capacity: row.get(6)?,
        winter_capacity: row.get(7)?,
        functional_location: row.get(8)?,
        licence_area: row.get(9)?,
        power_transformers: row.get(10)?,
        site_voltage: row.get(11)?,
        what3words: row.get(12)?,
        r#type: row.get(13)?,
        voltage_transformer_ratings: row.get(14)?,
        connection_queue: row.get(15)?,
        uploaded_by: row.get(16)?,
    })
}
