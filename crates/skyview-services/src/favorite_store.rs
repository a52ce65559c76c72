// crates/skyview-services/src/favorite_store.rs

use rusqlite::{params, Connection};
use skyview_core::{DatabaseError, RusqliteErrorExt};
use std::collections::BTreeMap;
use std::path::Path;

/// Favorites keyed by city name
pub type FavoriteMap = BTreeMap<String, (f64, f64)>;

/// A city the user has saved
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl FavoriteCity {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Local SQLite storage for favorite cities
pub struct FavoriteStore {
    conn: Connection,
}

impl FavoriteStore {
    /// Open or create the database file.
    ///
    /// The table is not created until `initialize` is called.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|e| {
            DatabaseError::ConnectionFailed(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self { conn })
    }

    /// In-memory database (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(RusqliteErrorExt::into_database_error)?;
        Ok(Self { conn })
    }

    /// Create the favorites table. Safe to call on every startup.
    pub fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS favorites (
                    city TEXT PRIMARY KEY,
                    lat REAL,
                    lon REAL
                );",
            )
            .map_err(RusqliteErrorExt::into_database_error)
    }

    /// Every stored favorite. Empty on a database that was never initialized.
    pub fn load_all(&self) -> Result<FavoriteMap, DatabaseError> {
        if !self.table_exists()? {
            return Ok(FavoriteMap::new());
        }

        let mut stmt = self
            .conn
            .prepare("SELECT city, lat, lon FROM favorites")
            .map_err(RusqliteErrorExt::into_database_error)?;

        let favorites = stmt
            .query_map([], |row| {
                let city: String = row.get(0)?;
                let lat: f64 = row.get(1)?;
                let lon: f64 = row.get(2)?;
                Ok((city, (lat, lon)))
            })
            .map_err(RusqliteErrorExt::into_database_error)?
            .collect::<Result<FavoriteMap, _>>()
            .map_err(RusqliteErrorExt::into_database_error)?;

        Ok(favorites)
    }

    /// Insert or replace the coordinates stored for `name`.
    pub fn upsert(&self, name: &str, lat: f64, lon: f64) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO favorites (city, lat, lon)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(city) DO UPDATE SET
                    lat = excluded.lat,
                    lon = excluded.lon",
                params![name, lat, lon],
            )
            .map_err(RusqliteErrorExt::into_database_error)?;
        tracing::debug!("Stored favorite {} ({}, {})", name, lat, lon);
        Ok(())
    }

    /// Delete `name` if present.
    pub fn remove(&self, name: &str) -> Result<(), DatabaseError> {
        let removed = self
            .conn
            .execute("DELETE FROM favorites WHERE city = ?1", [name])
            .map_err(RusqliteErrorExt::into_database_error)?;
        if removed == 0 {
            tracing::debug!("Favorite {} was not stored", name);
        }
        Ok(())
    }

    fn table_exists(&self) -> Result<bool, DatabaseError> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='favorites'",
                [],
                |row| row.get(0),
            )
            .map_err(RusqliteErrorExt::into_database_error)?;
        Ok(count > 0)
    }
}
