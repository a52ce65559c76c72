//! In-memory view of the favorites table.
//!
//! Every mutation writes to the store first and only touches the cache once the
//! write succeeded, so the cache never holds anything the store does not.

use skyview_core::{AppError, DatabaseError, ValidationError};
use skyview_weather::SelectedLocation;
use thiserror::Error;

use crate::favorite_store::{FavoriteCity, FavoriteMap, FavoriteStore};

/// Errors from favorites operations.
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl From<FavoritesError> for AppError {
    fn from(err: FavoritesError) -> Self {
        match err {
            FavoritesError::Validation(e) => AppError::Validation(e),
            FavoritesError::Storage(e) => AppError::Database(e),
        }
    }
}

/// Key a favorite is stored under. Every operation looks names up through this.
fn normalize_name(name: &str) -> &str {
    name.trim()
}

/// Favorites cache backed by a `FavoriteStore`.
pub struct FavoritesCache {
    store: FavoriteStore,
    entries: FavoriteMap,
}

impl FavoritesCache {
    /// Wrap a store. The cache starts empty until `hydrate` is called.
    pub fn new(store: FavoriteStore) -> Self {
        Self {
            store,
            entries: FavoriteMap::new(),
        }
    }

    /// Initialize the store and load everything from it.
    pub fn open(store: FavoriteStore) -> Result<Self, DatabaseError> {
        store.initialize()?;
        let mut cache = Self::new(store);
        cache.hydrate()?;
        Ok(cache)
    }

    /// Replace the whole cache with the store's contents.
    pub fn hydrate(&mut self) -> Result<(), DatabaseError> {
        self.entries = self.store.load_all()?;
        tracing::info!("Loaded {} favorites", self.entries.len());
        Ok(())
    }

    pub fn add(&mut self, city: FavoriteCity) -> Result<(), FavoritesError> {
        let name = normalize_name(&city.name);
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        self.store.upsert(name, city.latitude, city.longitude)?;
        self.entries
            .insert(name.to_string(), (city.latitude, city.longitude));
        tracing::info!("Added favorite {}", name);
        Ok(())
    }

    /// Favorite the currently selected location under its short name.
    pub fn add_selection(
        &mut self,
        selection: &SelectedLocation,
    ) -> Result<FavoriteCity, FavoritesError> {
        let city = FavoriteCity::new(
            selection.short_name(),
            selection.latitude,
            selection.longitude,
        );
        self.add(city.clone())?;
        Ok(city)
    }

    pub fn remove_by_name(&mut self, name: &str) -> Result<(), FavoritesError> {
        let name = normalize_name(name);
        self.store.remove(name)?;
        if self.entries.remove(name).is_some() {
            tracing::info!("Removed favorite {}", name);
        }
        Ok(())
    }

    /// All favorites in name order.
    pub fn list_all(&self) -> Vec<FavoriteCity> {
        self.entries
            .iter()
            .map(|(name, &(lat, lon))| FavoriteCity::new(name.clone(), lat, lon))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<FavoriteCity> {
        let name = normalize_name(name);
        self.entries
            .get(name)
            .map(|&(lat, lon)| FavoriteCity::new(name, lat, lon))
    }

    /// Selection for showing a favorite's weather.
    pub fn selection_for(&self, name: &str) -> Option<SelectedLocation> {
        self.get(name)
            .map(|city| SelectedLocation::new(city.name, city.latitude, city.longitude))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn store(&self) -> &FavoriteStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use rusqlite::Connection;
    use tempfile::tempdir;

    fn cache() -> FavoritesCache {
        FavoritesCache::open(FavoriteStore::in_memory().unwrap()).unwrap()
    }

    fn assert_consistent(cache: &FavoritesCache) {
        let from_cache: FavoriteMap = cache
            .list_all()
            .into_iter()
            .map(|c| (c.name, (c.latitude, c.longitude)))
            .collect();
        assert_eq!(from_cache, cache.store().load_all().unwrap());
    }

    #[test]
    fn test_cache_mirrors_store_after_each_mutation() {
        let mut cache = cache();
        assert_consistent(&cache);

        cache.add(FavoriteCity::new("Paris", 48.8566, 2.3522)).unwrap();
        assert_consistent(&cache);
        cache.add(FavoriteCity::new("Tokyo", 35.6895, 139.6917)).unwrap();
        assert_consistent(&cache);
        cache.add(FavoriteCity::new("Paris", 1.0, 2.0)).unwrap();
        assert_consistent(&cache);
        cache.remove_by_name("Tokyo").unwrap();
        assert_consistent(&cache);
        cache.remove_by_name("Atlantis").unwrap();
        assert_consistent(&cache);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Paris"), Some(FavoriteCity::new("Paris", 1.0, 2.0)));
    }

    #[test]
    fn test_list_all_is_name_ordered_and_stable() {
        let mut cache = cache();
        cache.add(FavoriteCity::new("Tokyo", 35.6, 139.7)).unwrap();
        cache.add(FavoriteCity::new("Moscow", 55.7, 37.6)).unwrap();
        cache.add(FavoriteCity::new("Paris", 48.8, 2.3)).unwrap();

        let names: Vec<_> = cache.list_all().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Moscow", "Paris", "Tokyo"]);
        assert_eq!(cache.list_all(), cache.list_all());
    }

    #[test]
    fn test_add_selection_uses_short_name() {
        let mut cache = cache();
        let selection = SelectedLocation::new("Paris, Île-de-France, France", 48.8566, 2.3522);

        let city = cache.add_selection(&selection).unwrap();

        assert_eq!(city.name, "Paris");
        assert!(cache.contains("Paris"));
        assert_eq!(
            cache.selection_for("Paris"),
            Some(SelectedLocation::new("Paris", 48.8566, 2.3522))
        );
    }

    #[test]
    fn test_empty_name_rejected_before_write() {
        let mut cache = cache();
        let err = cache.add(FavoriteCity::new("   ", 1.0, 2.0)).unwrap_err();
        assert!(matches!(err, FavoritesError::Validation(ValidationError::EmptyName)));
        assert!(cache.store().load_all().unwrap().is_empty());
    }

    #[test]
    fn test_errors_keep_their_category_as_app_errors() {
        let mut cache = cache();
        let err = cache.add(FavoriteCity::new("", 1.0, 2.0)).unwrap_err();
        let app_err = AppError::from(err);
        assert!(matches!(app_err, AppError::Validation(ValidationError::EmptyName)));
        assert_eq!(
            app_err.user_message(),
            "Select a city before adding it to favorites."
        );

        let app_err = AppError::from(FavoritesError::Storage(DatabaseError::QueryFailed(
            "no such table: favorites".into(),
        )));
        assert!(matches!(app_err, AppError::Database(_)));
    }

    #[test]
    fn test_failed_write_leaves_cache_unchanged() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("favorites.db");
        let mut cache = FavoritesCache::open(FavoriteStore::open(&db_path).unwrap()).unwrap();
        cache.add(FavoriteCity::new("Paris", 48.8566, 2.3522)).unwrap();

        // Break the table behind the cache's back
        let other = Connection::open(&db_path).unwrap();
        other.execute_batch("DROP TABLE favorites;").unwrap();

        let err = cache.add(FavoriteCity::new("Oslo", 59.91, 10.75)).unwrap_err();
        assert!(matches!(err, FavoritesError::Storage(_)));
        assert!(!cache.contains("Oslo"));

        let err = cache.remove_by_name("Paris").unwrap_err();
        assert!(matches!(err, FavoritesError::Storage(_)));
        assert!(cache.contains("Paris"));
    }

    #[test]
    fn test_padded_name_is_removed_like_it_was_added() {
        let mut cache = cache();
        cache.add(FavoriteCity::new(" Paris ", 48.8566, 2.3522)).unwrap();
        assert!(cache.contains(" Paris"));
        assert_eq!(cache.get("Paris "), Some(FavoriteCity::new("Paris", 48.8566, 2.3522)));

        cache.remove_by_name(" Paris ").unwrap();

        assert!(cache.is_empty());
        assert!(cache.store().load_all().unwrap().is_empty());
        assert_consistent(&cache);
    }

    #[test]
    fn test_hydrate_replaces_entire_cache() {
        let mut cache = cache();
        cache.add(FavoriteCity::new("Paris", 48.8566, 2.3522)).unwrap();
        cache.store().remove("Paris").unwrap();
        cache.store().upsert("Oslo", 59.91, 10.75).unwrap();

        cache.hydrate().unwrap();

        assert!(!cache.contains("Paris"));
        assert!(cache.contains("Oslo"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(&'static str, f64, f64),
            Remove(&'static str),
        }

        fn name() -> impl Strategy<Value = &'static str> {
            prop_oneof![
                Just("Paris"),
                Just(" Paris"),
                Just("Paris  "),
                Just("Tokyo"),
                Just("\tTokyo\n"),
                Just("Oslo"),
            ]
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (name(), -90.0f64..90.0, -180.0f64..180.0)
                    .prop_map(|(name, lat, lon)| Op::Add(name, lat, lon)),
                name().prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[test]
            fn cache_matches_store_for_any_sequence(ops in prop::collection::vec(op(), 0..40)) {
                let mut cache = cache();
                let mut expected = FavoriteMap::new();

                for op in ops {
                    match op {
                        Op::Add(name, lat, lon) => {
                            cache.add(FavoriteCity::new(name, lat, lon)).unwrap();
                            expected.insert(name.trim().to_string(), (lat, lon));
                        }
                        Op::Remove(name) => {
                            cache.remove_by_name(name).unwrap();
                            expected.remove(name.trim());
                        }
                    }
                    assert_consistent(&cache);
                    prop_assert_eq!(&cache.store().load_all().unwrap(), &expected);
                }
            }
        }
    }
}
