//! Integration tests for the favorites store and cache on a real database file.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use skyview_services::{FavoriteCity, FavoriteStore, FavoritesCache};
use skyview_weather::SelectedLocation;
use tempfile::tempdir;

#[test]
fn test_fresh_environment_end_to_end() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("favorites.db");

    let store = FavoriteStore::open(&db_path).unwrap();
    store.initialize().unwrap();
    assert!(store.load_all().unwrap().is_empty());

    store.upsert("Paris", 48.8566, 2.3522).unwrap();

    let all = store.load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all["Paris"], (48.8566, 2.3522));
}

#[test]
fn test_cache_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("favorites.db");

    {
        let mut cache = FavoritesCache::open(FavoriteStore::open(&db_path).unwrap()).unwrap();
        cache
            .add_selection(&SelectedLocation::new("Tokyo, Japan", 35.6895, 139.6917))
            .unwrap();
        cache.add(FavoriteCity::new("Moscow", 55.7558, 37.6173)).unwrap();
        cache.remove_by_name("Moscow").unwrap();
    }

    let cache = FavoritesCache::open(FavoriteStore::open(&db_path).unwrap()).unwrap();
    assert_eq!(
        cache.list_all(),
        vec![FavoriteCity::new("Tokyo", 35.6895, 139.6917)]
    );
}

#[test]
fn test_replace_not_duplicate_across_handles() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("favorites.db");

    let writer = FavoriteStore::open(&db_path).unwrap();
    writer.initialize().unwrap();
    writer.upsert("Tokyo", 35.6, 139.7).unwrap();
    writer.upsert("Tokyo", 1.0, 2.0).unwrap();

    // A second connection sees the committed write
    let reader = FavoriteStore::open(&db_path).unwrap();
    let all = reader.load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all["Tokyo"], (1.0, 2.0));
}
