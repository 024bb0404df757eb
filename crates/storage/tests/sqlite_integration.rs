use prep_core::model::{CatalogState, Difficulty, SortKey, StateKey, StatusMap};
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use storage::state::StateStore;

#[tokio::test]
async fn sqlite_kv_roundtrip_and_overwrite() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("searchQuery").await.unwrap(), None);

    repo.set("searchQuery", "\"tree\"").await.unwrap();
    repo.set("searchQuery", "\"graph\"").await.unwrap();
    assert_eq!(
        repo.get("searchQuery").await.unwrap().as_deref(),
        Some("\"graph\"")
    );

    repo.remove("searchQuery").await.unwrap();
    assert_eq!(repo.get("searchQuery").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn catalog_state_survives_reopen() {
    let url = "sqlite:file:memdb_state_reopen?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("open");
    let store = StateStore::new(&storage);

    let mut state = CatalogState::default();
    state.set_difficulties([Difficulty::Medium, Difficulty::Hard]);
    state.toggle_sort(SortKey::Difficulty);
    state.set_page(4);
    state.toggle_revised("Course Schedule");
    state.replace_solved(StatusMap::from_titles(["Two Sum", "3Sum"]));
    store.save(&StateKey::ALL, &state).await;

    // A second pool on the same shared-cache database sees the writes.
    let reopened = Storage::sqlite(url).await.expect("reopen");
    let loaded = StateStore::new(&reopened).load().await;
    assert_eq!(loaded, state);
    drop(storage);
}

#[tokio::test]
async fn corrupt_rows_load_as_defaults() {
    let url = "sqlite:file:memdb_state_corrupt?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("open");
    storage.kv.set("sortConfig", "[{\"key\":\"nope\"}]").await.unwrap();
    storage.kv.set("solvedMap", "{\"A\":true}").await.unwrap();

    let loaded = StateStore::new(&storage).load().await;
    assert!(loaded.sort.is_empty());
    assert!(loaded.solved.is_set("A"));
}
