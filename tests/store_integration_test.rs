//! Configuration store and settings on real files.

use rparecorder_lib::configuration::{generate, ConfigurationStore};
use rparecorder_lib::recording::{ActionKind, RecordedAction, Selector, ViewMode};
use rparecorder_lib::settings::{settings_path, RecorderSettings, SettingsManager};
use rparecorder_lib::storage::FsStorage;
use std::sync::Arc;

fn sample_actions() -> Vec<RecordedAction> {
    vec![
        RecordedAction::new(ActionKind::Navigate, Selector::none())
            .with_value("https://example.com")
            .with_timestamp(1),
        RecordedAction::new(ActionKind::Select, Selector::id("country"))
            .with_value("NL")
            .with_timestamp(2),
        RecordedAction::new(ActionKind::from("hover"), Selector::xpath("//nav"))
            .with_timestamp(3),
    ]
}

#[tokio::test]
async fn test_store_roundtrip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigurationStore::new(FsStorage::shared(), dir.path());

    let config = generate(&sample_actions(), "Country picker", "");
    assert!(store.save(&config).await);
    assert!(dir
        .path()
        .join("configurations")
        .join("Country_picker.json")
        .is_file());

    let loaded = store.load("Country picker").await.unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.entries[2].name, "Action 3");
    assert_eq!(loaded.entries[2].kind, ActionKind::Other("hover".to_string()));
}

#[tokio::test]
async fn test_list_skips_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigurationStore::new(FsStorage::shared(), dir.path());
    assert!(store.list().await.is_empty());

    store.save(&generate(&sample_actions(), "alpha", "")).await;
    let configs = dir.path().join("configurations");
    std::fs::write(configs.join("junk.json"), "[1, 2").unwrap();
    std::fs::write(configs.join("readme.md"), "# hi").unwrap();

    let names: Vec<String> = store.list().await.into_iter().collect();
    assert_eq!(names, vec!["alpha"]);
}

#[tokio::test]
async fn test_legacy_actions_key_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigurationStore::new(FsStorage::shared(), dir.path());
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r##"{"name":"Legacy","actions":[{"name":"Click on #go","actionType":"default","type":"click","selector":{"type":"css","value":"#go"}}]}"##,
    )
    .unwrap();

    let config = store.import_from(&path).await.unwrap();
    assert_eq!(config.name, "Legacy");
    assert_eq!(config.description, "");
    assert_eq!(config.entries.len(), 1);
}

#[tokio::test]
async fn test_settings_file_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let manager = SettingsManager::new(FsStorage::shared(), dir.path());

    let settings = manager.load().await;
    assert_eq!(settings, RecorderSettings::default());
    assert!(settings_path(dir.path()).is_file());
}

#[tokio::test]
async fn test_corrupt_settings_are_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = settings_path(dir.path());
    std::fs::write(&path, "default_view_mode = [[[").unwrap();

    let manager = SettingsManager::new(Arc::new(FsStorage::new()), dir.path());
    let settings = manager.load().await;
    assert_eq!(settings.default_view_mode, ViewMode::Clean);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "default_view_mode = [[[");
}
