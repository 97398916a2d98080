use super::*;

fn launch_event() -> NewEvent {
    NewEvent {
        title: "Launch".to_string(),
        date: "2025-06-01".to_string(),
        tags: vec!["ai".to_string(), "demo".to_string()],
        agenda: vec![AgendaItem::new("09:00", "Intro")],
        ..NewEvent::default()
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn inserts_and_loads_event() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    let created = storage.insert_event(&launch_event()).await.expect("insert");
    assert!(created.event_id.0 > 0);

    let loaded = storage
        .load_event(created.event_id)
        .await
        .expect("load")
        .expect("event exists");
    assert_eq!(loaded.title, "Launch");
    assert_eq!(loaded.mode, EventMode::Offline);
    assert_eq!(loaded.tags, vec!["ai", "demo"]);
    assert_eq!(loaded.agenda, vec![AgendaItem::new("09:00", "Intro")]);
    assert!(loaded.image.is_none());
}

#[tokio::test]
async fn stores_image_metadata_without_returning_bytes() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut event = launch_event();
    event.mode = EventMode::Hybrid;
    event.image = Some(NewImage {
        filename: "cover.png".to_string(),
        mime_type: Some("image/png".to_string()),
        bytes: vec![0x89, b'P', b'N', b'G'],
    });

    let created = storage.insert_event(&event).await.expect("insert");
    let loaded = storage
        .load_event(created.event_id)
        .await
        .expect("load")
        .expect("event exists");

    let image = loaded.image.expect("image summary");
    assert_eq!(image.filename, "cover.png");
    assert_eq!(image.mime_type.as_deref(), Some("image/png"));
    assert_eq!(image.size_bytes, 4);
    assert_eq!(loaded.mode, EventMode::Hybrid);
}

#[tokio::test]
async fn missing_event_loads_as_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.load_event(EventId(42)).await.expect("load").is_none());
    assert_eq!(storage.count_events().await.expect("count"), 0);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("temp dir");
    let db_path = temp_root.path().join("nested").join("events.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/events.db"),
        "sqlite://./data/events.db"
    );
    assert_eq!(normalize_database_url(" sqlite::memory: "), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("sqlite://data/events.db"),
        "sqlite://data/events.db"
    );
}
