use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{AgendaItem, EventId, EventMode, EventRecord, ImageSummary};

pub mod connection_cache;

pub use connection_cache::{CacheError, CacheStatus, ConnectionCache, Connector};

#[derive(Debug, Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A decoded submission, ready to be written.
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub overview: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    pub audience: String,
    pub organizer: String,
    pub tags: Vec<String>,
    pub agenda: Vec<AgendaItem>,
    pub image: Option<NewImage>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn insert_event(&self, event: &NewEvent) -> Result<EventRecord> {
        let tags_json = serde_json::to_string(&event.tags).context("failed to encode tags")?;
        let agenda_json =
            serde_json::to_string(&event.agenda).context("failed to encode agenda")?;
        let created_at = Utc::now();
        let image = event.image.as_ref();

        let rec = sqlx::query(
            "INSERT INTO events (
                title, description, overview, venue, location, event_date, event_time,
                mode, audience, organizer, tags_json, agenda_json,
                image_blob, image_filename, image_mime_type, created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.mode.as_str())
        .bind(&event.audience)
        .bind(&event.organizer)
        .bind(tags_json)
        .bind(agenda_json)
        .bind(image.map(|image| image.bytes.as_slice()))
        .bind(image.map(|image| image.filename.as_str()))
        .bind(image.and_then(|image| image.mime_type.as_deref()))
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert event")?;

        Ok(EventRecord {
            event_id: EventId(rec.get::<i64, _>(0)),
            title: event.title.clone(),
            description: event.description.clone(),
            overview: event.overview.clone(),
            venue: event.venue.clone(),
            location: event.location.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            mode: event.mode,
            audience: event.audience.clone(),
            organizer: event.organizer.clone(),
            tags: event.tags.clone(),
            agenda: event.agenda.clone(),
            image: image.map(|image| ImageSummary {
                filename: image.filename.clone(),
                mime_type: image.mime_type.clone(),
                size_bytes: image.bytes.len() as u64,
            }),
            created_at,
        })
    }

    pub async fn load_event(&self, event_id: EventId) -> Result<Option<EventRecord>> {
        let row = sqlx::query(
            "SELECT id, title, description, overview, venue, location, event_date, event_time,
                    mode, audience, organizer, tags_json, agenda_json,
                    image_filename, image_mime_type, length(image_blob) AS image_size, created_at
             FROM events WHERE id = ?",
        )
        .bind(event_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| event_from_row(&row)).transpose()
    }

    pub async fn count_events(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn event_from_row(row: &SqliteRow) -> Result<EventRecord> {
    let mode: String = row.get("mode");
    let tags_json: String = row.get("tags_json");
    let agenda_json: String = row.get("agenda_json");
    let image_size: Option<i64> = row.get("image_size");
    let image_filename: Option<String> = row.get("image_filename");

    let image = match (image_filename, image_size) {
        (Some(filename), Some(size)) => Some(ImageSummary {
            filename,
            mime_type: row.get("image_mime_type"),
            size_bytes: size.max(0) as u64,
        }),
        _ => None,
    };

    Ok(EventRecord {
        event_id: EventId(row.get("id")),
        title: row.get("title"),
        description: row.get("description"),
        overview: row.get("overview"),
        venue: row.get("venue"),
        location: row.get("location"),
        date: row.get("event_date"),
        time: row.get("event_time"),
        mode: mode.parse().context("stored event has an invalid mode")?,
        audience: row.get("audience"),
        organizer: row.get("organizer"),
        tags: serde_json::from_str(&tags_json).context("stored tags are not valid json")?,
        agenda: serde_json::from_str(&agenda_json).context("stored agenda is not valid json")?,
        image,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

/// Opens the sqlite-backed [`Storage`] for a [`ConnectionCache`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

#[async_trait]
impl Connector for SqliteConnector {
    type Handle = Storage;

    async fn connect(&self, target: &str) -> Result<Storage> {
        let database_url = normalize_database_url(target);
        Storage::new(&database_url)
            .await
            .with_context(|| format!("failed to open sqlite database at '{database_url}'"))
    }
}

/// Accepts plain file paths as well as `sqlite:` urls.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite:")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
