use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use shared::{
    domain::{EventId, EventMode, EventRecord},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{
        decode_agenda, decode_tags, CreateEventResponse, FIELD_AGENDA, FIELD_AUDIENCE, FIELD_DATE,
        FIELD_DESCRIPTION, FIELD_IMAGE, FIELD_LOCATION, FIELD_MODE, FIELD_ORGANIZER,
        FIELD_OVERVIEW, FIELD_TAGS, FIELD_TIME, FIELD_TITLE, FIELD_VENUE,
    },
};
use storage::{CacheError, NewEvent, NewImage, Storage};
use tracing::{debug, error, info};

use crate::app_state::AppState;

pub(crate) const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;
pub(crate) const CREATED_MESSAGE: &str = "Event created successfully";

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub(crate) async fn create_event(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<CreateEventResponse>)> {
    let submission = read_submission(multipart).await.map_err(rejection)?;
    let storage = acquire_storage(&state).await?;

    let event = storage
        .insert_event(&submission)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to store event");
            rejection(ApiException::new(ErrorCode::Internal, e.to_string()))
        })?;
    info!(event_id = event.event_id.0, title = %event.title, "event created");

    Ok((
        StatusCode::CREATED,
        Json(CreateEventResponse {
            message: CREATED_MESSAGE.to_string(),
            event,
        }),
    ))
}

pub(crate) async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<EventRecord>> {
    let storage = acquire_storage(&state).await?;
    let event = storage
        .load_event(EventId(event_id))
        .await
        .map_err(|e| rejection(ApiException::new(ErrorCode::Internal, e.to_string())))?
        .ok_or_else(|| rejection(ApiException::new(ErrorCode::NotFound, "event not found")))?;
    Ok(Json(event))
}

async fn acquire_storage(state: &AppState) -> ApiResult<Storage> {
    state.db.acquire().await.map_err(|err| match err {
        CacheError::MissingTarget => {
            error!("DATABASE_URL is not set; event requests cannot be served until it is configured");
            rejection(ApiException::new(
                ErrorCode::Internal,
                "database is not configured",
            ))
        }
        CacheError::Connect(_) => {
            error!(error = %err, "database unavailable");
            rejection(ApiException::new(ErrorCode::Unavailable, err.to_string()))
        }
    })
}

/// Decodes the multipart body of a create request. Unknown parts are
/// skipped; an empty image part is treated as no image.
pub(crate) async fn read_submission(mut multipart: Multipart) -> Result<NewEvent, ApiException> {
    let mut event = NewEvent::default();
    let mut mode = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == FIELD_IMAGE {
            event.image = read_image(field).await?;
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            FIELD_TITLE => event.title = value,
            FIELD_DESCRIPTION => event.description = value,
            FIELD_OVERVIEW => event.overview = value,
            FIELD_VENUE => event.venue = value,
            FIELD_LOCATION => event.location = value,
            FIELD_DATE => event.date = value,
            FIELD_TIME => event.time = value,
            FIELD_MODE => mode = value,
            FIELD_AUDIENCE => event.audience = value,
            FIELD_ORGANIZER => event.organizer = value,
            FIELD_TAGS if !value.trim().is_empty() => {
                event.tags = decode_tags(&value).map_err(|_| {
                    ApiException::validation("tags must be a JSON array of strings")
                })?;
            }
            FIELD_AGENDA if !value.trim().is_empty() => {
                event.agenda = decode_agenda(&value).map_err(|_| {
                    ApiException::validation("agenda must be a JSON array of strings")
                })?;
            }
            FIELD_TAGS | FIELD_AGENDA => {}
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    event.mode = parse_mode(&mode)?;
    if event.title.trim().is_empty() {
        return Err(ApiException::validation("Title required"));
    }
    if event.date.trim().is_empty() {
        return Err(ApiException::validation("Date required"));
    }
    Ok(event)
}

async fn read_image(field: Field<'_>) -> Result<Option<NewImage>, ApiException> {
    let filename = field
        .file_name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("image")
        .to_string();
    let mime_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(multipart_error)?;

    if bytes.is_empty() {
        return Ok(None);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiException::new(
            ErrorCode::PayloadTooLarge,
            format!("image exceeds {MAX_IMAGE_BYTES} bytes"),
        ));
    }
    Ok(Some(NewImage {
        filename,
        mime_type,
        bytes: bytes.to_vec(),
    }))
}

/// A blank mode falls back to the default.
pub(crate) fn parse_mode(raw: &str) -> Result<EventMode, ApiException> {
    if raw.trim().is_empty() {
        return Ok(EventMode::default());
    }
    raw.parse()
        .map_err(|_| ApiException::validation(format!("unknown mode '{raw}'")))
}

/// A body cut off by the request size limit is a 413, anything else a 400.
fn multipart_error(err: MultipartError) -> ApiException {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiException::new(
            ErrorCode::PayloadTooLarge,
            format!("request body is too large: {}", err.body_text()),
        );
    }
    ApiException::validation(format!("malformed multipart body: {}", err.body_text()))
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn rejection(err: ApiException) -> (StatusCode, Json<ApiError>) {
    (status_for(err.code), Json(ApiError::from(err)))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
