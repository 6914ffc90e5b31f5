//! Notes API endpoints
//!
//! Everything related to the notes, the only resource there is

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use crate::mirror::Mirror;
use crate::notes::Note;
use crate::sanitize::clean;
use crate::storage::Storage;

use super::BaseUrl;
use super::Error;
use super::PathParameters;
use super::Payload;
use super::Success;

/// Format of the creation date in responses
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Note response going to the user
///
/// Basically filtering which fields are shown to the user, with links added
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,

    /// Sanitized text of the note
    pub text: String,

    /// Creation date
    pub created: String,

    /// Link to the note itself
    pub url: String,

    /// Link to the notes collection
    pub parent_url: String,

    /// Link to the mirrored post, if there is one
    pub twitter_url: Option<String>,
}

impl NoteResponse {
    /// Create a response from a [`Note`](Note)
    pub fn from_note<M: Mirror>(note: Note, base_url: &BaseUrl, mirror: &M) -> Self {
        Self {
            id: note.id,
            url: base_url.note(note.id),
            parent_url: base_url.collection(),
            twitter_url: note
                .external_post_id
                .as_deref()
                .map(|external_post_id| mirror.post_url(external_post_id)),
            created: note.created.format(CREATED_FORMAT).to_string(),
            text: note.text,
        }
    }

    /// Create a response from multiple [`Note`](Note)s
    fn from_note_multiple<M: Mirror>(notes: Vec<Note>, base_url: &BaseUrl, mirror: &M) -> Vec<Self> {
        notes
            .into_iter()
            .map(|note| Self::from_note(note, base_url, mirror))
            .collect::<Vec<Self>>()
    }
}

/// Submitted note
///
/// A missing `text` is the same as an empty one
#[derive(Debug, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    text: Option<String>,
}

/// List all notes, newest first
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/api/
/// ```
pub async fn list<S: Storage, M: Mirror>(
    Extension(storage): Extension<S>,
    Extension(mirror): Extension<M>,
    base_url: BaseUrl,
) -> Result<Success<Vec<NoteResponse>>, Error> {
    let notes = storage.find_all_active_notes().await?;

    Ok(Success::ok(NoteResponse::from_note_multiple(
        notes, &base_url, &mirror,
    )))
}

/// Create a note and post it on the social account
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     http://localhost:6000/api/ \
///     -d '{ "text": "Hello world" }'
/// ```
pub async fn create<S: Storage, M: Mirror>(
    Extension(storage): Extension<S>,
    Extension(mirror): Extension<M>,
    base_url: BaseUrl,
    Payload(form): Payload<NoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let Some(text) = form.text.filter(|text| !text.is_empty()) else {
        tracing::debug!("Please enter text");

        return Ok(Success::no_content());
    };

    let note = storage.create_mirrored_note(&clean(&text), &mirror).await?;

    tracing::info!(
        "Created note {} as post {}",
        note.id,
        note.external_post_id.as_deref().unwrap_or_default()
    );

    Ok(Success::created(NoteResponse::from_note(
        note, &base_url, &mirror,
    )))
}

/// Get the newest note
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/api/latest/
/// ```
pub async fn latest<S: Storage, M: Mirror>(
    Extension(storage): Extension<S>,
    Extension(mirror): Extension<M>,
    base_url: BaseUrl,
) -> Result<Success<NoteResponse>, Error> {
    let Some(note) = storage.find_latest_active_note().await? else {
        tracing::debug!("No posts");

        return Ok(Success::no_content());
    };

    Ok(Success::ok(NoteResponse::from_note(note, &base_url, &mirror)))
}

/// Get a single note, soft-deleted notes included
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/api/<id>/
/// ```
pub async fn single<S: Storage, M: Mirror>(
    Extension(storage): Extension<S>,
    Extension(mirror): Extension<M>,
    base_url: BaseUrl,
    PathParameters(note_id): PathParameters<i64>,
) -> Result<Success<NoteResponse>, Error> {
    let note = fetch_note(&storage, note_id).await?;

    Ok(Success::ok(NoteResponse::from_note(note, &base_url, &mirror)))
}

/// Replace the text of a note, or create a new note when it does not exist
///
/// A new note gets a fresh ID, not the requested one, and is not posted on the social account
///
/// Request:
/// ```sh
/// curl -v -X PUT -H 'Content-Type: application/json' \
///     http://localhost:6000/api/<id>/ \
///     -d '{ "text": "Hello again" }'
/// ```
pub async fn update<S: Storage, M: Mirror>(
    Extension(storage): Extension<S>,
    Extension(mirror): Extension<M>,
    base_url: BaseUrl,
    PathParameters(note_id): PathParameters<i64>,
    Payload(form): Payload<NoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let text = clean(form.text.as_deref().unwrap_or_default());

    let note = if let Some(note) = storage.find_single_note_by_id(note_id).await? {
        storage.update_note_text(&note, &text).await?
    } else {
        let note = storage.create_note(&text).await?;

        tracing::debug!("Note {note_id} not found, created note {}", note.id);

        note
    };

    Ok(Success::ok(NoteResponse::from_note(note, &base_url, &mirror)))
}

/// Soft-delete a note
///
/// Request:
/// ```sh
/// curl -v -X DELETE http://localhost:6000/api/<id>/
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    PathParameters(note_id): PathParameters<i64>,
) -> Result<Success<&'static str>, Error> {
    let note = fetch_note(&storage, note_id).await?;

    storage.delete_note(&note).await?;

    Ok(Success::<&'static str>::no_content())
}

/// Fetch a note, soft-deleted or not
async fn fetch_note<S: Storage>(storage: &S, note_id: i64) -> Result<Note, Error> {
    storage
        .find_single_note_by_id(note_id)
        .await?
        .map_or_else(|| Err(Error::not_found("Note not found")), Ok)
}
