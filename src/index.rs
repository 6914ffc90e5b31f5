//! The index page
//!
//! All active notes in a single HTML page, with a form to submit a new one

use axum::Extension;
use axum::http::StatusCode;
use axum::response::Html;

use crate::api::BaseUrl;
use crate::api::NoteResponse;
use crate::mirror::Mirror;
use crate::sanitize::escape;
use crate::storage::Storage;

/// The index page
///
/// Note texts are sanitized on the way in and embedded as-is, everything else is escaped
pub async fn index<S: Storage, M: Mirror>(
    Extension(storage): Extension<S>,
    Extension(mirror): Extension<M>,
    base_url: BaseUrl,
) -> Result<Html<String>, (StatusCode, String)> {
    let notes = storage
        .find_all_active_notes()
        .await
        .map_err(internal_error)?;

    tracing::debug!("Rendering {} notes", notes.len());

    let notes = notes
        .into_iter()
        .map(|note| NoteResponse::from_note(note, &base_url, &mirror))
        .collect::<Vec<NoteResponse>>();

    Ok(Html(render(&base_url.collection(), &notes)))
}

/// Render the page
fn render(collection_url: &str, notes: &[NoteResponse]) -> String {
    let items = if notes.is_empty() {
        String::from("<p>No posts yet</p>")
    } else {
        let items = notes.iter().map(render_note).collect::<String>();

        format!("<ul class=\"notes\">{items}</ul>")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Anonymous notes</title>
</head>
<body>
<h1>Anonymous notes</h1>
<form method="post" action="{action}">
<textarea name="text" rows="3" cols="60" required></textarea>
<button type="submit">Post</button>
</form>
{items}
</body>
</html>
"#,
        action = escape(collection_url),
    )
}

/// Render a single note
fn render_note(note: &NoteResponse) -> String {
    let created = escape(&note.created);

    let created = match &note.twitter_url {
        Some(twitter_url) => format!(r#"<a href="{}">{created}</a>"#, escape(twitter_url)),
        None => created,
    };

    format!(
        r#"<li id="note-{id}"><p>{text}</p><small>{created}</small></li>"#,
        id = note.id,
        text = note.text,
    )
}

/// Utility function for mapping any error into a `500 Internal Server Error`
/// response.
fn internal_error<E>(err: E) -> (StatusCode, String)
where
    E: std::error::Error,
{
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
