use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::body::Body;
use axum::body::Bytes;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::HOST;
use axum::http::request::Builder;
use http_body_util::BodyExt;
use serde_json::Map;
use serde_json::Value;
use tower::Service;

use crate::api::PublicUrl;
use crate::create_router;
use crate::mirror;
use crate::mirror::Mirror;
use crate::storage::Memory;

/// Test helper version of the note response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub text: String,
    pub created: String,
    pub url: String,
    pub parent_url: String,
    pub twitter_url: Option<String>,
}

/// Error response
#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    pub error: String,
    pub description: Option<String>,
}

/// Mirror recording the posts instead of publishing them
#[derive(Clone, Default)]
pub struct FakeMirror {
    posts: Arc<Mutex<Vec<String>>>,
    failing: bool,
}

impl FakeMirror {
    /// A mirror refusing every post
    pub fn failing() -> Self {
        Self {
            posts: Arc::default(),
            failing: true,
        }
    }

    /// All published texts, oldest first
    pub fn posts(&self) -> Vec<String> {
        self.posts.lock().unwrap().clone()
    }

    /// ID of the last published post
    pub fn last_post_id(&self) -> Option<String> {
        let count = self.posts.lock().unwrap().len();

        (count > 0).then(|| post_id(count))
    }
}

/// Post IDs are handed out in order
fn post_id(count: usize) -> String {
    (1000 + count).to_string()
}

impl Mirror for FakeMirror {
    async fn post(&self, text: &str) -> mirror::Result<String> {
        if self.failing {
            return Err(mirror::Error::Rejected {
                status: 403,
                message: "Duplicate content".to_string(),
            });
        }

        let mut posts = self.posts.lock().unwrap();
        posts.push(text.to_string());

        Ok(post_id(posts.len()))
    }

    fn post_url(&self, external_post_id: &str) -> String {
        format!("https://twitter.com/anonotes/status/{external_post_id}")
    }
}

/// Setup the app with in-memory storage and a working fake mirror
pub fn setup_test_app() -> (Router, FakeMirror) {
    setup_test_app_with(FakeMirror::default(), PublicUrl::default())
}

/// Setup the app with in-memory storage and the given mirror and public URL
pub fn setup_test_app_with(mirror: FakeMirror, public_url: PublicUrl) -> (Router, FakeMirror) {
    let app = create_router(Memory::new(), mirror.clone(), public_url);

    (app, mirror)
}

fn request(method: Method, uri: &str) -> Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(HOST, "localhost")
}

fn json_body(text: &str) -> Body {
    let mut payload = Map::new();
    payload.insert("text".to_string(), Value::String(text.to_string()));

    Body::from(serde_json::to_vec(&payload).unwrap())
}

async fn call(app: &mut Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, body)
}

pub async fn index(app: &mut Router) -> (StatusCode, String) {
    let request = request(Method::GET, "/").body(Body::empty()).unwrap();

    let (status_code, body) = call(app, request).await;

    (status_code, String::from_utf8_lossy(&body[..]).to_string())
}

pub async fn list_notes(app: &mut Router) -> (StatusCode, Option<Vec<Note>>) {
    let request = request(Method::GET, "/api/").body(Body::empty()).unwrap();

    let (status_code, body) = call(app, request).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_notes(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_create_note(
    app: &mut Router,
    text: &str,
) -> (StatusCode, Option<Note>, Option<Error>) {
    let request = request(Method::POST, "/api/")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(json_body(text))
        .unwrap();

    let (status_code, body) = call(app, request).await;

    note_or_error(status_code, StatusCode::CREATED, &body)
}

pub async fn maybe_create_note_with_form(
    app: &mut Router,
    text: &str,
) -> (StatusCode, Option<Note>, Option<Error>) {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("text", text)
        .finish();

    let request = request(Method::POST, "/api/")
        .header(
            CONTENT_TYPE,
            mime::APPLICATION_WWW_FORM_URLENCODED.as_ref(),
        )
        .body(Body::from(body))
        .unwrap();

    let (status_code, body) = call(app, request).await;

    note_or_error(status_code, StatusCode::CREATED, &body)
}

pub async fn maybe_create_note_with_raw_body(
    app: &mut Router,
    body: &'static str,
    include_content_type: bool,
) -> (StatusCode, Option<Note>, Option<Error>) {
    let mut builder = request(Method::POST, "/api/");

    if include_content_type {
        builder = builder.header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    }

    let request = builder.body(Body::from(body.as_bytes())).unwrap();

    let (status_code, body) = call(app, request).await;

    note_or_error(status_code, StatusCode::CREATED, &body)
}

pub async fn latest_note(app: &mut Router) -> (StatusCode, Option<Note>) {
    let request = request(Method::GET, "/api/latest/")
        .body(Body::empty())
        .unwrap();

    let (status_code, body) = call(app, request).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_note(&body))
        } else {
            None
        },
    )
}

pub async fn single_note(app: &mut Router, id: i64) -> (StatusCode, Option<Note>, Option<Error>) {
    single_note_with_str(app, &id.to_string()).await
}

pub async fn single_note_with_str(
    app: &mut Router,
    id: &str,
) -> (StatusCode, Option<Note>, Option<Error>) {
    let request = request(Method::GET, &format!("/api/{id}/"))
        .body(Body::empty())
        .unwrap();

    let (status_code, body) = call(app, request).await;

    note_or_error(status_code, StatusCode::OK, &body)
}

pub async fn maybe_update_note(
    app: &mut Router,
    id: i64,
    text: &str,
) -> (StatusCode, Option<Note>, Option<Error>) {
    let request = request(Method::PUT, &format!("/api/{id}/"))
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(json_body(text))
        .unwrap();

    let (status_code, body) = call(app, request).await;

    note_or_error(status_code, StatusCode::OK, &body)
}

pub async fn maybe_delete_note(app: &mut Router, id: i64) -> (StatusCode, Option<Error>) {
    let request = request(Method::DELETE, &format!("/api/{id}/"))
        .body(Body::empty())
        .unwrap();

    let (status_code, body) = call(app, request).await;

    (
        status_code,
        if status_code.is_client_error() {
            Some(get_error(&body))
        } else {
            None
        },
    )
}

fn note_or_error(
    status_code: StatusCode,
    success: StatusCode,
    body: &Bytes,
) -> (StatusCode, Option<Note>, Option<Error>) {
    (
        status_code,
        if status_code == success {
            Some(get_note(body))
        } else {
            None
        },
        if status_code.is_client_error() || status_code.is_server_error() {
            Some(get_error(body))
        } else {
            None
        },
    )
}

fn value_to_note(note: &Map<String, Value>) -> Note {
    Note {
        id: note["id"].as_i64().unwrap(),
        text: note["text"].as_str().map(ToString::to_string).unwrap(),
        created: note["created"].as_str().map(ToString::to_string).unwrap(),
        url: note["url"].as_str().map(ToString::to_string).unwrap(),
        parent_url: note["parent_url"]
            .as_str()
            .map(ToString::to_string)
            .unwrap(),
        twitter_url: note["twitter_url"].as_str().map(ToString::to_string),
    }
}

fn get_note(body: &Bytes) -> Note {
    serde_json::from_slice::<Value>(&body[..])
        .unwrap()
        .as_object()
        .map(value_to_note)
        .unwrap()
}

fn get_notes(body: &Bytes) -> Vec<Note> {
    serde_json::from_slice::<Value>(&body[..])
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_object().unwrap())
        .map(value_to_note)
        .collect()
}

fn value_to_error(error: &Map<String, Value>) -> Error {
    Error {
        error: error["error"].as_str().map(ToString::to_string).unwrap(),
        description: error
            .get("description")
            .and_then(Value::as_str)
            .map(ToString::to_string),
    }
}

fn get_error(body: &Bytes) -> Error {
    serde_json::from_slice::<Value>(&body[..])
        .unwrap()
        .as_object()
        .map(value_to_error)
        .unwrap()
}
