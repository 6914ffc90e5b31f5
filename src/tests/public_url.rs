use axum::http::StatusCode;
use url::Url;

use crate::api::PublicUrl;
use crate::tests::helper;
use crate::tests::helper::FakeMirror;

#[tokio::test]
async fn test_public_url() {
    let public_url = Url::parse("https://notes.example.com/").unwrap();
    let (mut app, _) =
        helper::setup_test_app_with(FakeMirror::default(), PublicUrl(Some(public_url)));

    let (status_code, note, _) = helper::maybe_create_note(&mut app, "hello").await;
    assert_eq!(StatusCode::CREATED, status_code);
    let note = note.unwrap();

    assert_eq!(
        format!("https://notes.example.com/api/{}/", note.id),
        note.url
    );
    assert_eq!("https://notes.example.com/api/".to_string(), note.parent_url);
}
