use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_latest() {
    let (mut app, _) = helper::setup_test_app();

    // no posts yet
    let (status_code, note) = helper::latest_note(&mut app).await;
    assert_eq!(StatusCode::NO_CONTENT, status_code);
    assert_eq!(None, note);

    let (_, first, _) = helper::maybe_create_note(&mut app, "first").await;
    let first = first.unwrap();

    let (status_code, note) = helper::latest_note(&mut app).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Some(first.clone()), note);

    let (_, second, _) = helper::maybe_create_note(&mut app, "second").await;
    let second = second.unwrap();

    let (status_code, note) = helper::latest_note(&mut app).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Some(second.clone()), note);

    // deleted notes are skipped
    helper::maybe_delete_note(&mut app, second.id).await;

    let (status_code, note) = helper::latest_note(&mut app).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Some(first.clone()), note);

    helper::maybe_delete_note(&mut app, first.id).await;

    let (status_code, _) = helper::latest_note(&mut app).await;
    assert_eq!(StatusCode::NO_CONTENT, status_code);
}
