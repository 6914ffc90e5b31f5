//! All API endpoint setup

use axum::Router;
use axum::routing::get;

use crate::mirror::Mirror;
use crate::storage::Storage;

pub use notes::NoteResponse;
pub use request::BaseUrl;
pub use request::PathParameters;
pub use request::Payload;
pub use request::PublicUrl;
pub use response::Error;
pub use response::Success;

mod notes;
mod request;
mod response;

/// Get the Axum router for all API routes
pub fn router<S: Storage, M: Mirror>() -> Router {
    Router::new()
        .route(
            "/api/",
            get(notes::list::<S, M>).post(notes::create::<S, M>),
        )
        .route("/api/latest/", get(notes::latest::<S, M>))
        .route(
            "/api/{note}/",
            get(notes::single::<S, M>)
                .put(notes::update::<S, M>)
                .delete(notes::delete::<S>),
        )
}
