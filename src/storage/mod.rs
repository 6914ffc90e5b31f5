//! All things related to the storage of notes

use core::fmt;
use std::future::Future;

use sqlx::PgPool;

use crate::mirror;
use crate::mirror::Mirror;
use crate::notes::Note;

pub use Config as DatabaseConfig;
pub use memory::Memory;
pub use postgres::Postgres;

mod memory;
mod postgres;

/// Connection string selecting the in-memory storage
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// A connection error with the storage
    Connection(String),

    /// The note to change does not exist
    NotFound,

    /// The note could not be mirrored, nothing is stored
    Mirror(mirror::Error),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connection(error) => write!(f, "Connection error: {error}"),
            Error::NotFound => write!(f, "Note not found"),
            Error::Mirror(error) => write!(f, "Mirror error: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Storage configuration
pub enum Config {
    /// Connect to Postgres with a connection string
    Connect(String),

    /// Use existing Postgres connection
    ExistingConnection(PgPool),

    /// Keep everything in memory
    Memory,
}

impl Config {
    /// Pick the storage based on a `DATABASE_URL` value
    pub fn from_database_url(database_url: String) -> Self {
        if database_url == MEMORY_DATABASE_URL {
            Self::Memory
        } else {
            Self::Connect(database_url)
        }
    }
}

/// The storage picked by the configuration
pub enum Backend {
    /// Postgres storage
    Postgres(Postgres),

    /// In-memory storage
    Memory(Memory),
}

/// Setup the storage
///
/// Migrations are run for Postgres
pub async fn setup(config: Config) -> Result<Backend> {
    match config {
        Config::Connect(database_url) => Postgres::connect(&database_url)
            .await
            .map(Backend::Postgres),
        Config::ExistingConnection(pool) => {
            Postgres::new_with_pool(pool).await.map(Backend::Postgres)
        }
        Config::Memory => {
            tracing::warn!("Using in-memory storage, notes are lost on shutdown");

            Ok(Backend::Memory(Memory::new()))
        }
    }
}

/// Storage with all supported operations
pub trait Storage: Clone + Send + Sync + 'static {
    /// Find all notes, newest (highest ID) first
    ///
    /// Respects the soft-delete
    fn find_all_active_notes(&self) -> impl Future<Output = Result<Vec<Note>>> + Send;

    /// Find the newest note
    ///
    /// Respects the soft-delete
    fn find_latest_active_note(&self) -> impl Future<Output = Result<Option<Note>>> + Send;

    /// Find a single note by its ID
    ///
    /// DOES NOT respect the soft-delete, handle with care
    fn find_single_note_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Note>>> + Send;

    /// Create a note
    fn create_note(&self, text: &str) -> impl Future<Output = Result<Note>> + Send;

    /// Create a note and mirror it in one go
    ///
    /// The note is only stored when the mirror accepted it, the returned note has the
    /// external post ID attached
    fn create_mirrored_note<M: Mirror>(
        &self,
        text: &str,
        mirror: &M,
    ) -> impl Future<Output = Result<Note>> + Send;

    /// Replace the text of a note
    fn update_note_text(&self, note: &Note, text: &str)
    -> impl Future<Output = Result<Note>> + Send;

    /// Attach the ID of the post the note is mirrored to
    fn set_external_post_id(
        &self,
        note: &Note,
        external_post_id: &str,
    ) -> impl Future<Output = Result<Note>> + Send;

    /// Soft-delete a note
    fn delete_note(&self, note: &Note) -> impl Future<Output = Result<()>> + Send;
}
