//! Postgres storage

use std::time::Duration;

use sqlx::PgExecutor;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::mirror::Mirror;
use crate::notes::Note;

use super::Error;
use super::Result;
use super::Storage;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage from a connection string
    ///
    /// Migrations will be run
    pub async fn connect(database_connection_string: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_connection_string)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Connection(format!("Migrations could not run: {err}")))?;

        Ok(Self { connection_pool })
    }
}

impl Storage for Postgres {
    async fn find_all_active_notes(&self) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r"
            SELECT *
            FROM notes
            WHERE deleted = FALSE
            ORDER BY id DESC
            ",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(notes)
    }

    async fn find_latest_active_note(&self) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r"
            SELECT *
            FROM notes
            WHERE deleted = FALSE
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn find_single_note_by_id(&self, id: i64) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r"
            SELECT *
            FROM notes
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn create_note(&self, text: &str) -> Result<Note> {
        insert_note(&self.connection_pool, text)
            .await
            .map_err(connection_error)
    }

    async fn create_mirrored_note<M: Mirror>(&self, text: &str, mirror: &M) -> Result<Note> {
        let mut transaction = self
            .connection_pool
            .begin()
            .await
            .map_err(connection_error)?;

        let note = insert_note(&mut *transaction, text)
            .await
            .map_err(connection_error)?;

        let external_post_id = match mirror.post(&note.text).await {
            Ok(external_post_id) => external_post_id,
            Err(err) => {
                transaction.rollback().await.map_err(connection_error)?;

                return Err(Error::Mirror(err));
            }
        };

        let note = attach_external_post_id(&mut *transaction, note.id, &external_post_id)
            .await
            .map_err(connection_error)?
            .ok_or(Error::NotFound)?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(note)
    }

    async fn update_note_text(&self, note: &Note, text: &str) -> Result<Note> {
        let updated_note = sqlx::query_as::<_, Note>(
            r"
            UPDATE notes
            SET text = $1
            WHERE id = $2
            RETURNING *
            ",
        )
        .bind(text)
        .bind(note.id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        updated_note.ok_or(Error::NotFound)
    }

    async fn set_external_post_id(&self, note: &Note, external_post_id: &str) -> Result<Note> {
        attach_external_post_id(&self.connection_pool, note.id, external_post_id)
            .await
            .map_err(connection_error)?
            .ok_or(Error::NotFound)
    }

    async fn delete_note(&self, note: &Note) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE notes
            SET deleted = TRUE
            WHERE id = $1
            ",
        )
        .bind(note.id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

/// Insert a new note, on the pool or inside a transaction
async fn insert_note<'e, E>(executor: E, text: &str) -> sqlx::Result<Note>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Note>(
        r"
        INSERT INTO notes (text)
        VALUES ($1)
        RETURNING *
        ",
    )
    .bind(text)
    .fetch_one(executor)
    .await
}

/// Attach the external post ID, on the pool or inside a transaction
async fn attach_external_post_id<'e, E>(
    executor: E,
    id: i64,
    external_post_id: &str,
) -> sqlx::Result<Option<Note>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Note>(
        r"
        UPDATE notes
        SET external_post_id = $1
        WHERE id = $2
        RETURNING *
        ",
    )
    .bind(external_post_id)
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Log and convert any error to a storage error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    tracing::error!("Storage error: {err}");

    Error::Connection(err.to_string())
}
