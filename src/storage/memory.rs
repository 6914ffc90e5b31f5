//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::mirror::Mirror;
use crate::notes::Note;

use super::Error;
use super::Result;
use super::Storage;

/// Notes with the last handed out ID
#[derive(Debug, Default)]
struct Notes {
    /// All notes in storage, ordered by ID
    by_id: BTreeMap<i64, Note>,

    /// IDs are never handed out twice, not even after a failed create
    last_id: i64,
}

impl Notes {
    /// Hand out a fresh ID
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Build a fresh note, not stored yet
    fn new_note(&mut self, text: &str) -> Note {
        Note {
            id: self.next_id(),
            text: text.to_string(),
            created: Utc::now().naive_utc(),
            deleted: false,
            external_post_id: None,
        }
    }

    /// Change a stored note
    fn modify<F>(&mut self, id: i64, change: F) -> Result<Note>
    where
        F: FnOnce(&mut Note),
    {
        let note = self.by_id.get_mut(&id).ok_or(Error::NotFound)?;

        change(note);

        Ok(note.clone())
    }
}

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All notes in storage
    notes: Arc<Mutex<Notes>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for Memory {
    async fn find_all_active_notes(&self) -> Result<Vec<Note>> {
        Ok(self
            .notes
            .lock()
            .await
            .by_id
            .values()
            .rev()
            .filter(|note| !note.is_deleted())
            .cloned()
            .collect())
    }

    async fn find_latest_active_note(&self) -> Result<Option<Note>> {
        Ok(self
            .notes
            .lock()
            .await
            .by_id
            .values()
            .rev()
            .find(|note| !note.is_deleted())
            .cloned())
    }

    async fn find_single_note_by_id(&self, id: i64) -> Result<Option<Note>> {
        Ok(self.notes.lock().await.by_id.get(&id).cloned())
    }

    async fn create_note(&self, text: &str) -> Result<Note> {
        let mut notes = self.notes.lock().await;

        let note = notes.new_note(text);
        notes.by_id.insert(note.id, note.clone());

        Ok(note)
    }

    async fn create_mirrored_note<M: Mirror>(&self, text: &str, mirror: &M) -> Result<Note> {
        // the ID is reserved up front, a failed post leaves a gap
        let note = self.notes.lock().await.new_note(text);

        let external_post_id = mirror.post(&note.text).await.map_err(Error::Mirror)?;

        self.notes
            .lock()
            .await
            .by_id
            .insert(note.id, note.clone());

        self.set_external_post_id(&note, &external_post_id).await
    }

    async fn update_note_text(&self, note: &Note, text: &str) -> Result<Note> {
        self.notes
            .lock()
            .await
            .modify(note.id, |note| note.text = text.to_string())
    }

    async fn set_external_post_id(&self, note: &Note, external_post_id: &str) -> Result<Note> {
        self.notes.lock().await.modify(note.id, |note| {
            note.external_post_id = Some(external_post_id.to_string());
        })
    }

    async fn delete_note(&self, note: &Note) -> Result<()> {
        self.notes
            .lock()
            .await
            .modify(note.id, |note| note.deleted = true)
            .map(|_| ())
    }
}
