//! Notes

use chrono::naive::NaiveDateTime;

/// A single anonymous note
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Note {
    /// Note ID, assigned by the storage and never reused
    pub id: i64,

    /// Sanitized content of the note
    pub text: String,

    /// Creation date
    pub created: NaiveDateTime,

    /// Soft-deleted notes are hidden from listings
    pub deleted: bool,

    /// ID of the post on the social account this note was mirrored to
    pub external_post_id: Option<String>,
}

impl Note {
    /// Is the note soft-deleted?
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}
