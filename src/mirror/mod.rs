//! Mirroring notes as posts on a social account

use core::fmt;
use std::future::Future;

pub use twitter::Twitter;
pub use twitter::TwitterConfig;

mod oauth;
mod twitter;

/// Mirror errors, all of them mean the post was not published
#[derive(Debug)]
pub enum Error {
    /// The formatted post exceeds the length limit of the platform
    TooLong {
        /// Length of the formatted post
        length: usize,

        /// Maximum length allowed by the platform
        max: usize,
    },

    /// The platform could not be reached
    Request(String),

    /// The platform refused the post
    Rejected {
        /// HTTP status returned by the platform
        status: u16,

        /// Reason given by the platform
        message: String,
    },

    /// The platform answered with something unexpected
    InvalidResponse(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TooLong { length, max } => {
                write!(f, "Post is too long: {length} characters, maximum is {max}")
            }
            Error::Request(error) => write!(f, "Request error: {error}"),
            Error::Rejected { status, message } => {
                write!(f, "Post rejected ({status}): {message}")
            }
            Error::InvalidResponse(error) => write!(f, "Invalid response: {error}"),
        }
    }
}

/// Result type for all mirror interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Format the text of a note the way it is posted
///
/// Wrapped in double quotes with the `-anon.` attribution, `hello` becomes `"hello" -anon.`
pub fn format_post(text: &str) -> String {
    format!(r#""{text}" -anon."#)
}

/// A social account notes are mirrored to
pub trait Mirror: Clone + Send + Sync + 'static {
    /// Publish the text of a note, returns the ID of the new post
    fn post(&self, text: &str) -> impl Future<Output = Result<String>> + Send;

    /// Public URL of a published post
    fn post_url(&self, external_post_id: &str) -> String;
}
