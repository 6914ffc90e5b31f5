//! Twitter mirror
//!
//! Posts on a single pre-authorized account via the v2 API, signed with OAuth 1.0a

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use super::Error;
use super::Mirror;
use super::Result;
use super::format_post;
use super::oauth;

/// Endpoint to create new posts
const TWEETS_URL: &str = "https://api.twitter.com/2/tweets";

/// Maximum length of a post, counted after NFC normalization like Twitter does
const MAX_POST_LENGTH: usize = 280;

/// Give up on Twitter after this long
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials and account name of the mirrored account
#[derive(Debug)]
pub struct TwitterConfig {
    /// `CONSUMER_KEY`
    pub consumer_key: String,

    /// `CONSUMER_SECRET`
    pub consumer_secret: String,

    /// `ACCESS_KEY`
    pub access_key: String,

    /// `ACCESS_SECRET`
    pub access_secret: String,

    /// `TWITTER_USER`, the screen name used in post URLs
    pub account: String,
}

/// Twitter mirror
#[derive(Clone)]
pub struct Twitter {
    /// Shared HTTP client
    client: Client,

    /// Account configuration
    config: Arc<TwitterConfig>,
}

impl Twitter {
    /// Create the Twitter mirror for an account
    pub fn new(config: TwitterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| Error::Request(err.to_string()))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// OAuth credentials of the account
    fn credentials(&self) -> oauth::Credentials<'_> {
        oauth::Credentials {
            consumer_key: &self.config.consumer_key,
            consumer_secret: &self.config.consumer_secret,
            access_token: &self.config.access_key,
            access_token_secret: &self.config.access_secret,
        }
    }
}

/// Body to create a post
#[derive(Serialize)]
struct CreateTweet<'a> {
    /// Text of the post
    text: &'a str,
}

/// Response of the create endpoint
#[derive(Deserialize)]
struct CreateTweetResponse {
    /// The created post
    data: Option<CreatedTweet>,
}

/// The created post
#[derive(Deserialize)]
struct CreatedTweet {
    /// Post ID
    id: String,
}

/// Error response of the API
#[derive(Deserialize)]
struct ErrorResponse {
    /// Problem description
    detail: Option<String>,

    /// Older style error list
    #[serde(default)]
    errors: Vec<ErrorMessage>,
}

/// Single error in an error response
#[derive(Deserialize)]
struct ErrorMessage {
    /// Human readable message
    message: String,
}

impl Mirror for Twitter {
    async fn post(&self, text: &str) -> Result<String> {
        let status = format_post(text);
        check_length(&status)?;

        let authorization = oauth::authorization_header("POST", TWEETS_URL, &self.credentials());

        let response = self
            .client
            .post(TWEETS_URL)
            .header(AUTHORIZATION, authorization)
            .json(&CreateTweet { text: &status })
            .send()
            .await
            .map_err(|err| Error::Request(err.to_string()))?;

        let status_code = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Request(err.to_string()))?;

        if !status_code.is_success() {
            return Err(Error::Rejected {
                status: status_code.as_u16(),
                message: rejection_message(&body),
            });
        }

        parse_created_id(&body)
    }

    fn post_url(&self, external_post_id: &str) -> String {
        format!(
            "https://twitter.com/{}/status/{external_post_id}",
            self.config.account
        )
    }
}

/// Make sure the post fits
fn check_length(status: &str) -> Result<()> {
    let length = status.nfc().count();

    if length > MAX_POST_LENGTH {
        return Err(Error::TooLong {
            length,
            max: MAX_POST_LENGTH,
        });
    }

    Ok(())
}

/// Get the post ID from a successful response
fn parse_created_id(body: &str) -> Result<String> {
    let response = serde_json::from_str::<CreateTweetResponse>(body)
        .map_err(|err| Error::InvalidResponse(err.to_string()))?;

    response
        .data
        .map(|tweet| tweet.id)
        .ok_or_else(|| Error::InvalidResponse(format!("Missing post data: {body}")))
}

/// Get the most useful message out of an error response
fn rejection_message(body: &str) -> String {
    let Ok(response) = serde_json::from_str::<ErrorResponse>(body) else {
        return body.to_string();
    };

    if !response.errors.is_empty() {
        return response
            .errors
            .into_iter()
            .map(|error| error.message)
            .collect::<Vec<String>>()
            .join("; ");
    }

    response.detail.unwrap_or_else(|| body.to_string())
}
