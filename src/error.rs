use thiserror::Error;

/// Library error. Upstream HTTP failures keep the raw response body so
/// callers can pattern-match on the status or surface the text as-is.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to get access token: {body}")]
    Token {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to get artist: {body}")]
    ArtistSearch {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to get albums: {body}")]
    AlbumList {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The search returned 200 with an empty result list.
    #[error("no artist found matching {query:?}")]
    ArtistNotFound { query: String },

    /// A 200 response was missing a field the caller needs.
    #[error("malformed response: missing {0}")]
    MalformedResponse(&'static str),

    /// A mail configuration value required in this mode was absent.
    #[error("missing mail configuration value: {0}")]
    MissingMailConfig(&'static str),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error(transparent)]
    MailMessage(#[from] lettre::error::Error),

    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),
}
