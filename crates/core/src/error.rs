use thiserror::Error;

/// Error enum for crate-specific errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The backend could not be reached.
    #[error("failed to connect to {url}: {message}")]
    Connection {
        /// The url we were trying to get.
        url: String,

        /// The underlying error message.
        message: String,
    },

    /// The paging parameters can't be expressed as a backend record range.
    #[error("invalid paging: start_index={start_index}, limit={limit}")]
    InvalidPaging {
        /// The zero-based index of the first record.
        start_index: u64,

        /// The number of records requested.
        limit: u64,
    },

    /// The identifier is not a valid UUID.
    #[error("{0} is not a valid UUID identifier")]
    InvalidQuery(String),

    /// A single-record lookup returned no items.
    #[error("record id {0} not found")]
    ItemNotFound(String),

    /// Returned when a required configuration value is missing.
    #[error("missing {0} setting in geocore configuration")]
    MissingConfig(&'static str),

    /// The query produced no usable features.
    #[error("query returned nothing")]
    NoData,

    /// The backend returned a non-success status.
    #[error("failed to query {url}: status={status}")]
    Query {
        /// The url that was queried.
        url: String,

        /// The http status code.
        status: u16,
    },

    /// [reqwest::Error]
    #[cfg(feature = "reqwest")]
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// [serde_urlencoded::ser::Error]
    #[error(transparent)]
    SerdeUrlencoded(#[from] serde_urlencoded::ser::Error),

    /// Returned when a result type string is not `results` or `hits`.
    #[error("unknown result type: {0}")]
    UnknownResultType(String),

    /// [url::ParseError]
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}
