// Error types shared by the library modules. The binary and the menu layer
// wrap these in `anyhow` so they only need to be precise where a caller
// might want to react to a specific failure (e.g. a missing employer).

use thiserror::Error;

/// Failures talking to the remote job-search API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or the connection broke.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The body was not the JSON object we expected.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failures of the relational record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Any SQLite failure that has no more specific variant.
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// A vacancy referenced an employer that was never saved.
    #[error("employer {employer_id} does not exist")]
    Referential { employer_id: i64 },

    /// A record lacked a field the table requires.
    #[error("record has no usable `{0}` field")]
    MissingField(&'static str),

    /// Creating the directory that holds the database file failed.
    #[error("could not prepare database location: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
