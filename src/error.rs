//! Error type shared by the catalog store and the recipe loader.

use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be issued or the browser rejected it.
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// The server answered with a non-2xx status.
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be read as text.
    #[error("could not read body of {url}: {reason}")]
    Body { url: String, reason: String },

    /// The catalog payload is not valid JSON for the expected shape.
    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Error {
    pub fn network(url: &str, err: impl Display) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn body(url: &str, err: impl Display) -> Self {
        Self::Body {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_mention_the_catalog() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid catalog:"));
    }

    #[test]
    fn status_error_names_url_and_code() {
        let err = Error::Status {
            url: "./data/breads.json".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "./data/breads.json answered with HTTP 404");
    }

    #[test]
    fn fetch_failures_carry_the_reason() {
        let err = Error::network("./content/recipes/conchas.md", "Failed to fetch");
        assert_eq!(
            err.to_string(),
            "network error fetching ./content/recipes/conchas.md: Failed to fetch"
        );
        let err = Error::body("./data/breads.json", "stream closed");
        assert!(matches!(err, Error::Body { ref reason, .. } if reason == "stream closed"));
    }
}
