use std::path::PathBuf;
use thiserror::Error;

/// Crate-specific error enum.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The source directory does not exist.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// [std::io::Error]
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// There were no items to write.
    #[error("no items")]
    NoItems,

    /// The file is not a STAC collection.
    #[error("not a STAC collection: {0}")]
    NotACollection(String),

    /// A document could not be parsed as STAC.
    #[error("invalid STAC in {href}: {error}")]
    Parse {
        /// The href of the offending document.
        href: String,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// A HTTP request failed.
    #[error("error requesting {url}: {error}")]
    Request {
        /// The url of the failed request.
        url: String,

        /// The underlying error.
        #[source]
        error: reqwest::Error,
    },

    /// [reqwest::Error]
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// [stac::Error]
    #[error(transparent)]
    Stac(#[from] stac::Error),

    /// [url::ParseError]
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// [walkdir::Error]
    #[error(transparent)]
    Walkdir(#[from] walkdir::Error),

    /// The destination could not be created or written.
    #[error("cannot write {}: {error}", .path.display())]
    Write {
        /// The destination path.
        path: PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },
}
