//! Error enum
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Reqwest(reqwest::Error),
    Url(url::ParseError),
    Custom(String),
    /// A month has no entry in the dump index.
    MissingDump((i32, u32)),
    /// All attempts to fetch `url` failed.
    Download { url: String, attempts: usize },
    /// A comment line could not be turned into a [crate::comment::Comment].
    Decode(String),
    /// A pipeline stage thread panicked.
    WorkerPanic(String),
    /// One or more per-file jobs failed, the others ran to completion.
    Jobs(Vec<(PathBuf, String)>),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Serde(e) => write!(f, "serialization error: {e}"),
            Error::Reqwest(e) => write!(f, "http error: {e}"),
            Error::Url(e) => write!(f, "url error: {e}"),
            Error::Custom(s) => write!(f, "{s}"),
            Error::MissingDump((year, month)) => {
                write!(f, "no dump found for {year}-{month:02}")
            }
            Error::Download { url, attempts } => {
                write!(f, "could not download {url} after {attempts} attempts")
            }
            Error::Decode(s) => write!(f, "could not decode comment: {s}"),
            Error::WorkerPanic(s) => write!(f, "worker panicked: {s}"),
            Error::Jobs(failures) => write!(f, "{} job(s) failed", failures.len()),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Reqwest(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Error {
        Error::Url(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
