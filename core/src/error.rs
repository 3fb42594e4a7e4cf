use std::{io, path::PathBuf};

use thiserror::Error;

pub type BrutyfResult<T> = std::result::Result<T, BrutyfError>;

#[derive(Error, Debug)]
pub enum BrutyfError {
    #[error("The {mode} attack requires {input}")]
    MissingInput {
        mode: &'static str,
        input: &'static str,
    },

    #[error("Unrecognized {kind}: {value}")]
    Unrecognized { kind: &'static str, value: String },

    #[error("Unable to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Unable to access the file at the given path. Make sure the right permissions are available"
    )]
    Io(#[from] io::Error),

    #[error("Failed to read or write JSON data")]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize the markov model")]
    Serialize,

    #[error("Failed to deserialize the markov model. Is the file corrupted?")]
    Deserialize,

    #[error("The markov model has not been trained on any password")]
    EmptyModel,

    #[error("A worker thread panicked")]
    WorkerPanicked,
}

impl BrutyfError {
    /// Wraps an I/O error with the path that caused it.
    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
}
