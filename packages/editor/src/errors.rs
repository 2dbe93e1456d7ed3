//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Invalid mutation payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
