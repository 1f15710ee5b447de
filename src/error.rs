//! Error types for picograd

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Invalid shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Operands belong to different graphs")]
    GraphMismatch,

    #[error("Graph is full: node limit of {limit} reached")]
    GraphFull { limit: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;
