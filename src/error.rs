use crate::oligonucleotide::OligoId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdlemanError>;

#[derive(Debug, Error)]
pub enum AdlemanError {
    #[error("Oligonucleotide '{label}' has an empty sequence")]
    EmptySequence { label: String },

    #[error("Invalid base '{letter}' at position {position}")]
    InvalidBase { letter: char, position: usize },

    #[error("Center index {center} is outside 0..={len}")]
    CenterOutOfRange { center: usize, len: usize },

    #[error("Unknown oligonucleotide {0}")]
    UnknownOligo(OligoId),

    #[error("Broken ladder: {0}")]
    Invariant(String),

    #[error("Invalid graph: {0}")]
    Graph(String),

    #[error("Invalid parameter: {0}")]
    Parameter(String),

    #[error("Gel has no measured duplexes")]
    EmptyGel,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
