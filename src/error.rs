use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Please provide at least {min_chars} characters of text.")]
    InvalidInput { min_chars: usize },
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed lexicon: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("emotion category '{0}' is missing")]
    MissingEmotion(&'static str),

    #[error("unknown emotion category '{0}' (expected joy, fear, anger, trust)")]
    UnknownEmotion(String),

    #[error("category '{0}' contains an empty term")]
    EmptyTerm(String),

    #[error("lexicon has no persuasion categories")]
    NoPersuasionCategories,

    #[error("term '{term}' does not compile to a pattern: {source}")]
    Pattern {
        term: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
