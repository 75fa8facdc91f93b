// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecfoldError {
    #[error("Failed to load the Ruby grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("Parser produced no tree for the given source")]
    Parse,
}

pub type Result<T> = std::result::Result<T, SpecfoldError>;
