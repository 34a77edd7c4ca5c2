use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while initializing the tokenizer (loading codepoint
/// tables and compiled dictionaries). Segmentation itself never fails.
#[derive(Debug)]
pub enum TokenizerError {
    DictNotFound { path: PathBuf },
    DictMalformed { detail: String },
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerError::DictNotFound { path } => {
                write!(f, "dictionary file not found: {}", path.display())
            }
            TokenizerError::DictMalformed { detail } => {
                write!(f, "dictionary file malformed: {detail}")
            }
        }
    }
}

impl std::error::Error for TokenizerError {}

pub type Result<T> = std::result::Result<T, TokenizerError>;
