//! vitok-core
//!
//! Core tokenizer pipeline for Vietnamese text: codepoint classification,
//! normalization, the multiterm/syllable tries, the enumerator/sticky
//! splitting passes, and the dictionary compiler shared by the `vitok` CLI
//! and the `dictcompiler` binary.
//!
//! Public API:
//! - `Tokenizer` - loads the compiled dictionary dumps and segments text
//! - `CodepointTables` - Vietnamese codepoint classification tables
//! - `FullToken`/`Token` - the tokens produced by segmentation
//! - `config::Config` - dictionary-build configuration

pub mod error;
pub use error::{Result, TokenizerError};

pub mod codepoint;
pub use codepoint::CodepointTables;

pub mod hash_trie;
pub mod dat;
pub mod token;
pub use token::{FullToken, Token};

pub mod normalizer;
pub mod pair_matrix;
pub use pair_matrix::PairMatrix;
pub mod enumerator;
pub mod sticky;
pub mod segmenter;
pub mod compositor;
pub use compositor::{Tokenizer, TokenizeOption};
pub mod dict;
pub mod config;
pub use config::Config;
