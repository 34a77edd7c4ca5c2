//! Command-line front end for the tokenizer. Loads the compiled dictionary
//! dumps produced by `dictcompiler` and tokenizes stdin or an argument
//! string. Grounded on `tokenizer.hpp`'s `segment*` wrappers and
//! `handle_tokenization_request`'s HOST/URL/NORMAL dispatch.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use vitok_core::codepoint::CodepointTables;
use vitok_core::dat::{MultitermDat, SyllableDat};
use vitok_core::dict::{MULTITERM_DICT_DUMP, NONTONE_PAIR_DICT_DUMP, SYLLABLE_DICT_DUMP};
use vitok_core::pair_matrix::PairMatrix;
use vitok_core::{TokenizeOption, Tokenizer};

#[derive(Copy, Clone, ValueEnum)]
enum Mode {
    Normal,
    Host,
    Url,
}

impl From<Mode> for TokenizeOption {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Normal => TokenizeOption::Normal,
            Mode::Host => TokenizeOption::Host,
            Mode::Url => TokenizeOption::Url,
        }
    }
}

#[derive(Parser)]
#[command(about = "Tokenize Vietnamese text")]
struct Args {
    /// Directory holding the compiled multiterm.dat/syllable.dat/
    /// nontone_pairs.dat dumps (the `dictcompiler` OUTPUT directory)
    #[arg(long)]
    dicts: PathBuf,

    /// Directory holding the codepoint dict sources (alphabetic, numeric,
    /// d_and_gi.txt, i_and_y.txt — the `dictcompiler` INPUT directory).
    /// Defaults to `--dicts` when omitted.
    #[arg(long)]
    codepoints: Option<PathBuf>,

    /// Text to tokenize. Reads lines from stdin when omitted.
    text: Option<String>,

    #[arg(long, value_enum, default_value_t = Mode::Normal)]
    mode: Mode,

    /// Keep punctuation tokens (uses `segment_general` instead of
    /// `segment_original`)
    #[arg(long)]
    for_transforming: bool,
}

fn load_tokenizer(dicts_dir: &std::path::Path, codepoints_dir: &std::path::Path) -> Result<Tokenizer> {
    let codepoints = CodepointTables::load(codepoints_dir)
        .with_context(|| format!("loading codepoint tables from {}", codepoints_dir.display()))?;

    let multiterm_trie = {
        let path = dicts_dir.join(MULTITERM_DICT_DUMP);
        let file = std::fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        MultitermDat::read(&mut std::io::BufReader::new(file)).with_context(|| format!("reading {}", path.display()))?
    };

    let syllable_trie = {
        let path = dicts_dir.join(SYLLABLE_DICT_DUMP);
        let file = std::fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        SyllableDat::read(&mut std::io::BufReader::new(file)).with_context(|| format!("reading {}", path.display()))?
    };

    let pair_matrix = {
        let path = dicts_dir.join(NONTONE_PAIR_DICT_DUMP);
        match std::fs::File::open(&path) {
            Ok(file) => PairMatrix::read(&mut std::io::BufReader::new(file))
                .with_context(|| format!("reading {}", path.display()))?,
            Err(_) => {
                tracing::warn!(path = %path.display(), "no pair matrix dump found, sticky-splitting will use bare syllable frequencies");
                PairMatrix::empty(0)
            }
        }
    };

    Ok(Tokenizer::new(codepoints, multiterm_trie, syllable_trie, pair_matrix))
}

fn tokenize_line(tokenizer: &Tokenizer, line: &str, args: &Args) {
    let tokens = if args.for_transforming {
        tokenizer.segment_general(line, args.mode.into())
    } else {
        tokenizer.segment_original(line, args.mode.into())
    };
    for t in tokens {
        println!("{}", t.to_display_string());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let codepoints_dir = args.codepoints.clone().unwrap_or_else(|| args.dicts.clone());
    let tokenizer = load_tokenizer(&args.dicts, &codepoints_dir)?;

    if let Some(text) = &args.text {
        tokenize_line(&tokenizer, text, &args);
        return Ok(());
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        tokenize_line(&tokenizer, &line, &args);
    }
    Ok(())
}
