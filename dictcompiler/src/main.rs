//! Compiles the plain-text dictionary sources under an input directory into
//! the runtime `multiterm.dat`/`syllable.dat`/`nontone_pairs.dat` dumps.
//! Grounded on `dict_compiler.cpp`'s `main()`:
//! `{prog} {INPUT_DICTS_PATH} {OUTPUT_DICTS_PATH}`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use vitok_core::codepoint::CodepointTables;
use vitok_core::config::Config;
use vitok_core::dict;

#[derive(Parser)]
#[command(about = "Compile vitok dictionary sources into runtime dumps")]
struct Args {
    /// Directory holding the plain-text dictionary sources
    /// (vndic_multiterm, acronyms, chemical_comp, special_token.strong, ...).
    /// Omit both positional arguments to load paths from `--config` instead.
    input: Option<PathBuf>,

    /// Directory to write the compiled dumps into
    output: Option<PathBuf>,

    /// Load `dict_path`/`out_path`/`load_nontone_data` from a TOML config
    /// file instead of (or to supply defaults for) the positional arguments
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip building the syllable trie and pair matrix (multiterm dict only)
    #[arg(long)]
    no_nontone: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let defaults = match &args.config {
        Some(path) => Config::load_toml(path).map_err(|e| anyhow::anyhow!("loading config {}: {e}", path.display()))?,
        None => Config::default(),
    };

    let input = args.input.unwrap_or(defaults.dict_path);
    let output = args.output.unwrap_or(defaults.out_path);
    let load_nontone_data = defaults.load_nontone_data && !args.no_nontone;

    std::fs::create_dir_all(&output).with_context(|| format!("creating output directory {}", output.display()))?;

    tracing::info!(input = %input.display(), output = %output.display(), "compiling dictionaries");

    let codepoints =
        CodepointTables::load(&input).with_context(|| format!("loading codepoint tables from {}", input.display()))?;

    dict::load_and_compile_all_dicts(&input, &output, load_nontone_data, &codepoints)
        .context("compiling dictionaries")?;

    tracing::info!("done");
    Ok(())
}
