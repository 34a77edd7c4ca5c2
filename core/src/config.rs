//! Dictionary-build configuration, loadable from TOML. Grounded on the
//! teacher's `Config`/`PinyinConfig` TOML load/save idiom in
//! `core/src/lib.rs` and `libpinyin/src/config.rs`.
//!
//! The number+letter merge weight formula and the sticky-tokenizer's
//! `MAX_TOKEN_LENGTH` window stay fixed internal constants (see DESIGN.md's
//! Open Question decisions) rather than fields here, since exposing them
//! would add tunables nothing in this crate reads.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding the plain-text dictionary sources
    /// (`vndic_multiterm`, `acronyms`, ...), consumed by
    /// `dict::load_and_compile_all_dicts`.
    pub dict_path: PathBuf,

    /// Directory holding (or to receive) the compiled
    /// `multiterm.dat`/`syllable.dat`/`nontone_pairs.dat` dumps.
    pub out_path: PathBuf,

    /// Whether to build the syllable trie and pair matrix used for
    /// sticky-text splitting (off skips `Freq2NontoneUniFile`/`nontone_pair_freq`).
    pub load_nontone_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dict_path: PathBuf::from("data/tokenizer"),
            out_path: PathBuf::from("data/tokenizer/compiled"),
            load_nontone_data: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_conventional_data_layout() {
        let cfg = Config::default();
        assert_eq!(cfg.dict_path, PathBuf::from("data/tokenizer"));
        assert!(cfg.load_nontone_data);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = Config::default();
        let s = cfg.to_toml_string().unwrap();
        let back = Config::from_toml_str(&s).unwrap();
        assert_eq!(cfg.dict_path, back.dict_path);
        assert_eq!(cfg.out_path, back.out_path);
    }
}
