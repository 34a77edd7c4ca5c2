//! Dictionary compilation: reads the plain-text source dictionaries and
//! builds the compiled `MultitermDat`/`SyllableDat`/`PairMatrix` used at
//! runtime. Grounded on `dict_compiler.cpp`.

use std::path::Path;

use crate::codepoint::CodepointTables;
use crate::dat::{MultitermDat, SyllableDat};
use crate::error::{Result, TokenizerError};
use crate::hash_trie::{MultitermHashTrie, SyllableHashTrie};
use crate::pair_matrix::PairMatrix;

/// File names of the compiled artifacts written by
/// [`load_and_compile_all_dicts`] into the output directory. Names of our
/// own choosing: the original's `config.h` constants weren't part of the
/// retrieved sources.
pub const MULTITERM_DICT_DUMP: &str = "multiterm.dat";
pub const SYLLABLE_DICT_DUMP: &str = "syllable.dat";
pub const NONTONE_PAIR_DICT_DUMP: &str = "nontone_pairs.dat";

fn find_cut_pos(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = bytes.len() as i64 - 1;
    while i >= 0 && !bytes[i as usize].is_ascii_digit() {
        i -= 1;
    }
    while i >= 0 && bytes[i as usize].is_ascii_digit() {
        i -= 1;
    }
    if i < 0 {
        None
    } else {
        Some(i as usize)
    }
}

fn parse_number(line: &str, from: usize) -> i32 {
    line.as_bytes()[from..].iter().take_while(|b| b.is_ascii_digit()).fold(0i32, |acc, &b| {
        acc.saturating_mul(10).saturating_add((b - b'0') as i32)
    })
}

fn open_lines(dict_path: &Path, name: &str) -> Result<Vec<String>> {
    let path = dict_path.join(name);
    let content = std::fs::read_to_string(&path).map_err(|_| TokenizerError::DictNotFound { path: path.clone() })?;
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Loads `vndic_multiterm`: each line is a term followed by a trailing
/// frequency, with the cut point found by scanning back from the last
/// digit run. Also populates the syllable trie (space-split words) when
/// `load_nontone_data` is set.
pub fn load_vndic_multiterm(
    dict_path: &Path,
    load_nontone_data: bool,
    codepoints: &CodepointTables,
    multiterm_trie: &mut MultitermHashTrie,
    syllable_trie: &mut SyllableHashTrie,
) -> Result<()> {
    let lines = open_lines(dict_path, "vndic_multiterm")?;
    tracing::debug!(count = lines.len(), "loading vndic_multiterm");
    for line in lines {
        let Some(cut_pos) = find_cut_pos(&line) else {
            tracing::warn!(%line, "vndic_multiterm line has no trailing frequency, skipping");
            continue;
        };
        let freq = parse_number(&line, cut_pos + 1);
        let word = &line[..cut_pos];

        multiterm_trie.add_new_term(codepoints, word, freq, true, false);
        let root_word = codepoints.lower_root_str(word);
        if root_word != word {
            multiterm_trie.add_new_term(codepoints, &root_word, freq, false, false);
        }

        if load_nontone_data {
            let add_syllable = |syllable_trie: &mut SyllableHashTrie, w: &str| {
                syllable_trie.add_new_term(w, freq);
                let root = codepoints.lower_root_str(w);
                if root != w {
                    syllable_trie.add_new_term(&root, freq);
                }
            };
            for w in word.split(' ') {
                if !w.is_empty() {
                    add_syllable(syllable_trie, w);
                }
            }
        }
    }
    Ok(())
}

/// A handful of unit terms that never appear in the plain-text dictionary
/// but should always be recognized as single tokens.
pub fn load_common_terms(codepoints: &CodepointTables, multiterm_trie: &mut MultitermHashTrie) -> Result<()> {
    for term in ["m2", "m3", "km2"] {
        multiterm_trie.add_new_term(codepoints, term, i32::MAX, false, false);
    }
    Ok(())
}

/// Reads `Freq2NontoneUniFile` (one syllable per whitespace-separated
/// token) to assign syllable indices, then parses the raw `nontone_pair_freq`
/// varint stream into pair scores and writes the compiled `PairMatrix`.
pub fn load_and_dump_nontone_pairs(dict_path: &Path, out_path: &Path, syllable_trie: &mut SyllableDat) -> Result<()> {
    let path = dict_path.join("Freq2NontoneUniFile");
    let content = std::fs::read_to_string(&path).map_err(|_| TokenizerError::DictNotFound { path: path.clone() })?;

    let mut syllable_length: Vec<i32> = Vec::new();
    for s in content.split_whitespace() {
        let length = syllable_trie.update_index(s, syllable_length.len() as i32);
        syllable_length.push(length as i32);
    }

    let raw_path = dict_path.join("nontone_pair_freq");
    let raw = std::fs::read(&raw_path).map_err(|_| TokenizerError::DictNotFound { path: raw_path.clone() })?;
    let matrix = PairMatrix::build_from_input(&raw, &syllable_length)?;

    let out_file = std::fs::File::create(out_path)
        .map_err(|_| TokenizerError::DictMalformed { detail: format!("cannot create {}", out_path.display()) })?;
    let mut writer = std::io::BufWriter::new(out_file);
    matrix
        .write(&mut writer)
        .map_err(|e| TokenizerError::DictMalformed { detail: format!("writing {}: {e}", out_path.display()) })?;
    Ok(())
}

/// Loads `acronyms`: each line is `word frequency`, whitespace-separated.
pub fn load_acronyms(
    dict_path: &Path,
    load_nontone_data: bool,
    codepoints: &CodepointTables,
    multiterm_trie: &mut MultitermHashTrie,
    syllable_trie: &mut SyllableHashTrie,
) -> Result<()> {
    for line in open_lines(dict_path, "acronyms")? {
        let mut it = line.split_whitespace();
        let (Some(word), Some(freq)) = (it.next(), it.next().and_then(|s| s.parse::<i32>().ok())) else {
            tracing::warn!(%line, "acronyms line malformed, skipping");
            continue;
        };
        multiterm_trie.add_new_term(codepoints, word, freq, false, false);
        if load_nontone_data {
            syllable_trie.add_new_term(word, freq);
        }
    }
    Ok(())
}

/// Loads `chemical_comp`: whitespace-separated terms, each weighted as a
/// maximal-frequency special (non-splittable) term.
pub fn load_chemical_compounds(dict_path: &Path, codepoints: &CodepointTables, multiterm_trie: &mut MultitermHashTrie) -> Result<()> {
    let content = open_lines(dict_path, "chemical_comp")?;
    for line in content {
        for word in line.split_whitespace() {
            multiterm_trie.add_new_term(codepoints, word, i32::MAX, false, true);
        }
    }
    Ok(())
}

/// A hardcoded set of ASCII operator-laden brand/language terms, plus
/// `special_token.strong`, all inserted as maximal-frequency special terms.
pub fn load_special_terms(dict_path: &Path, codepoints: &CodepointTables, multiterm_trie: &mut MultitermHashTrie) -> Result<()> {
    const SPECIAL_TERMS: &[&str] =
        &["vietnam+", "google+", "notepad++", "c#", "c++", "g++", "xbase++", "vc++", "k+", "g+", "16+", "18+"];
    for term in SPECIAL_TERMS {
        multiterm_trie.add_new_term(codepoints, term, i32::MAX, false, true);
    }

    let content = open_lines(dict_path, "special_token.strong")?;
    for line in content {
        for word in line.split_whitespace() {
            multiterm_trie.add_new_term(codepoints, word, i32::MAX, false, true);
        }
    }
    Ok(())
}

/// Orchestrates the full dictionary build: runs every `load_*` pass over
/// `dict_path`'s plain-text sources, finalizes the double-array tries, and
/// writes the three compiled dump files into `out_path`. Grounded on
/// `load_and_compile_all_dicts`; intentionally omits `load_keywords` (the
/// original never calls it either — see `// load_keywords();` in the
/// source).
pub fn load_and_compile_all_dicts(
    dict_path: &Path,
    out_path: &Path,
    load_nontone_data: bool,
    codepoints: &CodepointTables,
) -> Result<()> {
    tracing::info!(dict_path = %dict_path.display(), out_path = %out_path.display(), load_nontone_data, "compiling all dictionaries");
    let mut multiterm_hashtrie = MultitermHashTrie::new();
    let mut syllable_hashtrie = SyllableHashTrie::new();

    load_vndic_multiterm(dict_path, load_nontone_data, codepoints, &mut multiterm_hashtrie, &mut syllable_hashtrie)?;
    load_common_terms(codepoints, &mut multiterm_hashtrie)?;
    load_acronyms(dict_path, load_nontone_data, codepoints, &mut multiterm_hashtrie, &mut syllable_hashtrie)?;
    load_chemical_compounds(dict_path, codepoints, &mut multiterm_hashtrie)?;
    load_special_terms(dict_path, codepoints, &mut multiterm_hashtrie)?;

    let multiterm_nodes = multiterm_hashtrie.dump_structure();
    let multiterm_alphabet = multiterm_hashtrie.dump_alphabet();
    let multiterm_trie = MultitermDat::build_from_hash_trie(&multiterm_nodes, &multiterm_alphabet);
    let multiterm_out = out_path.join(MULTITERM_DICT_DUMP);
    let file = std::fs::File::create(&multiterm_out)
        .map_err(|_| TokenizerError::DictMalformed { detail: format!("cannot create {}", multiterm_out.display()) })?;
    multiterm_trie
        .write(&mut std::io::BufWriter::new(file))
        .map_err(|e| TokenizerError::DictMalformed { detail: format!("writing {}: {e}", multiterm_out.display()) })?;

    let syllable_nodes = syllable_hashtrie.dump_structure();
    let syllable_alphabet = syllable_hashtrie.dump_alphabet();
    let mut syllable_trie = SyllableDat::build_from_hash_trie(&syllable_nodes, &syllable_alphabet);

    if load_nontone_data {
        let nontone_out = out_path.join(NONTONE_PAIR_DICT_DUMP);
        load_and_dump_nontone_pairs(dict_path, &nontone_out, &mut syllable_trie)?;
    }

    let syllable_out = out_path.join(SYLLABLE_DICT_DUMP);
    let file = std::fs::File::create(&syllable_out)
        .map_err(|_| TokenizerError::DictMalformed { detail: format!("cannot create {}", syllable_out.display()) })?;
    syllable_trie
        .write(&mut std::io::BufWriter::new(file))
        .map_err(|e| TokenizerError::DictMalformed { detail: format!("writing {}: {e}", syllable_out.display()) })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn find_cut_pos_locates_trailing_frequency() {
        assert_eq!(find_cut_pos("ha noi123"), Some(6));
        assert_eq!(find_cut_pos("no digits here"), None);
    }

    #[test]
    fn parse_number_reads_leading_digit_run() {
        assert_eq!(parse_number("123abc", 0), 123);
        assert_eq!(parse_number("abc", 0), 0);
    }

    #[test]
    fn load_vndic_multiterm_inserts_term_and_syllables() {
        let dir = std::env::temp_dir().join(format!("vitok-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_file(&dir, "vndic_multiterm", "ha noi100\n");

        let codepoints = CodepointTables::simple();
        let mut multiterm_trie = MultitermHashTrie::new();
        let mut syllable_trie = SyllableHashTrie::new();
        load_vndic_multiterm(&dir, true, &codepoints, &mut multiterm_trie, &mut syllable_trie).unwrap();

        let nodes = multiterm_trie.dump_structure();
        assert!(nodes.iter().any(|n| n.frequency == 100));

        std::fs::remove_dir_all(&dir).ok();
    }
}
