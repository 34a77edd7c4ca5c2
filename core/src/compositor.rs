//! Public tokenizer facade: bundles the compiled dictionaries and exposes
//! the `segment*` entry points plus the HOST/URL tokenize-option dispatch.
//! Grounded on `Tokenizer`'s public surface (`run_tokenize_url`,
//! `run_tokenize_host`, `handle_tokenization_request`, `segment*`) in
//! `tokenizer.hpp`.

use crate::codepoint::CodepointTables;
use crate::dat::{MultitermDat, SyllableDat};
use crate::normalizer;
use crate::pair_matrix::PairMatrix;
use crate::segmenter::{self, SegmenterDicts};
use crate::sticky;
use crate::token::{vector_match_string, FullToken, Token};

/// Mirrors `TOKENIZE_NORMAL`/`TOKENIZE_HOST`/`TOKENIZE_URL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeOption {
    Normal,
    Host,
    Url,
}

/// Owns the compiled multiterm/syllable dictionaries and pair matrix used
/// to tokenize text. Build one with [`Tokenizer::new`] (or via
/// `dict::load_and_compile_all_dicts` + this constructor).
pub struct Tokenizer {
    codepoints: CodepointTables,
    multiterm_trie: MultitermDat,
    syllable_trie: SyllableDat,
    pair_matrix: PairMatrix,
}

impl Tokenizer {
    pub fn new(
        codepoints: CodepointTables,
        multiterm_trie: MultitermDat,
        syllable_trie: SyllableDat,
        pair_matrix: PairMatrix,
    ) -> Self {
        Tokenizer { codepoints, multiterm_trie, syllable_trie, pair_matrix }
    }

    fn dicts(&self) -> SegmenterDicts<'_> {
        SegmenterDicts {
            codepoints: &self.codepoints,
            multiterm_trie: &self.multiterm_trie,
            syllable_trie: &self.syllable_trie,
            pair_matrix: &self.pair_matrix,
        }
    }

    fn handle_tokenization_request(
        &self,
        text: &mut Vec<u32>,
        original_pos: &mut Vec<i32>,
        for_transforming: bool,
        tokenize_option: TokenizeOption,
    ) -> (Vec<Token>, Vec<i32>) {
        let dicts = self.dicts();
        match tokenize_option {
            TokenizeOption::Normal => segmenter::run_tokenize(&dicts, text, for_transforming, true, false),
            TokenizeOption::Host => {
                let ranges = run_tokenize_host(&self.codepoints, text, original_pos);
                (ranges, Vec::new())
            }
            TokenizeOption::Url => run_tokenize_url(&dicts, text, original_pos, for_transforming),
        }
    }

    /// Tokenize `original_text`, producing tokens whose `.text` carries the
    /// normalized (lowercased/tone-merged) substring.
    pub fn segment(&self, original_text: &str, for_transforming: bool, tokenize_option: TokenizeOption) -> Vec<FullToken> {
        let (mut text, mut original_pos) = normalizer::normalize(&self.codepoints, original_text);
        let (ranges, mut space_positions) =
            self.handle_tokenization_request(&mut text, &mut original_pos, for_transforming, tokenize_option);

        if tokenize_option == TokenizeOption::Url {
            space_positions.clear();
        }
        space_positions.push(-1);

        let mut res = Vec::with_capacity(ranges.len());
        let mut it = 0usize;
        for mut tok in ranges {
            tok.original_start += original_pos[tok.normalized_start as usize];
            tok.original_end += original_pos[tok.normalized_end as usize];
            let mut s = String::new();
            for pos in tok.normalized_start..tok.normalized_end {
                if it < space_positions.len() && space_positions[it] == pos {
                    s.push(if for_transforming { '_' } else { ' ' });
                    it += 1;
                }
                if let Some(c) = char::from_u32(text[pos as usize]) {
                    s.push(c);
                }
            }
            res.push(FullToken { token: tok, text: s });
        }
        res
    }

    /// Like [`Tokenizer::segment`], but token text is sliced from the
    /// original (pre-normalization) bytes and offsets map back into
    /// `original_text`.
    pub fn segment_original(&self, original_text: &str, tokenize_option: TokenizeOption) -> Vec<FullToken> {
        let (mut text, mut original_pos) = normalizer::normalize(&self.codepoints, original_text);
        let (ranges, mut space_positions) =
            self.handle_tokenization_request(&mut text, &mut original_pos, false, tokenize_option);

        for pos in space_positions.iter_mut() {
            *pos = original_pos[*pos as usize];
        }
        space_positions.push(-1);

        let original_bytes = original_text.as_bytes();
        let mut res = Vec::with_capacity(ranges.len());
        let mut it = 0usize;
        for mut tok in ranges {
            tok.original_start += original_pos[tok.normalized_start as usize];
            tok.original_end += original_pos[tok.normalized_end as usize];
            let mut bytes = Vec::new();
            for pos in tok.original_start..tok.original_end {
                if it < space_positions.len() && space_positions[it] == pos {
                    if pos > tok.original_start {
                        bytes.push(b'_');
                    }
                    it += 1;
                }
                let b = original_bytes[pos as usize];
                bytes.push(if b == b' ' { b'_' } else { b });
            }
            let s = String::from_utf8(bytes).unwrap_or_default();
            res.push(FullToken { token: tok, text: s });
        }
        res
    }

    /// ASCII debug view of the pure sticky syllable split (non-ASCII
    /// codepoints render as `?`).
    pub fn segment_sticky_to_string(&self, original_text: &str) -> String {
        let (text, _original_pos) = normalizer::normalize(&self.codepoints, original_text);
        let space_positions =
            sticky::tokenize_sticky_to_syllables(&self.codepoints, &self.syllable_trie, &self.pair_matrix, &text);

        let mut res = String::new();
        let mut it = 0usize;
        for (i, &c) in text.iter().enumerate() {
            if it < space_positions.len() && space_positions[it] == i {
                res.push(' ');
                it += 1;
            }
            if c < 128 {
                res.push(c as u8 as char);
            } else {
                res.push('?');
            }
        }
        res
    }

    pub fn segment_to_string_list(&self, text: &str, for_transforming: bool, tokenize_option: TokenizeOption) -> Vec<String> {
        self.segment(text, for_transforming, tokenize_option).into_iter().map(|t| t.text).collect()
    }

    /// Like [`Tokenizer::segment_original`], but keeps punctuation tokens
    /// (via `for_transforming=true` internally) and drops the resulting
    /// bare `"_"` placeholder tokens.
    pub fn segment_general(&self, original_text: &str, tokenize_option: TokenizeOption) -> Vec<FullToken> {
        let (mut text, mut original_pos) = normalizer::normalize(&self.codepoints, original_text);
        let (ranges, mut space_positions) =
            self.handle_tokenization_request(&mut text, &mut original_pos, true, tokenize_option);

        for pos in space_positions.iter_mut() {
            *pos = original_pos[*pos as usize];
        }
        space_positions.push(-1);

        let original_bytes = original_text.as_bytes();
        let mut res = Vec::with_capacity(ranges.len());
        let mut it = 0usize;
        for mut tok in ranges {
            tok.original_start += original_pos[tok.normalized_start as usize];
            tok.original_end += original_pos[tok.normalized_end as usize];
            let mut bytes = Vec::new();
            for pos in tok.original_start..tok.original_end {
                if it < space_positions.len() && space_positions[it] == pos {
                    if pos > tok.original_start {
                        bytes.push(b'_');
                    }
                    it += 1;
                }
                let b = original_bytes[pos as usize];
                bytes.push(if b == b' ' { b'_' } else { b });
            }
            let s = String::from_utf8(bytes).unwrap_or_default();
            res.push(FullToken { token: tok, text: s });
        }
        res.retain(|t| t.text != "_");
        res
    }
}

/// Collapses `text` to alphanumeric characters plus `.`, emitting one token
/// per dot-separated component. Grounded on `run_tokenize_host`.
fn run_tokenize_host(codepoints: &CodepointTables, text: &mut Vec<u32>, original_pos: &mut [i32]) -> Vec<Token> {
    let mut new_length = 0usize;
    let mut last_dot_position: i32 = -1;
    let mut ranges = Vec::new();
    let orig_len = text.len();

    for i in 0..orig_len {
        if codepoints.is_alphanumeric(text[i]) {
            text[new_length] = text[i];
            original_pos[new_length] = original_pos[i];
            new_length += 1;
        } else if text[i] == '.' as u32 {
            ranges.push(Token::new(last_dot_position + 1, new_length as i32));
            last_dot_position = new_length as i32;
            text[new_length] = text[i];
            original_pos[new_length] = original_pos[i];
            new_length += 1;
        }
    }
    original_pos[new_length] = *original_pos.last().unwrap();
    ranges.push(Token::new(last_dot_position + 1, new_length as i32));
    text.truncate(new_length);
    ranges
}

fn push_sticky_segment(
    dicts: &SegmenterDicts,
    text: &[u32],
    original_pos: &[i32],
    from: usize,
    to: usize,
    space_positions: &mut Vec<i32>,
    new_text: &mut Vec<u32>,
    new_original_pos: &mut Vec<i32>,
) {
    let sublength = to - from;
    let mut it = space_positions.len();
    let sub_splits = sticky::tokenize_pure_sticky_to_syllables(dicts.syllable_trie, dicts.pair_matrix, &text[from..to]);
    space_positions.extend(sub_splits.iter().map(|&p| p as i32));

    for pos in 0..sublength {
        if it < space_positions.len() && pos as i32 == space_positions[it] {
            space_positions[it] = new_text.len() as i32;
            new_text.push(' ' as u32);
            new_original_pos.push(original_pos[from + pos]);
            it += 1;
        }
        new_text.push(text[from + pos]);
        new_original_pos.push(original_pos[from + pos]);
    }
}

/// Strips an optional `http(s)://` prefix, replaces delimiters with spaces
/// (keeping `.`/`/` literal), sticky-splits each alphanumeric run, then
/// runs the normal segmenter with `tokenize_sticky=false,
/// dont_push_puncts=true`. Grounded on `run_tokenize_url`.
fn run_tokenize_url(
    dicts: &SegmenterDicts,
    text: &mut Vec<u32>,
    original_pos: &mut Vec<i32>,
    for_transforming: bool,
) -> (Vec<Token>, Vec<i32>) {
    let mut start_index = 0usize;
    if vector_match_string(&text[..], "http", 0) {
        if vector_match_string(&text[..], "://", 4) {
            start_index = 7;
        } else if vector_match_string(&text[..], "s://", 4) {
            start_index = 8;
        }
    }

    let mut new_text: Vec<u32> = Vec::with_capacity(text.len());
    let mut new_original_pos: Vec<i32> = Vec::with_capacity(original_pos.len());
    let mut space_positions: Vec<i32> = Vec::new();

    let mut last_non_alphanumeric: i32 = start_index as i32 - 1;
    for i in start_index..text.len() {
        if !dicts.codepoints.is_alphanumeric(text[i]) {
            if last_non_alphanumeric + 1 != i as i32 {
                push_sticky_segment(
                    dicts,
                    &text[..],
                    &original_pos[..],
                    (last_non_alphanumeric + 1) as usize,
                    i,
                    &mut space_positions,
                    &mut new_text,
                    &mut new_original_pos,
                );
            }
            if text[i] != '.' as u32 && text[i] != '/' as u32 {
                new_text.push(' ' as u32);
            } else {
                new_text.push(text[i]);
            }
            new_original_pos.push(original_pos[i]);
            last_non_alphanumeric = i as i32;
        }
    }
    if last_non_alphanumeric + 1 != text.len() as i32 {
        push_sticky_segment(
            dicts,
            &text[..],
            &original_pos[..],
            (last_non_alphanumeric + 1) as usize,
            text.len(),
            &mut space_positions,
            &mut new_text,
            &mut new_original_pos,
        );
    }
    new_original_pos.push(*original_pos.last().unwrap());

    *text = new_text;
    *original_pos = new_original_pos;

    segmenter::run_tokenize(dicts, text, for_transforming, false, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_trie::{MultitermHashTrie, SyllableHashTrie};

    fn fixture_tokenizer() -> Tokenizer {
        let codepoints = CodepointTables::simple();
        let mut mtrie = MultitermHashTrie::new();
        mtrie.add_new_term(&codepoints, "ha noi", 100, false, false);
        let nodes = mtrie.dump_structure();
        let alphabet = mtrie.dump_alphabet();
        let multiterm_trie = MultitermDat::build_from_hash_trie(&nodes, &alphabet);

        let mut strie = SyllableHashTrie::new();
        strie.add_new_term("ha", 50);
        strie.add_new_term("noi", 50);
        let nodes = strie.dump_structure();
        let alphabet = strie.dump_alphabet();
        let mut syllable_trie = SyllableDat::build_from_hash_trie(&nodes, &alphabet);
        syllable_trie.update_index("ha", 0);
        syllable_trie.update_index("noi", 1);

        let pair_matrix = PairMatrix::empty(2);
        Tokenizer::new(codepoints, multiterm_trie, syllable_trie, pair_matrix)
    }

    #[test]
    fn segment_joins_known_multiterm() {
        let tokenizer = fixture_tokenizer();
        let res = tokenizer.segment("Ha Noi", false, TokenizeOption::Normal);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].text, "ha noi");
    }

    #[test]
    fn segment_original_preserves_source_casing() {
        let tokenizer = fixture_tokenizer();
        let res = tokenizer.segment_original("Ha Noi", TokenizeOption::Normal);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].text, "Ha_Noi");
    }

    #[test]
    fn host_mode_splits_on_dots() {
        let tokenizer = fixture_tokenizer();
        let res = tokenizer.segment_original("www.example.com", TokenizeOption::Host);
        assert_eq!(res.len(), 3);
    }
}
