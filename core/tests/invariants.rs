//! End-to-end invariants over the Vietnamese tokenizer pipeline, mirroring
//! the teacher's integration-test placement under `core/tests/`.

use vitok_core::codepoint::CodepointTables;
use vitok_core::dat::{MultitermDat, SyllableDat};
use vitok_core::hash_trie::{MultitermHashTrie, SyllableHashTrie};
use vitok_core::pair_matrix::PairMatrix;
use vitok_core::token::{NUMBER, SKIP_SEG_TYPE, WORD};
use vitok_core::{TokenizeOption, Tokenizer};

fn tokenizer_with(multiterm: &[(&str, i32, bool)]) -> Tokenizer {
    let codepoints = CodepointTables::simple();
    let mut multiterm_trie = MultitermHashTrie::new();
    for &(term, freq, is_special) in multiterm {
        multiterm_trie.add_new_term(&codepoints, term, freq, true, is_special);
    }
    let syllable_trie = SyllableHashTrie::new();

    let nodes = multiterm_trie.dump_structure();
    let alphabet = multiterm_trie.dump_alphabet();
    let multiterm_dat = MultitermDat::build_from_hash_trie(&nodes, &alphabet);

    let syl_nodes = syllable_trie.dump_structure();
    let syl_alphabet = syllable_trie.dump_alphabet();
    let syllable_dat = SyllableDat::build_from_hash_trie(&syl_nodes, &syl_alphabet);

    Tokenizer::new(codepoints, multiterm_dat, syllable_dat, PairMatrix::empty(0))
}

/// Invariant 1: every token's original span stays inside the input's byte length.
#[test]
fn token_spans_stay_within_original_byte_length() {
    let tokenizer = tokenizer_with(&[("ha noi", 100, false)]);
    let text = "ha noi is great";
    let tokens = tokenizer.segment_original(text, TokenizeOption::Normal);
    for t in &tokens {
        assert!(t.token.original_start >= 0);
        assert!((t.token.original_start as usize) <= (t.token.original_end as usize));
        assert!((t.token.original_end as usize) <= text.len());
    }
}

/// Invariant 2: tokens are non-overlapping and strictly increasing in start order.
#[test]
fn tokens_are_non_overlapping_and_ordered() {
    let tokenizer = tokenizer_with(&[("ha noi", 100, false)]);
    let tokens = tokenizer.segment_original("ha noi is great", TokenizeOption::Normal);
    for pair in tokens.windows(2) {
        assert!(pair[0].token.normalized_end <= pair[1].token.normalized_start);
    }
}

/// Invariant 3: a NUMBER token's text is all digits save at most one `.`/`,`, and it's marked SKIP.
#[test]
fn number_tokens_are_digit_runs_marked_skip() {
    let tokenizer = tokenizer_with(&[]);
    let tokens = tokenizer.segment_original("so 99,99 la gia", TokenizeOption::Normal);
    let number = tokens.iter().find(|t| t.token.ty == NUMBER).expect("a NUMBER token");
    assert_eq!(number.token.seg_type, SKIP_SEG_TYPE);
    let non_digit_seps = number.text.chars().filter(|c| !c.is_ascii_digit()).count();
    assert!(non_digit_seps <= 1);
}

/// Invariant 9: a term loaded as `is_special` comes back as one SKIP token.
#[test]
fn special_terms_emerge_as_single_skip_token() {
    let tokenizer = tokenizer_with(&[("c++", i32::MAX, true)]);
    let tokens = tokenizer.segment_original("i love c++", TokenizeOption::Normal);
    let special = tokens.iter().find(|t| t.text == "c++").expect("the special term survives whole");
    assert_eq!(special.token.seg_type, SKIP_SEG_TYPE);
}

/// Concrete scenario: `"1st place"` splits into a SKIP ordinal and a plain WORD.
#[test]
fn ordinal_suffix_is_absorbed_into_one_skip_token() {
    let tokenizer = tokenizer_with(&[("place", 50, false)]);
    let tokens = tokenizer.segment_original("1st place", TokenizeOption::Normal);
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert!(texts.contains(&"1st"));
    let ordinal = tokens.iter().find(|t| t.text == "1st").unwrap();
    assert_eq!(ordinal.token.seg_type, SKIP_SEG_TYPE);
    assert_eq!(ordinal.token.ty, WORD);
}

/// HOST mode: each dot-separated field becomes its own token, original
/// offsets preserved.
#[test]
fn host_mode_emits_one_token_per_dot_field() {
    let tokenizer = tokenizer_with(&[]);
    let tokens = tokenizer.segment_original("a.b.co", TokenizeOption::Host);
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "co"]);
}

/// Invariant 5 (round-trip), restricted to the for_transforming surface: in
/// `for_transforming` mode, gap-filling SPACE/PUNCT tokens mean every
/// original byte from 0 to `text.len()` is covered by exactly one token,
/// with no gaps or overlaps between consecutive spans.
#[test]
fn for_transforming_tokens_tile_the_whole_input() {
    let tokenizer = tokenizer_with(&[("ha noi", 100, false)]);
    let text = "ha noi, que huong!";
    let tokens = tokenizer.segment(text, true, TokenizeOption::Normal);
    assert_eq!(tokens.first().unwrap().token.original_start, 0);
    assert_eq!(tokens.last().unwrap().token.original_end as usize, text.len());
    for pair in tokens.windows(2) {
        assert_eq!(pair[0].token.original_end, pair[1].token.original_start);
    }
}
