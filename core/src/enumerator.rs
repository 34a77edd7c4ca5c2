//! `get_next_token`: walks the multiterm dictionary trie as far as possible
//! from a starting position, falling back to numeric/alphabetic heuristics
//! once the walk runs out of dictionary coverage. Grounded on
//! `Tokenizer::get_next_token` in `tokenizer.hpp`.

use crate::codepoint::CodepointTables;
use crate::dat::MultitermDat;

/// A candidate next-token boundary: `right` is the exclusive end position,
/// `weight` the trie weight to use if this is accepted as a token, `has_more`
/// signals a space-triggered cut with more text still to enumerate from the
/// same start, and `is_special` flags a dictionary-marked special term.
#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub right: i32,
    pub weight: f64,
    pub has_more: bool,
    pub is_special: bool,
}

impl Default for Range {
    fn default() -> Self {
        Range { right: -1, weight: 0.5, has_more: false, is_special: false }
    }
}

impl Range {
    fn at(right: usize, weight: f64, has_more: bool, is_special: bool) -> Self {
        Range { right: right as i32, weight, has_more, is_special }
    }

    fn stop_at(right: usize) -> Self {
        Range { right: right as i32, ..Default::default() }
    }
}

/// Per-start-position walk state, threaded across successive
/// `get_next_token` calls the way `TemporaryTokenData` is reused in the
/// source.
pub struct EnumeratorState {
    pub cur_node: usize,
    pub last_delimiter_pos: i32,
    pub numeric_prefix: bool,
    pub in_dict: bool,
}

impl EnumeratorState {
    pub fn new() -> Self {
        EnumeratorState { cur_node: 0, last_delimiter_pos: -1, numeric_prefix: false, in_dict: true }
    }
}

impl Default for EnumeratorState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get_next_token(
    multiterm_trie: &MultitermDat,
    codepoints: &CodepointTables,
    text: &[u32],
    length: usize,
    from: usize,
    state: &mut EnumeratorState,
) -> Range {
    let mut i = from;
    while i <= length {
        if i != from && !codepoints.is_alphanumeric(text[i - 1]) {
            state.last_delimiter_pos = (i - 1) as i32;
        }

        if state.in_dict && i < length {
            if let Some(child) = multiterm_trie.has_child(state.cur_node, text[i]) {
                if text[i] == ' ' as u32 && i != from {
                    return Range::at(
                        i,
                        multiterm_trie.weight(state.cur_node) as f64,
                        true,
                        multiterm_trie.is_special(state.cur_node),
                    );
                }

                if CodepointTables::is_digit(text[i]) {
                    if i == from {
                        state.numeric_prefix = true;
                    }
                } else {
                    state.numeric_prefix = false;
                }

                state.cur_node = child;
                i += 1;
                continue;
            }
        }

        // Out of dictionary coverage: fall back to heuristics.
        state.in_dict = false;

        if state.numeric_prefix {
            if i == length {
                return Range::at(
                    i,
                    multiterm_trie.weight(state.cur_node) as f64,
                    false,
                    multiterm_trie.is_special(state.cur_node),
                );
            }
            while i < length && CodepointTables::is_digit(text[i]) {
                i += 1;
            }
            // Decimal/thousands separators: "3.1", "99,99".
            while i + 1 < length
                && (text[i] == ',' as u32 || text[i] == '.' as u32)
                && CodepointTables::is_digit(text[i + 1])
            {
                i += 1;
                while i < length && CodepointTables::is_digit(text[i]) {
                    i += 1;
                }
            }

            if i < length && codepoints.is_alphabetic(text[i]) {
                if i != from {
                    return Range::at(i, 0.5, true, false);
                }
                let mut alphabetic_till = i + 1;
                while alphabetic_till < length && codepoints.is_alphanumeric(text[alphabetic_till]) {
                    alphabetic_till += 1;
                }
                let k = (alphabetic_till - i) as i32 - 2;
                return Range::at(alphabetic_till, 0.5 + (k.max(0) as f64) * 0.25, false, false);
            }
            return Range::stop_at(i);
        }

        if i == length || !codepoints.is_alphanumeric(text[i]) {
            if i == from {
                i += 1;
                continue;
            }
            if multiterm_trie.is_ending(state.cur_node) || state.last_delimiter_pos == -1 {
                return Range::at(
                    i,
                    multiterm_trie.weight(state.cur_node) as f64,
                    false,
                    multiterm_trie.is_special(state.cur_node),
                );
            } else {
                return Range::at(
                    state.last_delimiter_pos as usize,
                    multiterm_trie.weight(state.cur_node) as f64,
                    false,
                    multiterm_trie.is_special(state.cur_node),
                );
            }
        } else {
            if i - from > 2
                && multiterm_trie.is_ending(state.cur_node)
                && (i == length || (codepoints.is_alphabetic(text[i - 1]) && !codepoints.is_alphabetic(text[i])))
            {
                return Range::at(
                    i,
                    multiterm_trie.weight(state.cur_node) as f64,
                    false,
                    multiterm_trie.is_special(state.cur_node),
                );
            }

            if state.last_delimiter_pos == -1 {
                while i < length && codepoints.is_alphanumeric(text[i]) {
                    i += 1;
                }
                return Range::stop_at(i);
            } else if text[state.last_delimiter_pos as usize] != ' ' as u32 {
                if multiterm_trie.is_ending(state.cur_node) {
                    return Range::at(
                        i,
                        multiterm_trie.weight(state.cur_node) as f64,
                        false,
                        multiterm_trie.is_special(state.cur_node),
                    );
                }
                while i < length && codepoints.is_alphanumeric(text[i]) {
                    i += 1;
                }
                return Range::stop_at(i);
            } else {
                return Range::default();
            }
        }
    }
    Range::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_trie::MultitermHashTrie;

    fn make_dat(terms: &[(&str, i32)]) -> (MultitermDat, CodepointTables) {
        let codepoints = CodepointTables::simple();
        let mut trie = MultitermHashTrie::new();
        for &(term, freq) in terms {
            trie.add_new_term(&codepoints, term, freq, false, false);
        }
        let nodes = trie.dump_structure();
        let alphabet = trie.dump_alphabet();
        (MultitermDat::build_from_hash_trie(&nodes, &alphabet), codepoints)
    }

    #[test]
    fn walks_to_end_of_dictionary_term() {
        let (dat, codepoints) = make_dat(&[("hanoi", 10)]);
        let text: Vec<u32> = "hanoi".chars().map(|c| c as u32).collect();
        let mut state = EnumeratorState::new();
        let range = get_next_token(&dat, &codepoints, &text, text.len(), 0, &mut state);
        assert_eq!(range.right, 5);
    }

    #[test]
    fn falls_back_to_digit_run_outside_dictionary() {
        let (dat, codepoints) = make_dat(&[("hanoi", 10)]);
        let text: Vec<u32> = "1234".chars().map(|c| c as u32).collect();
        let mut state = EnumeratorState::new();
        let range = get_next_token(&dat, &codepoints, &text, text.len(), 0, &mut state);
        assert_eq!(range.right, 4);
    }

    #[test]
    fn number_letter_run_uses_fixed_heuristic_weight() {
        // Simulates the continuation call made once a numeric prefix has
        // already run out of dictionary coverage and the next character is
        // the start of an alphabetic run at the same boundary.
        let (dat, codepoints) = make_dat(&[]);
        let text: Vec<u32> = "abcd".chars().map(|c| c as u32).collect();
        let mut state = EnumeratorState { cur_node: 0, last_delimiter_pos: -1, numeric_prefix: true, in_dict: false };
        let range = get_next_token(&dat, &codepoints, &text, text.len(), 0, &mut state);
        assert_eq!(range.right, 4);
        assert!((range.weight - 1.0).abs() < 1e-9);
    }
}
