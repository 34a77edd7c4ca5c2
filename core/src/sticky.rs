//! Splits sticky (unspaced) alphanumeric runs into syllable-sized pieces
//! using a 2-gram dynamic program over the syllable trie plus pair-bonus
//! matrix. Grounded on `tokenize_pure_sticky_to_syllables` and
//! `tokenize_sticky_to_syllables` in `tokenizer.hpp`.

use crate::codepoint::CodepointTables;
use crate::dat::SyllableDat;
use crate::pair_matrix::PairMatrix;

const MAX_TOKEN_LENGTH: usize = 25;

/// Run the 2-gram split DP over `text` (already known to be one contiguous
/// alphanumeric run) and return split positions relative to `text`'s start,
/// in ascending order.
pub fn tokenize_pure_sticky_to_syllables(syllable_trie: &SyllableDat, pair_matrix: &PairMatrix, text: &[u32]) -> Vec<usize> {
    let length = text.len();
    if length == 0 {
        return Vec::new();
    }

    let cap = |i: usize| MAX_TOKEN_LENGTH.min(i) + 1;
    let mut best_scores: Vec<Vec<f64>> = (0..=length).map(|i| vec![-1.0; cap(i)]).collect();
    let mut trace: Vec<Vec<i32>> = (0..=length).map(|i| vec![-1; cap(i)]).collect();
    let mut syll_node: Vec<Vec<i32>> = (0..=length).map(|i| vec![-1; cap(i)]).collect();
    let mut all_token_lengths: Vec<Vec<usize>> = vec![Vec::new(); length + 1];

    best_scores[0][0] = 0.0;
    all_token_lengths[0].push(0);

    for i in 0..length {
        if !all_token_lengths[i].is_empty() {
            let mut next_node: usize = 0;
            let mut j = i;
            while j < i + MAX_TOKEN_LENGTH && j < length {
                match syllable_trie.has_child(next_node, text[j]) {
                    Some(child) => {
                        next_node = child;
                        syll_node[j + 1][j - i + 1] = next_node as i32;
                    }
                    None => break,
                }
                j += 1;
            }
        }

        let lengths_at_i = all_token_lengths[i].clone();
        for last_token_length in lengths_at_i {
            let last_node = syll_node[i][last_token_length];
            let mut j = i;
            while j < i + MAX_TOKEN_LENGTH && j < length {
                let self_len = j - i + 1;
                let next_node = syll_node[j + 1][self_len];
                if next_node == -1 {
                    break;
                }

                let mut cur_score = syllable_trie.weight(next_node as usize) as f64;
                if last_node != -1 {
                    let last_index = syllable_trie.index(last_node as usize);
                    let next_index = syllable_trie.index(next_node as usize);
                    if last_index != -1 && next_index != -1 {
                        cur_score += pair_matrix.lookup(last_index as usize, next_index as usize) as f64;
                    }
                }

                let total_score = best_scores[i][last_token_length] + cur_score;
                if best_scores[j + 1][self_len] < total_score {
                    best_scores[j + 1][self_len] = total_score;
                    trace[j + 1][self_len] = last_token_length as i32;
                    if all_token_lengths[j + 1].last() != Some(&self_len) {
                        all_token_lengths[j + 1].push(self_len);
                    }
                }
                j += 1;
            }
        }
    }

    let mut last_token_length = 0usize;
    for j in 1..best_scores[length].len() {
        if trace[length][j] >= 0 && best_scores[length][last_token_length] < best_scores[length][j] {
            last_token_length = j;
        }
    }

    let mut space_positions = Vec::new();
    let mut i = length;
    let mut j = last_token_length;
    while i > 0 {
        if trace[i][j] >= 0 {
            let new_i = i - j;
            if new_i > 0 {
                let is_digit_boundary = CodepointTables::is_digit(text[new_i - 1]) && CodepointTables::is_digit(text[new_i]);
                if !is_digit_boundary {
                    space_positions.push(new_i);
                }
            }
            j = trace[i][j] as usize;
            i = new_i;
        } else {
            break;
        }
    }
    space_positions.reverse();
    space_positions
}

/// Splits every maximal alphanumeric run of `text` into syllables, returning
/// absolute split positions across the whole input.
pub fn tokenize_sticky_to_syllables(
    codepoints: &CodepointTables,
    syllable_trie: &SyllableDat,
    pair_matrix: &PairMatrix,
    text: &[u32],
) -> Vec<usize> {
    let mut space_positions = Vec::new();
    let mut push_run = |left: usize, right: usize, space_positions: &mut Vec<usize>| {
        let sub = tokenize_pure_sticky_to_syllables(syllable_trie, pair_matrix, &text[left..right]);
        space_positions.extend(sub.into_iter().map(|p| p + left));
    };

    let mut last_non_alphanumeric: i32 = -1;
    for (i, &c) in text.iter().enumerate() {
        if !codepoints.is_alphanumeric(c) {
            if last_non_alphanumeric + 1 != i as i32 {
                push_run((last_non_alphanumeric + 1) as usize, i, &mut space_positions);
            }
            last_non_alphanumeric = i as i32;
        }
    }
    if last_non_alphanumeric + 1 != text.len() as i32 {
        push_run((last_non_alphanumeric + 1) as usize, text.len(), &mut space_positions);
    }
    space_positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_trie::SyllableHashTrie;

    fn make_syllable_dat(words: &[(&str, i32)]) -> SyllableDat {
        let mut trie = SyllableHashTrie::new();
        for &(w, f) in words {
            trie.add_new_term(w, f);
        }
        let nodes = trie.dump_structure();
        let alphabet = trie.dump_alphabet();
        let mut dat = SyllableDat::build_from_hash_trie(&nodes, &alphabet);
        for (idx, &(w, _)) in words.iter().enumerate() {
            dat.update_index(w, idx as i32);
        }
        dat
    }

    #[test]
    fn splits_sticky_run_into_known_syllables() {
        let dat = make_syllable_dat(&[("hoc", 100), ("sinh", 100)]);
        let pair_matrix = PairMatrix::empty(2);
        let text: Vec<u32> = "hocsinh".chars().map(|c| c as u32).collect();
        let splits = tokenize_pure_sticky_to_syllables(&dat, &pair_matrix, &text);
        assert_eq!(splits, vec![3]);
    }

    #[test]
    fn never_splits_between_two_digits() {
        // Even though "1" and "2" are both individually in the syllable
        // trie, a split boundary between two adjacent digits is forbidden.
        let dat = make_syllable_dat(&[("1", 10), ("2", 10)]);
        let pair_matrix = PairMatrix::empty(2);
        let text: Vec<u32> = "12".chars().map(|c| c as u32).collect();
        let splits = tokenize_pure_sticky_to_syllables(&dat, &pair_matrix, &text);
        assert!(splits.is_empty());
    }

    #[test]
    fn tokenize_sticky_skips_punctuation_runs() {
        let codepoints = CodepointTables::simple();
        let dat = make_syllable_dat(&[("hoc", 100), ("sinh", 100)]);
        let pair_matrix = PairMatrix::empty(2);
        let text: Vec<u32> = "hocsinh.vn".chars().map(|c| c as u32).collect();
        let splits = tokenize_sticky_to_syllables(&codepoints, &dat, &pair_matrix, &text);
        assert!(splits.contains(&3));
    }
}
