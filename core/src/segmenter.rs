//! Max-weight-cover segmentation over normalized codepoints, plus the
//! traceback-order post-processing (percent/ordinal absorption, operator-form
//! merges, URL/domain tagging and sticky sub-splitting). Grounded on
//! `Tokenizer::run_tokenize` in `tokenizer.hpp`.

use crate::codepoint::CodepointTables;
use crate::dat::{MultitermDat, SyllableDat};
use crate::enumerator::{get_next_token, EnumeratorState};
use crate::pair_matrix::PairMatrix;
use crate::sticky::tokenize_pure_sticky_to_syllables;
use crate::token::{
    self, is_domain_end, is_domain_field, is_ordinal_suffix, is_small_number_or_az_char, is_special_operator_sign,
    maximize, Token, NUMBER, SKIP_SEG_TYPE, URL_SEG_TYPE, WORD,
};

/// Everything the segmenter needs to look up: the two dictionary tries and
/// the pair-bonus matrix used by the sticky sub-splitter.
pub struct SegmenterDicts<'a> {
    pub codepoints: &'a CodepointTables,
    pub multiterm_trie: &'a MultitermDat,
    pub syllable_trie: &'a SyllableDat,
    pub pair_matrix: &'a PairMatrix,
}

/// Run the dictionary-weighted max-cover DP over `text` and return the
/// resulting tokens (left-to-right unless `for_transforming`, which reorders
/// anyway) plus sticky-split space positions.
pub fn run_tokenize(
    dicts: &SegmenterDicts,
    text: &mut [u32],
    for_transforming: bool,
    tokenize_sticky: bool,
    dont_push_puncts: bool,
) -> (Vec<Token>, Vec<i32>) {
    let length = text.len();
    let mut best_scores = vec![0.0f64; length + 1];
    let mut trace = vec![-1i32; length + 1];
    let mut is_special = vec![false; length + 1];

    let mut last_score = 0.0f64;
    let mut should_go = true;
    for i in 0..length {
        if trace[i] != -1 {
            last_score = best_scores[i];
            should_go = true;
        }
        if dicts.codepoints.is_alphanumeric(text[i]) {
            if !should_go {
                continue;
            }
            should_go = false;
            let mut state = EnumeratorState::new();
            let mut token = get_next_token(dicts.multiterm_trie, dicts.codepoints, text, length, i, &mut state);
            while token.right != -1 {
                let right = token.right as usize;
                if maximize(&mut best_scores[right], last_score + token.weight) {
                    trace[right] = i as i32;
                    is_special[right] = token.is_special;
                }
                if token.has_more {
                    token = get_next_token(dicts.multiterm_trie, dicts.codepoints, text, length, right, &mut state);
                } else {
                    break;
                }
            }
        }
    }

    let mut ranges: Vec<Token> = Vec::with_capacity(length / 2 + 1);
    let mut space_positions: Vec<i32> = Vec::new();
    let mut next_is_domain = false;

    let mut i = length;
    while i > 0 {
        if trace[i] == -1 {
            i -= 1;
            continue;
        }
        let start = trace[i] as usize;
        ranges.push(Token::new(start as i32, i as i32));
        ranges.last_mut().unwrap().ty = Token::get_type(dicts.codepoints, text, start, i);

        if !tokenize_sticky {
            i = start;
            continue;
        }

        if is_special[i] {
            ranges.last_mut().unwrap().seg_type = SKIP_SEG_TYPE;
        } else {
            absorb_percent_and_ordinal(text, &mut ranges, length);
            absorb_operator_form(text, &mut ranges);
        }
        if ranges.last().unwrap().ty == NUMBER {
            ranges.last_mut().unwrap().seg_type = SKIP_SEG_TYPE;
        }

        next_is_domain = if next_is_domain {
            handle_domain_continuation(text, &mut ranges)
        } else {
            maybe_start_domain(text, &mut ranges)
        };

        splice_url_sticky(dicts, text, &mut ranges, &mut space_positions);

        i = start;
    }

    if for_transforming {
        rebuild_for_transforming(text, length, &mut ranges, dont_push_puncts);
    } else {
        ranges.reverse();
    }
    if tokenize_sticky {
        space_positions.reverse();
    }

    (ranges, space_positions)
}

fn absorb_percent_and_ordinal(text: &[u32], ranges: &mut Vec<Token>, length: usize) {
    let n = ranges.len();
    if ranges[n - 1].ty != NUMBER {
        return;
    }
    let back_end = ranges[n - 1].normalized_end as usize;
    if back_end < length && text[back_end] == '%' as u32 {
        let r = &mut ranges[n - 1];
        r.normalized_end += 1;
        r.ty = WORD;
        r.seg_type = SKIP_SEG_TYPE;
    } else if n > 1 {
        let second_last = ranges[n - 2];
        if second_last.normalized_start == ranges[n - 1].normalized_end
            && second_last.normalized_end - second_last.normalized_start == 2
            && is_ordinal_suffix(
                text[second_last.normalized_start as usize],
                text[second_last.normalized_start as usize + 1],
            )
        {
            ranges[n - 1].normalized_end += 2;
            ranges[n - 1].ty = WORD;
            ranges[n - 1].seg_type = SKIP_SEG_TYPE;
            ranges.swap(n - 1, n - 2);
            ranges.pop();
        }
    }
}

fn absorb_operator_form(text: &[u32], ranges: &mut Vec<Token>) {
    let n = ranges.len();
    if n <= 1 {
        return;
    }
    let back_end = ranges[n - 1].normalized_end as usize;
    let second_last = ranges[n - 2];
    if is_special_operator_sign(text[back_end])
        && ranges[n - 1].normalized_end + 1 == second_last.normalized_start
        && is_small_number_or_az_char(text, &ranges[n - 1])
        && is_small_number_or_az_char(text, &second_last)
    {
        ranges[n - 1].normalized_end = second_last.normalized_end;
        ranges[n - 1].ty = WORD;
        ranges[n - 1].seg_type = SKIP_SEG_TYPE;
        ranges.swap(n - 1, n - 2);
        ranges.pop();
    }
}

/// Returns the updated `next_is_domain` flag. Grounded on the `if
/// (next_is_domain) { ... }` branch of `run_tokenize`.
fn handle_domain_continuation(text: &[u32], ranges: &mut Vec<Token>) -> bool {
    let n = ranges.len();
    let left = ranges[n - 1].normalized_start as usize;
    let right = ranges[n - 1].normalized_end as usize;
    if is_domain_field(text, left, right) {
        ranges[n - 1].seg_type = token::END_URL_TYPE;
        return true;
    }

    ranges[n - 1].seg_type = URL_SEG_TYPE;
    let last_space_pos = token::find_last_space_pos(text, &ranges[n - 1]);
    if last_space_pos == -1 {
        ranges[n - 1].normalized_start > 0 && text[ranges[n - 1].normalized_start as usize - 1] == '.' as u32
    } else {
        let save_start = ranges[n - 1].normalized_start;
        ranges[n - 1].normalized_start = last_space_pos + 1;
        ranges.push(Token::new(save_start, last_space_pos));
        false
    }
}

/// Grounded on the `else` branch of the same `if (next_is_domain)` block.
fn maybe_start_domain(text: &[u32], ranges: &mut [Token]) -> bool {
    let n = ranges.len();
    let left = ranges[n - 1].normalized_start as usize;
    let right = ranges[n - 1].normalized_end as usize;
    if !is_domain_end(text, left, right) {
        return false;
    }
    if is_domain_field(text, left, right) {
        let mut till: i64 = n as i64 - 2;
        while till >= 0
            && ranges[till as usize].normalized_start == ranges[(till + 1) as usize].normalized_end + 1
            && text[ranges[till as usize].normalized_start as usize - 1] == '.' as u32
        {
            till -= 1;
        }
        till += 1;
        ranges[till as usize].seg_type = SKIP_SEG_TYPE;
        till += 1;
        while (till as usize) < n {
            ranges[till as usize].seg_type = token::END_URL_TYPE;
            till += 1;
        }
    } else {
        ranges[n - 1].seg_type = SKIP_SEG_TYPE;
    }
    true
}

fn splice_url_sticky(dicts: &SegmenterDicts, text: &[u32], ranges: &mut Vec<Token>, space_positions: &mut Vec<i32>) {
    let last_token = *ranges.last().unwrap();
    if last_token.seg_type != URL_SEG_TYPE || dicts.pair_matrix.is_empty() {
        return;
    }

    let left = last_token.normalized_start as usize;
    let right = last_token.normalized_end as usize;
    let sub_space_positions = tokenize_pure_sticky_to_syllables(dicts.syllable_trie, dicts.pair_matrix, &text[left..right]);
    if sub_space_positions.is_empty() {
        return;
    }

    let mut subtext: Vec<u32> = Vec::with_capacity(right - left + sub_space_positions.len());
    let mut it = 0usize;
    for pos in 0..(right - left) {
        if it < sub_space_positions.len() && pos == sub_space_positions[it] {
            subtext.push(' ' as u32);
            it += 1;
        }
        subtext.push(text[left + pos]);
    }

    let (subranges, _) = run_tokenize(dicts, &mut subtext, false, false, false);

    ranges.pop();

    let mut it: i64 = sub_space_positions.len() as i64 - 1;
    for range_id in (0..subranges.len()).rev() {
        let mut r = subranges[range_id];
        r.seg_type = last_token.seg_type;
        while it >= 0 && sub_space_positions[it as usize] as i64 + it >= r.normalized_end as i64 {
            it -= 1;
        }
        r.normalized_end += last_token.normalized_start;
        r.normalized_end -= (it + 1) as i32;
        while it >= 0 && sub_space_positions[it as usize] as i64 + it > r.normalized_start as i64 {
            space_positions.push(sub_space_positions[it as usize] as i32 + last_token.normalized_start);
            it -= 1;
        }
        r.normalized_start += last_token.normalized_start;
        r.normalized_start -= (it + 1) as i32;
        ranges.push(r);
    }
}

/// Reorders the traceback-order (right-to-left) `ranges` into left-to-right
/// order, injecting SPACE/PUNCT tokens for every gap, with the
/// space-to-underscore / underscore-to-tilde text convention applied in
/// place to `text`.
fn rebuild_for_transforming(text: &mut [u32], length: usize, ranges: &mut Vec<Token>, dont_push_puncts: bool) {
    let mut temp = Vec::new();
    std::mem::swap(&mut temp, ranges);

    let mut last_pos = 0usize;
    let mut inside_url = false;
    while let Some(back) = temp.pop() {
        let skip_puncts = inside_url
            && (back.is_url_related()
                || (back.seg_type == SKIP_SEG_TYPE && text[back.normalized_start as usize - 1] == '.' as u32));
        if !dont_push_puncts && !skip_puncts {
            while last_pos < back.normalized_start as usize {
                let mut gap = Token::new(last_pos as i32, last_pos as i32 + 1);
                gap.ty = if text[last_pos] == ' ' as u32 { token::SPACE } else { token::PUNCT };
                ranges.push(gap);
                last_pos += 1;
            }
        }
        ranges.push(back);
        for c in text.iter_mut().take(back.normalized_end as usize).skip(back.normalized_start as usize) {
            if *c == '_' as u32 {
                *c = '~' as u32;
            }
            if *c == ' ' as u32 {
                *c = '_' as u32;
            }
        }
        last_pos = back.normalized_end as usize;
        inside_url = back.is_url_related();
    }
    if !dont_push_puncts {
        while last_pos < length {
            let mut gap = Token::new(last_pos as i32, last_pos as i32 + 1);
            gap.ty = if text[last_pos] == ' ' as u32 { token::SPACE } else { token::PUNCT };
            ranges.push(gap);
            last_pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_trie::{MultitermHashTrie, SyllableHashTrie};

    fn dicts_fixture() -> (CodepointTables, MultitermDat, SyllableDat, PairMatrix) {
        let codepoints = CodepointTables::simple();
        let mut mtrie = MultitermHashTrie::new();
        mtrie.add_new_term(&codepoints, "ha noi", 100, false, false);
        mtrie.add_new_term(&codepoints, "viet nam", 80, false, false);
        let nodes = mtrie.dump_structure();
        let alphabet = mtrie.dump_alphabet();
        let multiterm_trie = MultitermDat::build_from_hash_trie(&nodes, &alphabet);

        let strie = SyllableHashTrie::new();
        let nodes = strie.dump_structure();
        let alphabet = strie.dump_alphabet();
        let syllable_trie = SyllableDat::build_from_hash_trie(&nodes, &alphabet);

        let pair_matrix = PairMatrix::empty(0);
        (codepoints, multiterm_trie, syllable_trie, pair_matrix)
    }

    #[test]
    fn segments_known_multiterm_as_one_token() {
        let (codepoints, multiterm_trie, syllable_trie, pair_matrix) = dicts_fixture();
        let dicts = SegmenterDicts { codepoints: &codepoints, multiterm_trie: &multiterm_trie, syllable_trie: &syllable_trie, pair_matrix: &pair_matrix };
        let mut text: Vec<u32> = "ha noi".chars().map(|c| c as u32).collect();
        let (ranges, _) = run_tokenize(&dicts, &mut text, false, true, false);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].normalized_start, 0);
        assert_eq!(ranges[0].normalized_end, 6);
    }

    #[test]
    fn percent_sign_is_absorbed_into_number_token() {
        let (codepoints, multiterm_trie, syllable_trie, pair_matrix) = dicts_fixture();
        let dicts = SegmenterDicts { codepoints: &codepoints, multiterm_trie: &multiterm_trie, syllable_trie: &syllable_trie, pair_matrix: &pair_matrix };
        let mut text: Vec<u32> = "50%".chars().map(|c| c as u32).collect();
        let (ranges, _) = run_tokenize(&dicts, &mut text, false, true, false);
        let number_token = ranges.iter().find(|t| t.normalized_start == 0).unwrap();
        assert_eq!(number_token.normalized_end, 3);
        assert_eq!(number_token.ty, WORD);
    }
}
