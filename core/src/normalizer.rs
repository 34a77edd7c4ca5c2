//! Lowercases input text and merges NFD-style combining tone/hat marks into
//! the preceding vowel, producing the codepoint stream the rest of the
//! pipeline operates on plus a map back to original byte offsets. Grounded
//! on `normalize_for_tokenization` (the UTF-8 overload) in `tokenizer.hpp`.

use crate::codepoint::CodepointTables;

/// Normalize `text`, returning the merged/lowercased codepoints and, for
/// each codepoint plus one trailing sentinel, the original byte offset it
/// started at (so post-processing can map normalized spans back to the
/// caller's original string).
pub fn normalize(codepoints: &CodepointTables, text: &str) -> (Vec<u32>, Vec<i32>) {
    let mut out = Vec::with_capacity(text.len());
    let mut original_pos = Vec::with_capacity(text.len() + 1);

    for (byte_pos, ch) in text.char_indices() {
        let cur = codepoints.lower(ch as u32);
        if let Some(&prev) = out.last() {
            if let Some(merged) = codepoints.merge_tone_hat(prev, cur) {
                *out.last_mut().unwrap() = merged;
                continue;
            }
        }
        original_pos.push(byte_pos as i32);
        out.push(cur);
    }
    original_pos.push(text.len() as i32);

    (out, original_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_combining_tone_mark() {
        let codepoints = CodepointTables::simple();
        let (out, _) = normalize(&codepoints, "a\u{0301}");
        assert_eq!(out, vec!['á' as u32]);
    }

    #[test]
    fn lowercases_ascii_and_vietnamese() {
        let codepoints = CodepointTables::simple();
        let (out, _) = normalize(&codepoints, "HÀ NỘI");
        let s: String = out.iter().filter_map(|&c| char::from_u32(c)).collect();
        assert_eq!(s, "hà nội");
    }

    #[test]
    fn original_pos_tracks_merged_spans() {
        let codepoints = CodepointTables::simple();
        let (out, pos) = normalize(&codepoints, "an");
        assert_eq!(out.len(), 2);
        assert_eq!(pos, vec![0, 1, 2]);
    }

    #[test]
    fn original_pos_collapses_across_a_merge() {
        let codepoints = CodepointTables::simple();
        // 'a' (1 byte) + combining acute (2 bytes) merges into one codepoint;
        // original_pos should record only the start of 'a' and the end.
        let (out, pos) = normalize(&codepoints, "a\u{0301}b");
        assert_eq!(out.len(), 2);
        assert_eq!(pos, vec![0, 3, 4]);
    }
}
