//! Build-time tries keyed by codepoint. Two flavors share the same child-map
//! and frequency bookkeeping, grounded on `auxiliary/trie/hash_trie*.hpp`:
//! a multi-term dictionary trie (leaves carry a weight, space-count and
//! specialness) and a syllable trie (leaves carry a weight and syllable
//! length).

use std::collections::{BTreeSet, HashMap};

/// Weight parameters for multi-term nodes: `w = log2(freq+3)^p[2s] * (s+1)^p[2s+1]`.
/// Only indices `0..=7` (space_count 0..=3) are ever exercised safely by the
/// original table; a 5th bucket (`space_count == 4`) would read a 10th,
/// out-of-bounds entry in the source. We clamp `space_count` to 3 for this
/// formula so the lookup never runs past the table.
const MULTITERM_WEIGHT_PARAM: [f64; 9] = [0.38, 1.0, 0.14, 2.59, 1.42, 4.42, 1.45, 0.23, 0.1];

struct MultitermBuildNode {
    frequency: i32,
    children: HashMap<u32, usize>,
    space_count: i32,
    is_special: bool,
}

impl MultitermBuildNode {
    fn new() -> Self {
        MultitermBuildNode { frequency: -1, children: HashMap::new(), space_count: 0, is_special: false }
    }

    fn mark_ending(&mut self, frequency: i32) {
        self.frequency = if self.frequency != -1 {
            self.frequency.saturating_add(frequency)
        } else {
            frequency
        };
    }
}

pub struct MultitermHashNode {
    pub frequency: i32,
    pub children: HashMap<u32, usize>,
    pub weight: f32,
    pub space_count: i32,
    pub is_special: bool,
}

pub struct MultitermHashTrie {
    pool: Vec<MultitermBuildNode>,
    alphabet: BTreeSet<u32>,
}

impl MultitermHashTrie {
    pub fn new() -> Self {
        MultitermHashTrie { pool: vec![MultitermBuildNode::new()], alphabet: BTreeSet::new() }
    }

    fn walk_to(&mut self, s: &str) -> usize {
        let mut cur = 0usize;
        for c in s.chars() {
            let cp = c as u32;
            let pool = &mut self.pool;
            let next = *pool[cur].children.entry(cp).or_insert_with(|| {
                pool.push(MultitermBuildNode::new());
                pool.len() - 1
            });
            self.alphabet.insert(cp);
            cur = next;
        }
        cur
    }

    /// Insert `s` with accumulated `frequency`. When `add_transformation` is
    /// set, the spelling-variant form of `s` (from the `d_and_gi`/`i_and_y`
    /// map) is inserted too, at the same frequency, without recursing
    /// further (mirrors `MultitermHashTrie::add_new_term` in the source).
    pub fn add_new_term(
        &mut self,
        codepoints: &crate::codepoint::CodepointTables,
        s: &str,
        frequency: i32,
        add_transformation: bool,
        is_special: bool,
    ) {
        let end = self.walk_to(s);
        self.pool[end].mark_ending(frequency);
        self.pool[end].space_count = s.chars().filter(|&c| c == ' ').count() as i32;
        self.pool[end].is_special = is_special;
        if add_transformation {
            let transformed = codepoints.get_transformation_string(s);
            if transformed != s {
                let end2 = self.walk_to(&transformed);
                self.pool[end2].mark_ending(frequency);
                self.pool[end2].space_count = transformed.chars().filter(|&c| c == ' ').count() as i32;
            }
        }
    }

    /// Finalize weights (must run once, after all terms are inserted) and
    /// return the node list in insertion order for DAT construction.
    pub fn dump_structure(&self) -> Vec<MultitermHashNode> {
        self.pool
            .iter()
            .map(|node| {
                let weight = if node.frequency != -1 {
                    let s = node.space_count.clamp(0, 3) as usize;
                    let freq_power = MULTITERM_WEIGHT_PARAM[2 * s];
                    let len_power = MULTITERM_WEIGHT_PARAM[2 * s + 1];
                    (((node.frequency as f64) + 3.0).log2().powf(freq_power)
                        * ((node.space_count as f64) + 1.0).powf(len_power)) as f32
                } else {
                    0.5
                };
                MultitermHashNode {
                    frequency: node.frequency,
                    children: node.children.clone(),
                    weight,
                    space_count: node.space_count,
                    is_special: node.is_special,
                }
            })
            .collect()
    }

    pub fn dump_alphabet(&self) -> BTreeSet<u32> {
        self.alphabet.clone()
    }
}

impl Default for MultitermHashTrie {
    fn default() -> Self {
        Self::new()
    }
}

/// Weight parameters for syllable self-weight: `w = coeff * length^len_power * freq^freq_power`.
const SYLLABLE_SELF_COEFF: f64 = 8.68047;
const SYLLABLE_SELF_LEN_POWER: f64 = 1.49414;
const SYLLABLE_SELF_FREQ_POWER: f64 = 0.02;

struct SyllableBuildNode {
    frequency: i32,
    children: HashMap<u32, usize>,
    length: i32,
}

impl SyllableBuildNode {
    fn new() -> Self {
        SyllableBuildNode { frequency: -1, children: HashMap::new(), length: 0 }
    }

    fn mark_ending(&mut self, frequency: i32) {
        self.frequency = if self.frequency != -1 {
            self.frequency.saturating_add(frequency)
        } else {
            frequency
        };
    }
}

pub struct SyllableHashNode {
    pub frequency: i32,
    pub children: HashMap<u32, usize>,
    pub weight: f32,
    pub length: i32,
}

pub struct SyllableHashTrie {
    pool: Vec<SyllableBuildNode>,
    alphabet: BTreeSet<u32>,
}

impl SyllableHashTrie {
    pub fn new() -> Self {
        SyllableHashTrie { pool: vec![SyllableBuildNode::new()], alphabet: BTreeSet::new() }
    }

    pub fn add_new_term(&mut self, s: &str, frequency: i32) {
        let mut cur = 0usize;
        for c in s.chars() {
            let cp = c as u32;
            let pool = &mut self.pool;
            let next = *pool[cur].children.entry(cp).or_insert_with(|| {
                pool.push(SyllableBuildNode::new());
                pool.len() - 1
            });
            self.alphabet.insert(cp);
            cur = next;
        }
        self.pool[cur].mark_ending(frequency);
        self.pool[cur].length = s.chars().count() as i32;
    }

    pub fn dump_structure(&self) -> Vec<SyllableHashNode> {
        self.pool
            .iter()
            .map(|node| {
                let weight = if node.frequency != -1 {
                    (SYLLABLE_SELF_COEFF
                        * (node.length as f64).powf(SYLLABLE_SELF_LEN_POWER)
                        * (node.frequency as f64).powf(SYLLABLE_SELF_FREQ_POWER)) as f32
                } else {
                    0.5
                };
                SyllableHashNode {
                    frequency: node.frequency,
                    children: node.children.clone(),
                    weight,
                    length: node.length,
                }
            })
            .collect()
    }

    pub fn dump_alphabet(&self) -> BTreeSet<u32> {
        self.alphabet.clone()
    }
}

impl Default for SyllableHashTrie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_frequency_caps_at_max() {
        let mut trie = SyllableHashTrie::new();
        trie.add_new_term("hoc", i32::MAX - 1);
        trie.add_new_term("hoc", 10);
        let nodes = trie.dump_structure();
        let end = nodes.iter().find(|n| n.frequency != -1).unwrap();
        assert_eq!(end.frequency, i32::MAX);
    }

    #[test]
    fn syllable_length_counts_codepoints() {
        let mut trie = SyllableHashTrie::new();
        trie.add_new_term("sinh", 5);
        let nodes = trie.dump_structure();
        let end = nodes.iter().find(|n| n.frequency != -1).unwrap();
        assert_eq!(end.length, 4);
    }

    #[test]
    fn multiterm_space_count_tracked() {
        let mut trie = MultitermHashTrie::new();
        let codepoints = crate::codepoint::CodepointTables::simple();
        trie.add_new_term(&codepoints, "x y z", 5, false, false);
        let nodes = trie.dump_structure();
        let end = nodes.iter().find(|n| n.frequency != -1).unwrap();
        assert_eq!(end.space_count, 2);
    }
}
