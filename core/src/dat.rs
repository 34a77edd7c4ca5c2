//! Double-array tries (DAT): compact immutable tries built from a hash trie,
//! offering O(1) child lookup via `base[u] + char_map[c]` with a parent
//! check. Grounded on `auxiliary/trie/da_trie.hpp` (slot-packing
//! construction + binary (de)serialization) and the two payload flavors in
//! `multiterm_da_trie_node.hpp` / `syllable_da_trie_node.hpp`.

use std::collections::{BTreeSet, HashMap};
use std::io::{self, Read, Write};

use crate::hash_trie::{MultitermHashNode, SyllableHashNode};

/// Packs the children of every hash-trie node into contiguous DAT slots.
/// `masks[i]` is the set of mapped alphabet slots used by node `i`'s
/// children (empty for leaves). Returns, for each node, the base position
/// assigned to its children block.
fn construct(alphabet_size: usize, masks: &[Vec<i32>]) -> Vec<i32> {
    // pos[i] = positions currently free at offset i (i.e. slot i is unused there)
    let mut pos: Vec<BTreeSet<i32>> = vec![BTreeSet::new(); alphabet_size];
    for p in pos.iter_mut() {
        p.insert(1);
    }
    let mut state: Vec<bool> = vec![false; alphabet_size + 2];
    let mut cur_end: i32 = 2;
    let mut res = vec![0i32; masks.len()];

    for (i, mask) in masks.iter().enumerate() {
        if mask.is_empty() {
            continue;
        }
        let mut sorted_mask = mask.clone();
        sorted_mask.sort_by_key(|&x| pos[x as usize].len());

        let mut found_pos = -1i32;
        for &p in pos[sorted_mask[0] as usize].iter() {
            if sorted_mask[1..].iter().all(|&off| pos[off as usize].contains(&p)) {
                found_pos = p;
                break;
            }
        }
        if found_pos == -1 {
            found_pos = cur_end;
        }
        res[i] = found_pos;

        let affected_end = found_pos + mask.iter().copied().max().unwrap();
        if cur_end <= affected_end {
            let off_bit_positions: Vec<i32> = (0..alphabet_size as i32)
                .rev()
                .filter(|&off| !state[(cur_end + off) as usize])
                .collect();
            let mut off_bit_positions = off_bit_positions;
            while cur_end <= affected_end {
                while let Some(&last) = off_bit_positions.last() {
                    if last < cur_end {
                        off_bit_positions.pop();
                    } else {
                        break;
                    }
                }
                for &off in &off_bit_positions {
                    pos[off as usize].insert(cur_end);
                }
                cur_end += 1;
                state.push(false);
            }
        }

        for &offset in mask {
            let cur_pos = found_pos + offset;
            let mut affected_pos = cur_pos;
            while affected_pos > cur_pos - alphabet_size as i32 && affected_pos >= 0 {
                pos[(cur_pos - affected_pos) as usize].remove(&affected_pos);
                affected_pos -= 1;
            }
            state[cur_pos as usize] = true;
        }
    }

    res
}

fn build_char_map(alphabet: &BTreeSet<u32>) -> Vec<i32> {
    let max_cp = *alphabet.iter().next_back().unwrap_or(&0);
    let mut char_map = vec![-1i32; max_cp as usize + 1];
    for (idx, &cp) in alphabet.iter().enumerate() {
        char_map[cp as usize] = idx as i32;
    }
    char_map
}

fn write_header(w: &mut impl Write, alphabet_size: usize, char_map: &[i32], pool_len: usize) -> io::Result<()> {
    w.write_all(&(alphabet_size as i32).to_le_bytes())?;
    for (cp, &slot) in char_map.iter().enumerate() {
        if slot != -1 {
            w.write_all(&(cp as u32).to_le_bytes())?;
        }
    }
    w.write_all(&(pool_len as u64).to_le_bytes())?;
    Ok(())
}

fn read_header(r: &mut impl Read) -> io::Result<(usize, Vec<i32>, u64)> {
    let mut buf4 = [0u8; 4];
    r.read_exact(&mut buf4)?;
    let alphabet_size = i32::from_le_bytes(buf4) as usize;
    let mut codepoints = Vec::with_capacity(alphabet_size);
    for _ in 0..alphabet_size {
        r.read_exact(&mut buf4)?;
        codepoints.push(u32::from_le_bytes(buf4));
    }
    let max_cp = codepoints.iter().copied().max().unwrap_or(0);
    let mut char_map = vec![-1i32; max_cp as usize + 1];
    for (idx, &cp) in codepoints.iter().enumerate() {
        char_map[cp as usize] = idx as i32;
    }
    let mut buf8 = [0u8; 8];
    r.read_exact(&mut buf8)?;
    let pool_len = u64::from_le_bytes(buf8);
    Ok((alphabet_size, char_map, pool_len))
}

#[derive(Clone)]
struct MultitermSlot {
    base: i32,
    parent: i32,
    weight: f32,
    is_ending: bool,
    is_special: bool,
}

impl MultitermSlot {
    fn empty() -> Self {
        MultitermSlot { base: 0, parent: -1, weight: 0.0, is_ending: false, is_special: false }
    }
}

pub struct MultitermDat {
    pool: Vec<MultitermSlot>,
    char_map: Vec<i32>,
    alphabet_size: usize,
}

impl MultitermDat {
    pub fn build_from_hash_trie(nodes: &[MultitermHashNode], alphabet: &BTreeSet<u32>) -> Self {
        let char_map = build_char_map(alphabet);
        let alphabet_size = alphabet.len();
        let masks: Vec<Vec<i32>> = nodes
            .iter()
            .map(|n| n.children.keys().map(|&c| char_map[c as usize]).collect())
            .collect();
        let positions = construct(alphabet_size, &masks);
        let last_position = *positions.iter().max().unwrap_or(&0);
        let mut pool = vec![MultitermSlot::empty(); last_position as usize + alphabet_size];

        pool[0].base = 1;
        pool[0].weight = nodes[0].weight;
        pool[0].is_ending = nodes[0].frequency != -1;
        pool[0].is_special = nodes[0].is_special;

        let mut mapping = vec![0usize; nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            for (&c, &child_id) in node.children.iter() {
                let index = pool[mapping[i]].base + char_map[c as usize];
                mapping[child_id] = index as usize;
                let child = &nodes[child_id];
                pool[index as usize] = MultitermSlot {
                    base: positions[child_id],
                    parent: mapping[i] as i32,
                    weight: child.weight,
                    is_ending: child.frequency != -1,
                    is_special: child.is_special,
                };
            }
        }

        MultitermDat { pool, char_map, alphabet_size }
    }

    #[inline]
    pub fn get_child(&self, u: usize, c: u32) -> usize {
        (self.pool[u].base + self.char_map[c as usize]) as usize
    }

    #[inline]
    pub fn has_child(&self, u: usize, c: u32) -> Option<usize> {
        if (c as usize) >= self.char_map.len() || self.char_map[c as usize] == -1 {
            return None;
        }
        let child = self.get_child(u, c);
        if self.pool[child].parent == u as i32 {
            Some(child)
        } else {
            None
        }
    }

    #[inline]
    pub fn weight(&self, u: usize) -> f32 {
        self.pool[u].weight
    }

    #[inline]
    pub fn is_ending(&self, u: usize) -> bool {
        self.pool[u].is_ending
    }

    #[inline]
    pub fn is_special(&self, u: usize) -> bool {
        self.pool[u].is_special
    }

    pub fn write(&self, w: &mut impl Write) -> io::Result<()> {
        write_header(w, self.alphabet_size, &self.char_map, self.pool.len())?;
        for slot in &self.pool {
            w.write_all(&slot.base.to_le_bytes())?;
            w.write_all(&slot.parent.to_le_bytes())?;
            w.write_all(&slot.weight.to_le_bytes())?;
            w.write_all(&[slot.is_ending as u8, slot.is_special as u8])?;
        }
        Ok(())
    }

    pub fn read(r: &mut impl Read) -> io::Result<Self> {
        let (alphabet_size, char_map, pool_len) = read_header(r)?;
        let mut pool = Vec::with_capacity(pool_len as usize);
        let mut buf4 = [0u8; 4];
        let mut buf2 = [0u8; 2];
        for _ in 0..pool_len {
            r.read_exact(&mut buf4)?;
            let base = i32::from_le_bytes(buf4);
            r.read_exact(&mut buf4)?;
            let parent = i32::from_le_bytes(buf4);
            r.read_exact(&mut buf4)?;
            let weight = f32::from_le_bytes(buf4);
            r.read_exact(&mut buf2)?;
            pool.push(MultitermSlot {
                base,
                parent,
                weight,
                is_ending: buf2[0] != 0,
                is_special: buf2[1] != 0,
            });
        }
        Ok(MultitermDat { pool, char_map, alphabet_size })
    }
}

#[derive(Clone)]
struct SyllableSlot {
    base: i32,
    parent: i32,
    weight: f32,
    index: i32,
}

impl SyllableSlot {
    fn empty() -> Self {
        SyllableSlot { base: 0, parent: -1, weight: 0.0, index: -1 }
    }
}

pub struct SyllableDat {
    pool: Vec<SyllableSlot>,
    char_map: Vec<i32>,
    alphabet_size: usize,
}

impl SyllableDat {
    pub fn build_from_hash_trie(nodes: &[SyllableHashNode], alphabet: &BTreeSet<u32>) -> Self {
        let char_map = build_char_map(alphabet);
        let alphabet_size = alphabet.len();
        let masks: Vec<Vec<i32>> = nodes
            .iter()
            .map(|n| n.children.keys().map(|&c| char_map[c as usize]).collect())
            .collect();
        let positions = construct(alphabet_size, &masks);
        let last_position = *positions.iter().max().unwrap_or(&0);
        let mut pool = vec![SyllableSlot::empty(); last_position as usize + alphabet_size];

        pool[0].base = 1;
        pool[0].weight = nodes[0].weight;

        let mut mapping = vec![0usize; nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            for (&c, &child_id) in node.children.iter() {
                let index = pool[mapping[i]].base + char_map[c as usize];
                mapping[child_id] = index as usize;
                let child = &nodes[child_id];
                pool[index as usize] = SyllableSlot {
                    base: positions[child_id],
                    parent: mapping[i] as i32,
                    weight: child.weight,
                    index: -1,
                };
            }
        }

        SyllableDat { pool, char_map, alphabet_size }
    }

    /// Walk `s` from the root and assign `index` to its terminal node.
    /// Returns the codepoint-length of `s` on success, 0 if `s` is absent.
    pub fn update_index(&mut self, s: &str, index: i32) -> usize {
        let mut cur = 0usize;
        let mut length = 0usize;
        for c in s.chars() {
            match self.has_child(cur, c as u32) {
                Some(child) => {
                    cur = child;
                    length += 1;
                }
                None => return 0,
            }
        }
        self.pool[cur].index = index;
        length
    }

    #[inline]
    pub fn get_child(&self, u: usize, c: u32) -> usize {
        (self.pool[u].base + self.char_map[c as usize]) as usize
    }

    #[inline]
    pub fn has_child(&self, u: usize, c: u32) -> Option<usize> {
        if (c as usize) >= self.char_map.len() || self.char_map[c as usize] == -1 {
            return None;
        }
        let child = self.get_child(u, c);
        if self.pool[child].parent == u as i32 {
            Some(child)
        } else {
            None
        }
    }

    #[inline]
    pub fn weight(&self, u: usize) -> f32 {
        self.pool[u].weight
    }

    #[inline]
    pub fn index(&self, u: usize) -> i32 {
        self.pool[u].index
    }

    pub fn write(&self, w: &mut impl Write) -> io::Result<()> {
        write_header(w, self.alphabet_size, &self.char_map, self.pool.len())?;
        for slot in &self.pool {
            w.write_all(&slot.base.to_le_bytes())?;
            w.write_all(&slot.parent.to_le_bytes())?;
            w.write_all(&slot.weight.to_le_bytes())?;
            w.write_all(&slot.index.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn read(r: &mut impl Read) -> io::Result<Self> {
        let (alphabet_size, char_map, pool_len) = read_header(r)?;
        let mut pool = Vec::with_capacity(pool_len as usize);
        let mut buf4 = [0u8; 4];
        for _ in 0..pool_len {
            r.read_exact(&mut buf4)?;
            let base = i32::from_le_bytes(buf4);
            r.read_exact(&mut buf4)?;
            let parent = i32::from_le_bytes(buf4);
            r.read_exact(&mut buf4)?;
            let weight = f32::from_le_bytes(buf4);
            r.read_exact(&mut buf4)?;
            let index = i32::from_le_bytes(buf4);
            pool.push(SyllableSlot { base, parent, weight, index });
        }
        Ok(SyllableDat { pool, char_map, alphabet_size })
    }
}

/// A closed-vocabulary trie for small string sets (TLD tables). Grounded on
/// `string_set_trie.hpp`; built once from a literal list and never mutated.
pub struct StringSetTrie {
    pool: Vec<(i32, i32, bool)>, // (base, parent, is_ending)
    char_map: Vec<i32>,
    alphabet_size: usize,
}

impl StringSetTrie {
    pub fn new(words: &[&str]) -> Self {
        let mut children: Vec<HashMap<u32, usize>> = vec![HashMap::new()];
        let mut ending = vec![false];
        let mut alphabet = BTreeSet::new();
        for w in words {
            let mut cur = 0usize;
            for c in w.chars() {
                let cp = c as u32;
                alphabet.insert(cp);
                let next = *children[cur].entry(cp).or_insert_with(|| {
                    children.push(HashMap::new());
                    ending.push(false);
                    children.len() - 1
                });
                cur = next;
            }
            ending[cur] = true;
        }

        let char_map = build_char_map(&alphabet);
        let alphabet_size = alphabet.len();
        let masks: Vec<Vec<i32>> = children
            .iter()
            .map(|c| c.keys().map(|&cp| char_map[cp as usize]).collect())
            .collect();
        let positions = construct(alphabet_size, &masks);
        let last_position = *positions.iter().max().unwrap_or(&0);
        let mut pool = vec![(0i32, -1i32, false); last_position as usize + alphabet_size];
        pool[0].0 = 1;
        pool[0].2 = ending[0];

        let mut mapping = vec![0usize; children.len()];
        for (i, child_map) in children.iter().enumerate() {
            for (&c, &child_id) in child_map.iter() {
                let index = pool[mapping[i]].0 + char_map[c as usize];
                mapping[child_id] = index as usize;
                pool[index as usize] = (positions[child_id], mapping[i] as i32, ending[child_id]);
            }
        }

        StringSetTrie { pool, char_map, alphabet_size }
    }

    pub fn contains(&self, s: &str) -> bool {
        let mut cur = 0usize;
        for c in s.chars() {
            let cp = c as u32;
            if (cp as usize) >= self.char_map.len() || self.char_map[cp as usize] == -1 {
                return false;
            }
            let child = (self.pool[cur].0 + self.char_map[cp as usize]) as usize;
            if self.pool[child].1 != cur as i32 {
                return false;
            }
            cur = child;
        }
        self.pool[cur].2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_trie::{MultitermHashTrie, SyllableHashTrie};

    #[test]
    fn dat_reaches_terminal_for_inserted_term() {
        let codepoints = crate::codepoint::CodepointTables::simple();
        let mut hash_trie = MultitermHashTrie::new();
        hash_trie.add_new_term(&codepoints, "hanoi", 10, false, false);
        hash_trie.add_new_term(&codepoints, "ha", 5, false, false);
        let nodes = hash_trie.dump_structure();
        let alphabet = hash_trie.dump_alphabet();
        let dat = MultitermDat::build_from_hash_trie(&nodes, &alphabet);

        let mut cur = 0usize;
        for c in "hanoi".chars() {
            cur = dat.has_child(cur, c as u32).expect("should follow trie");
        }
        assert!(dat.is_ending(cur));
    }

    #[test]
    fn dat_rejects_unknown_sequence() {
        let codepoints = crate::codepoint::CodepointTables::simple();
        let mut hash_trie = MultitermHashTrie::new();
        hash_trie.add_new_term(&codepoints, "hanoi", 10, false, false);
        let nodes = hash_trie.dump_structure();
        let alphabet = hash_trie.dump_alphabet();
        let dat = MultitermDat::build_from_hash_trie(&nodes, &alphabet);

        let mut cur = Some(0usize);
        for c in "hanam".chars() {
            cur = cur.and_then(|u| dat.has_child(u, c as u32));
            if cur.is_none() {
                break;
            }
        }
        assert!(cur.is_none() || !dat.is_ending(cur.unwrap()));
    }

    #[test]
    fn syllable_dat_round_trips_through_bytes() {
        let mut hash_trie = SyllableHashTrie::new();
        hash_trie.add_new_term("hoc", 10);
        hash_trie.add_new_term("sinh", 20);
        let nodes = hash_trie.dump_structure();
        let alphabet = hash_trie.dump_alphabet();
        let mut dat = SyllableDat::build_from_hash_trie(&nodes, &alphabet);
        dat.update_index("hoc", 0);
        dat.update_index("sinh", 1);

        let mut buf = Vec::new();
        dat.write(&mut buf).unwrap();
        let read_back = SyllableDat::read(&mut &buf[..]).unwrap();

        let mut cur = 0usize;
        for c in "sinh".chars() {
            cur = read_back.has_child(cur, c as u32).unwrap();
        }
        assert_eq!(read_back.index(cur), 1);
    }

    #[test]
    fn string_set_trie_membership() {
        let trie = StringSetTrie::new(&["com", "net", "org"]);
        assert!(trie.contains("com"));
        assert!(!trie.contains("co"));
        assert!(!trie.contains("coma"));
    }
}
