//! Sparse syllable-pair frequency matrix used by the sticky splitter's pair
//! bonus. Grounded on `load_and_dump_nontone_pairs` in `dict_compiler.cpp`
//! (score formula, input varint layout) and `buffered_reader.hpp` (the
//! continuation-bit integer decoding).

use std::collections::HashMap;
use std::io::{self, Read, Write};

use crate::error::{Result, TokenizerError};

/// `w = pair_coeff * (len1+len2)^pair_len_power * pair_freq^pair_power`.
const PAIR_COEFF: f64 = 0.1;
const PAIR_LEN_POWER: f64 = 0.994141;
const PAIR_POWER: f64 = 0.19;

/// Decodes the `nontone_pair_freq` input dictionary's continuation-bit
/// integer stream. Every integer's first byte is consumed unconditionally;
/// further bytes are consumed while their high bit is set, and the first
/// byte without the high bit set is buffered as the *next* integer's first
/// byte rather than terminating the current one with an extra read.
struct VarintReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    pending: Option<u8>,
}

impl<'a> VarintReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        VarintReader { bytes, pos: 0, pending: None }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn next_int(&mut self) -> i32 {
        let mut res: i32 = 0;
        let mut power: u32 = 0;
        if let Some(last) = self.pending.take() {
            res = last as i32;
            power = 7;
        }
        while let Some(d) = self.read_byte() {
            if power > 0 && (d & 0x80) == 0 {
                self.pending = Some(d);
                break;
            }
            res |= ((d & 0x7f) as i32) << power;
            power += 7;
        }
        res
    }
}

/// Sparse `first_syllable_index -> second_syllable_index -> bonus weight`
/// matrix for sticky-text pair scoring.
pub struct PairMatrix {
    rows: Vec<HashMap<usize, f32>>,
}

impl PairMatrix {
    pub fn empty(rows: usize) -> Self {
        PairMatrix { rows: vec![HashMap::new(); rows] }
    }

    /// Parse the raw `nontone_pair_freq` dictionary contents against the
    /// per-syllable lengths already assigned by `SyllableDat::update_index`
    /// (ordered the same way as `Freq2NontoneUniFile`).
    pub fn build_from_input(raw: &[u8], syllable_length: &[i32]) -> Result<Self> {
        let mut reader = VarintReader::new(raw);
        let n = reader.next_int();
        if n as usize != syllable_length.len() {
            return Err(TokenizerError::DictMalformed {
                detail: format!(
                    "nontone_pair_freq row count {n} does not match syllable count {}",
                    syllable_length.len()
                ),
            });
        }

        let mut rows = vec![HashMap::new(); n as usize];
        for (first_index, row) in rows.iter_mut().enumerate() {
            let n_pairs = reader.next_int();
            let mut second_index: i32 = 0;
            for _ in 0..n_pairs {
                second_index += reader.next_int();
                let pair_freq = reader.next_int();
                let pair_len = syllable_length[first_index] + syllable_length[second_index as usize];
                let score = PAIR_COEFF * (pair_len as f64).powf(PAIR_LEN_POWER) * (pair_freq as f64).powf(PAIR_POWER);
                row.insert(second_index as usize, score as f32);
            }
        }

        Ok(PairMatrix { rows })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn lookup(&self, first: usize, second: usize) -> f32 {
        self.rows.get(first).and_then(|row| row.get(&second)).copied().unwrap_or(0.0)
    }

    pub fn write(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&(self.rows.len() as i32).to_le_bytes())?;
        for row in &self.rows {
            w.write_all(&(row.len() as u32).to_le_bytes())?;
            for (&k, &v) in row {
                w.write_all(&(k as u32).to_le_bytes())?;
                w.write_all(&v.to_le_bytes())?;
            }
        }
        Ok(())
    }

    pub fn read(r: &mut impl Read) -> io::Result<Self> {
        let mut buf4 = [0u8; 4];
        r.read_exact(&mut buf4)?;
        let n = i32::from_le_bytes(buf4) as usize;
        let mut rows = Vec::with_capacity(n);
        for _ in 0..n {
            r.read_exact(&mut buf4)?;
            let count = u32::from_le_bytes(buf4);
            let mut row = HashMap::with_capacity(count as usize);
            for _ in 0..count {
                r.read_exact(&mut buf4)?;
                let key = u32::from_le_bytes(buf4) as usize;
                r.read_exact(&mut buf4)?;
                let val = f32::from_le_bytes(buf4);
                row.insert(key, val);
            }
            rows.push(row);
        }
        Ok(PairMatrix { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mirrors `VarintReader`'s convention: the first byte's high bit is
    /// clear, every continuation byte's high bit is set.
    fn encode_int(out: &mut Vec<u8>, mut v: i32) {
        out.push((v & 0x7f) as u8);
        v >>= 7;
        while v != 0 {
            out.push(((v & 0x7f) as u8) | 0x80);
            v >>= 7;
        }
    }

    #[test]
    fn varint_round_trips_small_values() {
        let mut buf = Vec::new();
        for v in [0, 1, 127, 128, 300, 16384] {
            encode_int(&mut buf, v);
        }
        let mut reader = VarintReader::new(&buf);
        for v in [0, 1, 127, 128, 300, 16384] {
            assert_eq!(reader.next_int(), v);
        }
    }

    #[test]
    fn build_from_input_computes_pair_score() {
        let mut buf = Vec::new();
        encode_int(&mut buf, 2); // 2 syllables
        encode_int(&mut buf, 1); // row 0: 1 pair
        encode_int(&mut buf, 1); // delta -> second_index 1
        encode_int(&mut buf, 10); // freq 10
        encode_int(&mut buf, 0); // row 1: 0 pairs

        let matrix = PairMatrix::build_from_input(&buf, &[2, 3]).unwrap();
        let score = matrix.lookup(0, 1);
        let expected = (PAIR_COEFF * (5f64).powf(PAIR_LEN_POWER) * (10f64).powf(PAIR_POWER)) as f32;
        assert!((score - expected).abs() < 1e-6);
        assert_eq!(matrix.lookup(1, 0), 0.0);
    }

    #[test]
    fn round_trips_through_bytes() {
        let mut rows = vec![HashMap::new(); 2];
        rows[0].insert(1usize, 0.5f32);
        let matrix = PairMatrix { rows };
        let mut buf = Vec::new();
        matrix.write(&mut buf).unwrap();
        let read_back = PairMatrix::read(&mut &buf[..]).unwrap();
        assert_eq!(read_back.lookup(0, 1), 0.5);
    }
}
