//! GIF-flavoured LZW compression
//!
//! Variable-width codes (starting at `min_code_size + 1` bits, growing to 12)
//! packed LSB-first. The stream opens with a CLEAR code and ends with END.

use std::collections::HashMap;

/// Largest code a GIF LZW stream may use.
pub const MAX_CODE: u16 = 4095;

const MAX_CODE_BITS: u8 = 12;

/// Smallest code size (>= 2) whose code space covers `palette_size` indices.
pub fn min_code_size(palette_size: usize) -> u8 {
    let mut bits = 2u8;
    while (1usize << bits) < palette_size {
        bits += 1;
    }
    bits
}

/// Packs variable-width codes LSB-first.
struct BitWriter {
    out: Vec<u8>,
    buffer: u32,
    count: u8,
}

impl BitWriter {
    fn new() -> Self {
        Self { out: Vec::new(), buffer: 0, count: 0 }
    }

    fn write(&mut self, code: u16, width: u8) {
        self.buffer |= (code as u32) << self.count;
        self.count += width;
        while self.count >= 8 {
            self.out.push((self.buffer & 0xFF) as u8);
            self.buffer >>= 8;
            self.count -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.count > 0 {
            self.out.push((self.buffer & 0xFF) as u8);
        }
        self.out
    }
}

/// Dictionary state for one frame.
struct CodeTable {
    /// (prefix code, next index) -> code
    entries: HashMap<(u16, u8), u16>,
    clear_code: u16,
    end_code: u16,
    next_code: u16,
    code_size: u8,
    min_code_size: u8,
}

impl CodeTable {
    fn new(min_code_size: u8) -> Self {
        let clear_code = 1u16 << min_code_size;
        Self {
            entries: HashMap::new(),
            clear_code,
            end_code: clear_code + 1,
            next_code: clear_code + 2,
            code_size: min_code_size + 1,
            min_code_size,
        }
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.next_code = self.end_code + 1;
        self.code_size = self.min_code_size + 1;
    }

    fn is_full(&self) -> bool {
        self.next_code > MAX_CODE
    }

    fn get(&self, prefix: u16, index: u8) -> Option<u16> {
        self.entries.get(&(prefix, index)).copied()
    }

    fn insert(&mut self, prefix: u16, index: u8) {
        self.entries.insert((prefix, index), self.next_code);
        self.next_code += 1;
        if self.next_code > (1 << self.code_size) && self.code_size < MAX_CODE_BITS {
            self.code_size += 1;
        }
    }
}

/// Compress palette indices into a raw LZW code stream (not yet sub-blocked).
///
/// Every index must be below `2^min_code_size`.
pub fn lzw_encode(indices: &[u8], min_code_size: u8) -> Vec<u8> {
    let mut table = CodeTable::new(min_code_size);
    let mut bits = BitWriter::new();

    bits.write(table.clear_code, table.code_size);

    let Some((&first, rest)) = indices.split_first() else {
        bits.write(table.end_code, table.code_size);
        return bits.finish();
    };

    // Single-index strings are their own code
    let mut current = first as u16;

    for &index in rest {
        if let Some(code) = table.get(current, index) {
            current = code;
            continue;
        }

        bits.write(current, table.code_size);

        if table.is_full() {
            bits.write(table.clear_code, table.code_size);
            table.reset();
        } else {
            table.insert(current, index);
        }

        current = index as u16;
    }

    bits.write(current, table.code_size);
    bits.write(table.end_code, table.code_size);
    bits.finish()
}

/// Split data into GIF sub-blocks (length byte + up to 255 bytes) and
/// append the zero-length terminator.
pub fn write_sub_blocks(out: &mut Vec<u8>, data: &[u8]) {
    for block in data.chunks(255) {
        out.push(block.len() as u8);
        out.extend_from_slice(block);
    }
    out.push(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference GIF LZW decoder used to check the encoder.
    fn lzw_decode(data: &[u8], min_code_size: u8) -> Vec<u8> {
        let clear = 1u16 << min_code_size;
        let end = clear + 1;
        let mut dict: Vec<Vec<u8>> = Vec::new();
        let reset = |dict: &mut Vec<Vec<u8>>| {
            dict.clear();
            for i in 0..clear {
                dict.push(vec![i as u8]);
            }
            dict.push(Vec::new());
            dict.push(Vec::new());
        };
        reset(&mut dict);

        let mut size = min_code_size + 1;
        let mut pos = 0usize;
        let mut prev: Option<Vec<u8>> = None;
        let mut out = Vec::new();

        loop {
            let mut code = 0u16;
            for b in 0..size {
                let byte = data[pos / 8];
                let bit = (byte >> (pos % 8)) & 1;
                code |= (bit as u16) << b;
                pos += 1;
            }

            if code == clear {
                reset(&mut dict);
                size = min_code_size + 1;
                prev = None;
                continue;
            }
            if code == end {
                break;
            }

            let entry = if (code as usize) < dict.len() {
                dict[code as usize].clone()
            } else {
                let p = prev.clone().unwrap();
                let mut e = p.clone();
                e.push(p[0]);
                e
            };
            out.extend_from_slice(&entry);

            if let Some(p) = prev {
                if dict.len() < 4096 {
                    let mut e = p;
                    e.push(entry[0]);
                    dict.push(e);
                }
            }
            if dict.len() == (1 << size) && size < 12 {
                size += 1;
            }
            prev = Some(entry);
        }

        out
    }

    #[test]
    fn test_min_code_size() {
        assert_eq!(min_code_size(2), 2);
        assert_eq!(min_code_size(4), 2);
        assert_eq!(min_code_size(8), 3);
        assert_eq!(min_code_size(16), 4);
        assert_eq!(min_code_size(256), 8);
    }

    #[test]
    fn test_known_stream() {
        // Four identical indices with min code size 2:
        // CLEAR(4) 0 6 0 END(5), all 3 bits wide
        let out = lzw_encode(&[0, 0, 0, 0], 2);
        let packed: u32 = 4 | (6 << 6) | (5 << 12);
        assert_eq!(out, vec![(packed & 0xFF) as u8, (packed >> 8) as u8]);
    }

    #[test]
    fn test_empty_input() {
        let out = lzw_encode(&[], 2);
        let packed: u32 = 4 | (5 << 3);
        assert_eq!(out, vec![packed as u8]);
    }

    #[test]
    fn test_round_trip_small() {
        let data = [1, 2, 1, 2, 1, 2, 3, 3, 3, 0, 1];
        assert_eq!(lzw_decode(&lzw_encode(&data, 2), 2), data);
    }

    #[test]
    fn test_round_trip_code_growth() {
        // Enough varied data for codes to reach 12 bits and the table to fill
        let data: Vec<u8> = (0..60_000u32).map(|i| ((i * 7 + i / 13) % 256) as u8).collect();
        let encoded = lzw_encode(&data, 8);
        assert_eq!(lzw_decode(&encoded, 8), data);
    }

    #[test]
    fn test_round_trip_table_reset_small_palette() {
        let data: Vec<u8> = (0..40_000u32).map(|i| ((i * 31 + i / 7) % 4) as u8).collect();
        assert_eq!(lzw_decode(&lzw_encode(&data, 2), 2), data);
    }

    #[test]
    fn test_sub_blocks() {
        let data = vec![7u8; 600];
        let mut out = Vec::new();
        write_sub_blocks(&mut out, &data);

        assert_eq!(out[0], 255);
        assert_eq!(out[256], 255);
        assert_eq!(out[512], 90);
        assert_eq!(*out.last().unwrap(), 0);
        assert_eq!(out.len(), 600 + 3 + 1);
    }

    #[test]
    fn test_sub_blocks_empty() {
        let mut out = Vec::new();
        write_sub_blocks(&mut out, &[]);
        assert_eq!(out, vec![0]);
    }
}
