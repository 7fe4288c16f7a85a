use std::fmt::Display;

use num_traits::PrimInt;

// Bit sequence
//------------------------------------------------------------------------------

/// Growable append-only bit buffer. Bits are stored LSB-first within each
/// backing word; multi-bit appends are written most-significant-bit-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSequence {
    words: Vec<u32>,
    // Bit length
    len: usize,
}

static LOAD_FACTOR_NUM: usize = 3;
static LOAD_FACTOR_DEN: usize = 4;

impl BitSequence {
    pub fn new() -> Self {
        Self { words: Vec::new(), len: 0 }
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self { words: vec![0; bits.div_ceil(32)], len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn byte_len(&self) -> usize {
        (self.len + 7) >> 3
    }

    fn ensure_capacity(&mut self, new_size: usize) {
        if new_size > self.words.len() * 32 {
            // Grow to new_size / 0.75 rounded up to whole words
            let target = (new_size * LOAD_FACTOR_DEN).div_ceil(LOAD_FACTOR_NUM);
            self.words.resize(target.div_ceil(32), 0);
        }
        self.len = self.len.max(new_size);
    }

    fn range_check(&self, index: usize) {
        assert!(index < self.len, "Index {index} out of bounds for length {}", self.len);
    }

    pub fn get(&self, i: usize) -> bool {
        self.range_check(i);
        (self.words[i >> 5] & (1 << (i & 31))) != 0
    }

    pub fn push(&mut self, bit: bool) {
        let i = self.len;
        self.ensure_capacity(i + 1);
        if bit {
            self.words[i >> 5] |= 1 << (i & 31);
        }
    }

    pub fn push_bits<T>(&mut self, bits: T, size: usize)
    where
        T: PrimInt + Display,
    {
        assert!(size <= 32, "Number of bits must be between 0 and 32: {size}");
        let bits = bits.to_u64().expect("Bits should fit in 64 bits") as u32;
        debug_assert!(
            size >= (32 - bits.leading_zeros()) as usize,
            "Bit count shouldn't exceed bit length: Length {size}, Bits {bits}"
        );

        let mut i = self.len;
        self.ensure_capacity(i + size);
        for rem in (0..size).rev() {
            if bits & (1 << rem) != 0 {
                self.words[i >> 5] |= 1 << (i & 31);
            }
            i += 1;
        }
    }

    pub fn extend(&mut self, other: &BitSequence) {
        let offset = self.len;
        self.ensure_capacity(offset + other.len);
        for i in 0..other.len {
            if other.get(i) {
                self.words[(offset + i) >> 5] |= 1 << ((offset + i) & 31);
            }
        }
    }

    // Overwrites one 32-bit-aligned backing word
    pub fn set_bulk(&mut self, index: usize, new_bits: u32) {
        debug_assert!(index & 31 == 0, "Bulk index {index} is not 32-bit aligned");
        self.words[index >> 5] = new_bits;
    }

    fn with_range<F>(&mut self, start: usize, end: usize, mut f: F)
    where
        F: FnMut(&mut u32, u32) -> bool,
    {
        assert!(end >= start, "Range end ({end}) is less than range start ({start})");
        self.range_check(start);
        if end == start {
            return;
        }
        let end = end - 1;
        self.range_check(end);

        let first_word = start >> 5;
        let last_word = end >> 5;
        for i in first_word..=last_word {
            let first_bit = if i > first_word { 0 } else { start & 31 };
            let last_bit = if i < last_word { 31 } else { end & 31 };
            let mask = ((2u64 << last_bit) - (1u64 << first_bit)) as u32;
            if !f(&mut self.words[i], mask) {
                return;
            }
        }
    }

    pub fn set_range(&mut self, start: usize, end: usize) {
        self.with_range(start, end, |word, mask| {
            *word |= mask;
            true
        });
    }

    pub fn is_range(&mut self, start: usize, end: usize, value: bool) -> bool {
        let mut ret = true;
        self.with_range(start, end, |word, mask| {
            if (*word & mask) != if value { mask } else { 0 } {
                ret = false;
                return false;
            }
            true
        });
        ret
    }

    pub fn xor(&mut self, other: &BitSequence) {
        assert!(
            self.len == other.len,
            "Size mismatch ({} and {})",
            self.len,
            other.len
        );
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w ^= o;
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.len = 0;
    }

    // Canonical codeword extraction: reads num_bytes bytes starting at an
    // arbitrary bit offset, MSB-first per byte
    pub fn to_bytes(&self, bit_offset: usize, num_bytes: usize) -> Vec<u8> {
        let mut offset = bit_offset;
        let mut out = vec![0u8; num_bytes];
        for byte in out.iter_mut() {
            for j in 0..8 {
                if self.get(offset) {
                    *byte |= 1 << (7 - j);
                }
                offset += 1;
            }
        }
        out
    }
}


// Bit grid
//------------------------------------------------------------------------------

/// Fixed-size bit grid used to stage the finder and alignment templates.
#[derive(Debug, Clone)]
pub struct BitGrid {
    width: usize,
    height: usize,
    row_size: usize,
    bits: Vec<u32>,
}

impl BitGrid {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width >= 1 && height >= 1, "Both dimensions must be greater than 0");
        let row_size = (width + 31) >> 5;
        Self { width, height, row_size, bits: vec![0; row_size * height] }
    }

    // Builds a grid of width at most 32 from per-row bit patterns, where bit
    // x of a row value is the cell at column x
    pub fn from_raw(width: usize, rows: &[u32]) -> Self {
        debug_assert!(width <= 32, "Raw rows hold at most 32 bits");
        let mut ret = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            ret.bits[y * ret.row_size] = *row;
        }
        ret
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn bounds_check(&self, x: usize, y: usize) {
        assert!(x < self.width, "X index {x} out of bounds for width {}", self.width);
        assert!(y < self.height, "Y index {y} out of bounds for height {}", self.height);
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bounds_check(x, y);
        (self.bits[y * self.row_size + (x >> 5)] >> (x & 31)) & 1 != 0
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.bounds_check(x, y);
        let offset = y * self.row_size + (x >> 5);
        if value {
            self.bits[offset] |= 1 << (x & 31);
        } else {
            self.bits[offset] &= !(1 << (x & 31));
        }
    }

    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) {
        assert!(width >= 1 && height >= 1, "Width and height must be at least 1");
        let right = left + width;
        let bottom = top + height;
        assert!(
            bottom <= self.height && right <= self.width,
            "The region must fit inside the grid"
        );
        for y in top..bottom {
            for x in left..right {
                self.bits[y * self.row_size + (x >> 5)] |= 1 << (x & 31);
            }
        }
    }
}
