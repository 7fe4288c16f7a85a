use crate::common::bits::BitSequence;
use crate::common::charset::Charset;
use crate::common::ec::{ReedSolomonEncoder, QR_CODE_FIELD};
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::{Mode, Version};

/// Byte-mode transcoding used when the caller gives no charset hint.
pub const DEFAULT_BYTE_MODE_ENCODING: Charset = Charset::Iso8859_1;

// Mode selection
//------------------------------------------------------------------------------

#[rustfmt::skip]
static ALPHANUMERIC_TABLE: [i8; 96] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 0x00-0x0f
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 0x10-0x1f
    36, -1, -1, -1, 37, 38, -1, -1, -1, -1, 39, 40, -1, 41, 42, 43, // 0x20-0x2f
     0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 44, -1, -1, -1, -1, -1, // 0x30-0x3f
    -1, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, // 0x40-0x4f
    25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, -1, -1, -1, -1, -1, // 0x50-0x5f
];

/// 45-symbol alphanumeric code for a character, if it has one.
pub fn alphanumeric_code(c: char) -> Option<u16> {
    let code = c as usize;
    if code >= ALPHANUMERIC_TABLE.len() {
        return None;
    }
    match ALPHANUMERIC_TABLE[code] {
        -1 => None,
        v => Some(v as u16),
    }
}

/// Picks the densest mode able to carry the content. Kanji is only eligible
/// under a Shift-JIS hint, and only when every encoded pair has a double-byte
/// leading byte.
pub fn choose_mode(content: &str, charset: Option<Charset>) -> Mode {
    if charset == Some(Charset::ShiftJis) && is_only_double_byte_kanji(content) {
        return Mode::Kanji;
    }
    let mut has_digit = false;
    let mut has_alphanumeric = false;
    for c in content.chars() {
        if c.is_ascii_digit() {
            has_digit = true;
        } else if alphanumeric_code(c).is_some() {
            has_alphanumeric = true;
        } else {
            return Mode::Byte;
        }
    }
    if has_alphanumeric {
        Mode::Alphanumeric
    } else if has_digit {
        Mode::Numeric
    } else {
        Mode::Byte
    }
}

fn is_only_double_byte_kanji(content: &str) -> bool {
    let bytes = match Charset::ShiftJis.encode(content) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return false;
    }
    bytes.chunks_exact(2).all(|pair| matches!(pair[0], 0x81..=0x9F | 0xE0..=0xEB))
}

// Segment packing
//------------------------------------------------------------------------------

pub fn push_mode_info(mode: Mode, bits: &mut BitSequence) {
    bits.push_bits(mode.bits(), 4);
}

pub fn push_eci(designator: u8, bits: &mut BitSequence) {
    push_mode_info(Mode::Eci, bits);
    // One-byte form, sufficient for designators up to 127
    bits.push_bits(designator, 8);
}

pub fn push_length_info(
    num_letters: usize,
    version: Version,
    mode: Mode,
    bits: &mut BitSequence,
) -> QRResult<()> {
    let num_bits = mode.char_count_bits(version);
    if num_letters >= (1 << num_bits) {
        return Err(QRError::DataTooLong);
    }
    bits.push_bits(num_letters as u32, num_bits);
    Ok(())
}

pub fn push_segment(
    content: &str,
    mode: Mode,
    bits: &mut BitSequence,
    charset: Charset,
) -> QRResult<()> {
    match mode {
        Mode::Numeric => {
            push_numeric(content, bits);
            Ok(())
        }
        Mode::Alphanumeric => push_alphanumeric(content, bits),
        Mode::Byte => push_byte_data(content, bits, charset),
        Mode::Kanji => push_kanji(content, bits),
        _ => Err(QRError::InvalidMode),
    }
}

// 3 digits in 10 bits, 2 in 7, a trailing single in 4
fn push_numeric(content: &str, bits: &mut BitSequence) {
    let digits = content.as_bytes();
    for chunk in digits.chunks(3) {
        let value = chunk.iter().fold(0u16, |acc, &d| acc * 10 + (d - b'0') as u16);
        match chunk.len() {
            3 => bits.push_bits(value, 10),
            2 => bits.push_bits(value, 7),
            _ => bits.push_bits(value, 4),
        }
    }
}

// 2 symbols in 11 bits (c1 * 45 + c2), a trailing single in 6
fn push_alphanumeric(content: &str, bits: &mut BitSequence) -> QRResult<()> {
    let codes = content
        .chars()
        .map(|c| alphanumeric_code(c).ok_or(QRError::InvalidChar))
        .collect::<QRResult<Vec<u16>>>()?;
    for chunk in codes.chunks(2) {
        match *chunk {
            [c1, c2] => bits.push_bits(c1 * 45 + c2, 11),
            [c1] => bits.push_bits(c1, 6),
            _ => unreachable!(),
        }
    }
    Ok(())
}

fn push_byte_data(content: &str, bits: &mut BitSequence, charset: Charset) -> QRResult<()> {
    for byte in charset.encode(content)? {
        bits.push_bits(byte, 8);
    }
    Ok(())
}

// Shift-JIS pairs remapped into a dense 13-bit space
fn push_kanji(content: &str, bits: &mut BitSequence) -> QRResult<()> {
    let bytes = Charset::ShiftJis.encode(content)?;
    if bytes.len() % 2 != 0 {
        return Err(QRError::KanjiNotEvenBytes);
    }
    for pair in bytes.chunks_exact(2) {
        let code = ((pair[0] as u16) << 8) | pair[1] as u16;
        let subtracted = match code {
            0x8140..=0x9FFC => code - 0x8140,
            0xE040..=0xEBBF => code - 0xC140,
            _ => return Err(QRError::InvalidKanjiSequence),
        };
        let encoded = (subtracted >> 8) * 0xC0 + (subtracted & 0xFF);
        bits.push_bits(encoded, 13);
    }
    Ok(())
}

// Terminator and padding
//------------------------------------------------------------------------------

/// Appends up to 4 terminator bits, pads to a byte boundary, then alternates
/// 0xEC/0x11 padding codewords up to the exact data capacity.
pub fn terminate_bits(num_data_bytes: usize, bits: &mut BitSequence) -> QRResult<()> {
    let capacity = num_data_bytes * 8;
    if bits.len() > capacity {
        return Err(QRError::DataTooLong);
    }

    for _ in 0..4 {
        if bits.len() >= capacity {
            break;
        }
        bits.push(false);
    }

    let bits_in_last_byte = bits.len() & 7;
    if bits_in_last_byte > 0 {
        for _ in bits_in_last_byte..8 {
            bits.push(false);
        }
    }

    let num_padding_bytes = num_data_bytes - bits.byte_len();
    for i in 0..num_padding_bytes {
        bits.push_bits(if i & 1 == 0 { 0xECu8 } else { 0x11 }, 8);
    }

    assert!(bits.len() == capacity, "Bit size does not equal capacity");
    Ok(())
}

// Block layout and interleaving
//------------------------------------------------------------------------------

/// Data and EC codeword counts for one RS block. Blocks split into two
/// groups: `total % num_blocks` blocks carry one extra codeword.
pub fn block_sizes(
    num_total_bytes: usize,
    num_data_bytes: usize,
    num_blocks: usize,
    block_id: usize,
) -> (usize, usize) {
    assert!(block_id < num_blocks, "Block ID too large");

    let blocks_in_group2 = num_total_bytes % num_blocks;
    let blocks_in_group1 = num_blocks - blocks_in_group2;
    let total_in_group1 = num_total_bytes / num_blocks;
    let total_in_group2 = total_in_group1 + 1;
    let data_in_group1 = num_data_bytes / num_blocks;
    let data_in_group2 = data_in_group1 + 1;
    let ec_in_group1 = total_in_group1 - data_in_group1;
    let ec_in_group2 = total_in_group2 - data_in_group2;

    assert!(ec_in_group1 == ec_in_group2, "EC bytes mismatch");
    assert!(
        num_total_bytes
            == (data_in_group1 + ec_in_group1) * blocks_in_group1
                + (data_in_group2 + ec_in_group2) * blocks_in_group2,
        "Total bytes mismatch"
    );

    if block_id < blocks_in_group1 {
        (data_in_group1, ec_in_group1)
    } else {
        (data_in_group2, ec_in_group2)
    }
}

/// Splits the data stream into RS blocks, computes each block's parity, and
/// re-emits data codewords column-major across blocks followed by EC
/// codewords column-major.
pub fn interleave_with_ec(
    bits: &BitSequence,
    num_total_bytes: usize,
    num_data_bytes: usize,
    num_blocks: usize,
) -> BitSequence {
    assert!(bits.byte_len() == num_data_bytes, "Number of bits and data bytes do not match");

    let mut rs = ReedSolomonEncoder::new(&QR_CODE_FIELD);
    let mut blocks: Vec<(Vec<u8>, Vec<u8>)> = Vec::with_capacity(num_blocks);
    let mut data_offset = 0;
    let mut max_data_bytes = 0;
    let mut max_ec_bytes = 0;

    for block_id in 0..num_blocks {
        let (data_size, ec_size) =
            block_sizes(num_total_bytes, num_data_bytes, num_blocks, block_id);

        let data = bits.to_bytes(8 * data_offset, data_size);
        let mut codewords = data.clone();
        codewords.resize(data_size + ec_size, 0);
        rs.encode(&mut codewords, ec_size);
        let ec = codewords[data_size..].to_vec();

        max_data_bytes = max_data_bytes.max(data_size);
        max_ec_bytes = max_ec_bytes.max(ec_size);
        data_offset += data_size;
        blocks.push((data, ec));
    }

    let mut result = BitSequence::with_capacity(num_total_bytes * 8);
    for i in 0..max_data_bytes {
        for (data, _) in &blocks {
            if let Some(&byte) = data.get(i) {
                result.push_bits(byte, 8);
            }
        }
    }
    for i in 0..max_ec_bytes {
        for (_, ec) in &blocks {
            if let Some(&byte) = ec.get(i) {
                result.push_bits(byte, 8);
            }
        }
    }

    assert!(
        result.byte_len() == num_total_bytes,
        "Interleaving error: {} and {} differ",
        num_total_bytes,
        result.byte_len()
    );
    result
}
