use crate::common::bits::{BitGrid, BitSequence};
use crate::common::grid::{Module, SymbolGrid};
use crate::common::mask::MaskPattern;
use crate::common::metadata::{ECLevel, Version};

// Matrix construction
//------------------------------------------------------------------------------

const FINDER_PATTERN: [u32; 7] = [127, 65, 93, 93, 93, 65, 127];
const ALIGNMENT_PATTERN: [u32; 5] = [31, 17, 21, 17, 31];

const TYPE_INFO_COORDINATES: [(usize, usize); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

const VERSION_INFO_POLY: u32 = 0x1F25;
const TYPE_INFO_POLY: u32 = 0x537;
const TYPE_INFO_MASK: u32 = 0x5412;

/// Draws a complete symbol onto an all-Empty grid: function patterns first,
/// then the BCH-protected metadata, then the masked data bits.
pub fn build(
    data_bits: &BitSequence,
    ec_level: ECLevel,
    version: Version,
    mask_pattern: MaskPattern,
    grid: &mut SymbolGrid,
) {
    embed_basic_patterns(version, grid);
    embed_type_info(ec_level, mask_pattern, grid);
    maybe_embed_version_info(version, grid);
    embed_data_bits(data_bits, mask_pattern, grid);
}

pub fn embed_basic_patterns(version: Version, grid: &mut SymbolGrid) {
    embed_finder_patterns_and_separators(grid);
    embed_dark_module(grid);
    maybe_embed_alignment_patterns(version, grid);
    embed_timing_patterns(grid);
}

// Finder patterns and separators
//------------------------------------------------------------------------------

fn embed_template(template: &BitGrid, left: usize, top: usize, grid: &mut SymbolGrid) {
    for y in 0..template.height() {
        for x in 0..template.width() {
            grid.set(left + x, top + y, template.get(x, y).into());
        }
    }
}

fn embed_finder_patterns_and_separators(grid: &mut SymbolGrid) {
    let finder = BitGrid::from_raw(7, &FINDER_PATTERN);
    let width = grid.width();
    embed_template(&finder, 0, 0, grid);
    embed_template(&finder, width - 7, 0, grid);
    embed_template(&finder, 0, width - 7, grid);

    // Horizontal separators below/above the three finder corners
    for (left, top) in [(0, 7), (width - 8, 7), (0, width - 8)] {
        for x in 0..8 {
            debug_assert!(
                grid.get(left + x, top) == Module::Empty,
                "Expected empty at ({}, {top})",
                left + x
            );
            grid.set(left + x, top, Module::Light);
        }
    }
    // Vertical separators flanking them
    for (left, top) in [(7, 0), (width - 8, 0), (7, width - 7)] {
        for y in 0..7 {
            debug_assert!(
                grid.get(left, top + y) == Module::Empty,
                "Expected empty at ({left}, {})",
                top + y
            );
            grid.set(left, top + y, Module::Light);
        }
    }
}

fn embed_dark_module(grid: &mut SymbolGrid) {
    let y = grid.height() - 8;
    assert!(grid.get(8, y) != Module::Light, "Dark module position already light");
    grid.set(8, y, Module::Dark);
}

fn maybe_embed_alignment_patterns(version: Version, grid: &mut SymbolGrid) {
    let alignment = BitGrid::from_raw(5, &ALIGNMENT_PATTERN);
    let centers = version.alignment_pattern_centers();
    for &y in centers {
        for &x in centers {
            // Centers landing on finder corners are already claimed
            if grid.get(x, y) == Module::Empty {
                embed_template(&alignment, x - 2, y - 2, grid);
            }
        }
    }
}

fn embed_timing_patterns(grid: &mut SymbolGrid) {
    for i in 8..grid.width() - 8 {
        let module: Module = ((i + 1) % 2 == 1).into();
        if grid.get(i, 6) == Module::Empty {
            grid.set(i, 6, module);
        }
        if grid.get(6, i) == Module::Empty {
            grid.set(6, i, module);
        }
    }
}

// Format and version info
//------------------------------------------------------------------------------

fn find_msb_set(value: u32) -> u32 {
    32 - value.leading_zeros()
}

/// Remainder of `value` times x^(deg poly) divided by `poly` over GF(2),
/// by MSB-aligned XOR reduction.
pub fn calculate_bch_code(value: u32, poly: u32) -> u32 {
    assert!(poly != 0, "0 polynomial");
    let msb_in_poly = find_msb_set(poly);
    let mut value = value << (msb_in_poly - 1);
    while find_msb_set(value) >= msb_in_poly {
        value ^= poly << (find_msb_set(value) - msb_in_poly);
    }
    value
}

/// 15-bit format info: 2 ec bits and 3 mask bits, BCH parity, then the fixed
/// XOR mask that keeps the field from being all zeros.
pub fn type_info(ec_level: ECLevel, mask_pattern: MaskPattern) -> u32 {
    let data = ((ec_level.bits() as u32) << 3) | *mask_pattern as u32;
    let bch = calculate_bch_code(data, TYPE_INFO_POLY);
    ((data << 10) | bch) ^ TYPE_INFO_MASK
}

/// 18-bit version info: the 6-bit version number with 12 bits of BCH parity.
pub fn version_info(version: Version) -> u32 {
    let number = *version as u32;
    (number << 12) | calculate_bch_code(number, VERSION_INFO_POLY)
}

pub fn embed_type_info(ec_level: ECLevel, mask_pattern: MaskPattern, grid: &mut SymbolGrid) {
    let info = type_info(ec_level, mask_pattern);
    let width = grid.width();
    for (i, &(x1, y1)) in TYPE_INFO_COORDINATES.iter().enumerate() {
        let module: Module = ((info >> i) & 1 == 1).into();
        grid.set(x1, y1, module);

        // Mirror strip along the top right and bottom left edges
        let (x2, y2) = if i < 8 { (width - i - 1, 8) } else { (8, width - 7 + (i - 8)) };
        grid.set(x2, y2, module);
    }
}

pub fn maybe_embed_version_info(version: Version, grid: &mut SymbolGrid) {
    if *version < 7 {
        return;
    }
    let info = version_info(version);
    let height = grid.height();
    for i in 0..6 {
        for j in 0..3 {
            let module: Module = ((info >> (i * 3 + j)) & 1 == 1).into();
            grid.set(i, height - 11 + j, module);
            grid.set(height - 11 + j, i, module);
        }
    }
}

// Data bits
//------------------------------------------------------------------------------

/// Walks column pairs right to left in a boustrophedon, dropping each data
/// bit into the next Empty cell, XORed with the mask. The stream is padded
/// with zeros once exhausted.
pub fn embed_data_bits(data_bits: &BitSequence, mask_pattern: MaskPattern, grid: &mut SymbolGrid) {
    let mask = mask_pattern.mask_function();
    let height = grid.height() as isize;
    let mut bit_index = 0;
    let mut direction: isize = -1;
    let mut x = grid.width() as isize - 1;
    let mut y = height - 1;

    while x > 0 {
        // Skip the vertical timing pattern column
        if x == 6 {
            x -= 1;
        }
        while y >= 0 && y < height {
            for i in 0..2 {
                let xx = (x - i) as usize;
                let yy = y as usize;
                if grid.get(xx, yy) != Module::Empty {
                    continue;
                }
                let mut bit = if bit_index < data_bits.len() {
                    bit_index += 1;
                    data_bits.get(bit_index - 1)
                } else {
                    false
                };
                if mask(xx, yy) {
                    bit = !bit;
                }
                grid.set(xx, yy, bit.into());
            }
            y += direction;
        }
        direction = -direction;
        y += direction;
        x -= 2;
    }
}

#[cfg(test)]
mod matrix_tests {
    use test_case::test_case;

    use super::*;
    use crate::common::bits::BitSequence;
    use crate::common::grid::{Module, SymbolGrid};
    use crate::common::mask::MaskPattern;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_calculate_bch_code() {
        assert_eq!(calculate_bch_code(5, TYPE_INFO_POLY), 0xDC);
        assert_eq!(calculate_bch_code(7, VERSION_INFO_POLY), 0xC94);
    }

    #[test]
    #[should_panic(expected = "0 polynomial")]
    fn test_bch_zero_polynomial() {
        calculate_bch_code(5, 0);
    }

    #[test]
    fn test_type_info() {
        // (M, mask 5): data 00101, BCH 0xDC, masked with 0x5412
        assert_eq!(
            type_info(ECLevel::M, MaskPattern::new(5).unwrap()),
            0b100000011001110
        );
    }

    #[test]
    fn test_version_info() {
        assert_eq!(version_info(Version::new(7).unwrap()), 0x07C94);
    }

    #[test]
    fn test_basic_patterns_v1() {
        let mut grid = SymbolGrid::new(21, 21);
        embed_basic_patterns(Version::new(1).unwrap(), &mut grid);

        // Finder centers are dark, separators light
        assert_eq!(grid.get(0, 0), Module::Dark);
        assert_eq!(grid.get(3, 3), Module::Dark);
        assert_eq!(grid.get(1, 1), Module::Light);
        assert_eq!(grid.get(7, 0), Module::Light);
        assert_eq!(grid.get(20, 0), Module::Dark);
        assert_eq!(grid.get(0, 20), Module::Dark);
        // Dark module
        assert_eq!(grid.get(8, 13), Module::Dark);
        // Timing pattern alternates starting dark at 8
        assert_eq!(grid.get(8, 6), Module::Dark);
        assert_eq!(grid.get(9, 6), Module::Light);
        assert_eq!(grid.get(6, 8), Module::Dark);
        assert_eq!(grid.get(6, 9), Module::Light);
        // Format strips stay unclaimed for later steps
        assert_eq!(grid.get(8, 0), Module::Empty);
        assert_eq!(grid.get(8, 8), Module::Empty);
    }

    #[test]
    fn test_alignment_patterns_skip_finders() {
        let mut grid = SymbolGrid::new(45, 45);
        embed_basic_patterns(Version::new(7).unwrap(), &mut grid);
        // Center (22, 22) hosts an alignment pattern
        assert_eq!(grid.get(22, 22), Module::Dark);
        assert_eq!(grid.get(21, 21), Module::Light);
        assert_eq!(grid.get(20, 20), Module::Dark);
        // (6, 6) overlaps the top left finder and is skipped
        assert_eq!(grid.get(6, 6), Module::Dark);
        assert_eq!(grid.get(5, 5), Module::Light);
    }

    #[test_case(1; "version 1")]
    #[test_case(6; "version 6")]
    fn test_no_version_info_below_seven(version: u8) {
        let version = Version::new(version).unwrap();
        let width = version.width();
        let mut grid = SymbolGrid::new(width, width);
        maybe_embed_version_info(version, &mut grid);
        assert_eq!(grid.count_dark(), 0);
    }

    #[test]
    fn test_version_info_blocks() {
        let version = Version::new(7).unwrap();
        let mut grid = SymbolGrid::new(45, 45);
        maybe_embed_version_info(version, &mut grid);
        // 0x07C94 has 8 set bits, mirrored into two blocks
        assert_eq!(grid.count_dark(), 16);
        // Bit 0 of the info value sits at (0, 34) and (34, 0)
        assert_eq!(grid.get(0, 34), Module::Light);
        assert_eq!(grid.get(34, 0), Module::Light);
        assert_eq!(grid.get(0, 36), Module::Dark);
        assert_eq!(grid.get(36, 0), Module::Dark);
    }

    #[test]
    fn test_full_build_claims_every_cell() {
        let version = Version::new(1).unwrap();
        let mut grid = SymbolGrid::new(21, 21);
        let mut bits = BitSequence::new();
        for byte in [32u8, 65, 205, 69, 41, 220, 46, 128, 236] {
            bits.push_bits(byte, 8);
        }
        build(&bits, ECLevel::H, version, MaskPattern::new(0).unwrap(), &mut grid);
        for y in 0..21 {
            for x in 0..21 {
                assert!(grid.get(x, y) != Module::Empty, "({x}, {y}) left empty");
            }
        }
    }
}
