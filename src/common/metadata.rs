use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::Deref;

use crate::common::error::{QRError, QRResult};

// Error correction level
//------------------------------------------------------------------------------

/// Error correction level. Declaration order is the table ordinal used to
/// index per-version block records; the format-info bit codes differ (L=01,
/// M=00, Q=11, H=10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ECLevel {
    L,
    M,
    Q,
    H,
}

impl ECLevel {
    pub fn bits(self) -> u8 {
        match self {
            ECLevel::L => 0b01,
            ECLevel::M => 0b00,
            ECLevel::Q => 0b11,
            ECLevel::H => 0b10,
        }
    }

    pub fn from_bits(bits: u8) -> QRResult<Self> {
        match bits {
            0b00 => Ok(ECLevel::M),
            0b01 => Ok(ECLevel::L),
            0b10 => Ok(ECLevel::H),
            0b11 => Ok(ECLevel::Q),
            _ => Err(QRError::InvalidECLevel),
        }
    }

    pub fn parse(name: &str) -> QRResult<Self> {
        match name.trim() {
            "L" | "l" => Ok(ECLevel::L),
            "M" | "m" => Ok(ECLevel::M),
            "Q" | "q" => Ok(ECLevel::Q),
            "H" | "h" => Ok(ECLevel::H),
            _ => Err(QRError::InvalidECLevel),
        }
    }
}

impl Display for ECLevel {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(match self {
            ECLevel::L => "L",
            ECLevel::M => "M",
            ECLevel::Q => "Q",
            ECLevel::H => "H",
        })
    }
}

// Mode
//------------------------------------------------------------------------------

/// Segment tag written into the bit stream ahead of each chunk of payload.
/// Only Numeric, Alphanumeric, Byte and Kanji carry data here; the rest are
/// structural markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Terminator,
    Numeric,
    Alphanumeric,
    StructuredAppend,
    Byte,
    Fnc1First,
    Eci,
    Kanji,
    Fnc1Second,
    Hanzi,
}

impl Mode {
    pub fn bits(self) -> u8 {
        match self {
            Mode::Terminator => 0x0,
            Mode::Numeric => 0x1,
            Mode::Alphanumeric => 0x2,
            Mode::StructuredAppend => 0x3,
            Mode::Byte => 0x4,
            Mode::Fnc1First => 0x5,
            Mode::Eci => 0x7,
            Mode::Kanji => 0x8,
            Mode::Fnc1Second => 0x9,
            Mode::Hanzi => 0xD,
        }
    }

    pub fn from_bits(bits: u8) -> QRResult<Self> {
        match bits {
            0x0 => Ok(Mode::Terminator),
            0x1 => Ok(Mode::Numeric),
            0x2 => Ok(Mode::Alphanumeric),
            0x3 => Ok(Mode::StructuredAppend),
            0x4 => Ok(Mode::Byte),
            0x5 => Ok(Mode::Fnc1First),
            0x7 => Ok(Mode::Eci),
            0x8 => Ok(Mode::Kanji),
            0x9 => Ok(Mode::Fnc1Second),
            0xD => Ok(Mode::Hanzi),
            _ => Err(QRError::InvalidMode),
        }
    }

    /// Width of the character count field for this mode at the given version.
    pub fn char_count_bits(self, version: Version) -> usize {
        let widths = match self {
            Mode::Numeric => [10, 12, 14],
            Mode::Alphanumeric => [9, 11, 13],
            Mode::Byte => [8, 16, 16],
            Mode::Kanji | Mode::Hanzi => [8, 10, 12],
            _ => [0, 0, 0],
        };
        match *version {
            1..=9 => widths[0],
            10..=26 => widths[1],
            _ => widths[2],
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(match self {
            Mode::Terminator => "Terminator",
            Mode::Numeric => "Numeric",
            Mode::Alphanumeric => "Alphanumeric",
            Mode::StructuredAppend => "StructuredAppend",
            Mode::Byte => "Byte",
            Mode::Fnc1First => "Fnc1First",
            Mode::Eci => "Eci",
            Mode::Kanji => "Kanji",
            Mode::Fnc1Second => "Fnc1Second",
            Mode::Hanzi => "Hanzi",
        })
    }
}

// Version
//------------------------------------------------------------------------------

/// Symbol version, 1 through 40.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(u8);

impl Version {
    pub fn new(number: u8) -> QRResult<Self> {
        if !(1..=40).contains(&number) {
            return Err(QRError::InvalidVersion);
        }
        Ok(Version(number))
    }

    pub fn width(self) -> usize {
        17 + 4 * self.0 as usize
    }

    pub fn alignment_pattern_centers(self) -> &'static [usize] {
        VERSION_INFO[self.0 as usize - 1].alignments
    }

    pub fn ec_blocks(self, ec_level: ECLevel) -> &'static ECBlocks {
        &VERSION_INFO[self.0 as usize - 1].ec[ec_level as usize]
    }

    pub fn total_codewords(self) -> usize {
        let ecb = self.ec_blocks(ECLevel::L);
        let per_block = ecb.ec_codewords_per_block;
        ecb.blocks().iter().map(|b| b.count * (b.data_codewords + per_block)).sum()
    }

    pub fn data_codewords(self, ec_level: ECLevel) -> usize {
        self.total_codewords() - self.ec_blocks(ec_level).total_ec_codewords()
    }
}

impl Deref for Version {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

// Version table
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ECB {
    pub count: usize,
    pub data_codewords: usize,
}

/// Block layout for one (version, ec level) pair. At most two block groups
/// exist; a zero-count second group means the layout has only one.
#[derive(Debug, Clone, Copy)]
pub struct ECBlocks {
    pub ec_codewords_per_block: usize,
    groups: [ECB; 2],
}

impl ECBlocks {
    pub fn blocks(&self) -> &[ECB] {
        if self.groups[1].count == 0 {
            &self.groups[..1]
        } else {
            &self.groups
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks().iter().map(|b| b.count).sum()
    }

    pub fn total_ec_codewords(&self) -> usize {
        self.ec_codewords_per_block * self.num_blocks()
    }
}

struct VersionInfo {
    alignments: &'static [usize],
    ec: [ECBlocks; 4],
}

const fn e1(ec: usize, c1: usize, d1: usize) -> ECBlocks {
    ECBlocks {
        ec_codewords_per_block: ec,
        groups: [
            ECB { count: c1, data_codewords: d1 },
            ECB { count: 0, data_codewords: 0 },
        ],
    }
}

const fn e2(ec: usize, c1: usize, d1: usize, c2: usize, d2: usize) -> ECBlocks {
    ECBlocks {
        ec_codewords_per_block: ec,
        groups: [
            ECB { count: c1, data_codewords: d1 },
            ECB { count: c2, data_codewords: d2 },
        ],
    }
}

// Alignment centers and block layouts per ISO/IEC 18004 tables, ordered L, M,
// Q, H per version
static VERSION_INFO: [VersionInfo; 40] = [
    VersionInfo {
        alignments: &[],
        ec: [e1(7, 1, 19), e1(10, 1, 16), e1(13, 1, 13), e1(17, 1, 9)],
    },
    VersionInfo {
        alignments: &[6, 18],
        ec: [e1(10, 1, 34), e1(16, 1, 28), e1(22, 1, 22), e1(28, 1, 16)],
    },
    VersionInfo {
        alignments: &[6, 22],
        ec: [e1(15, 1, 55), e1(26, 1, 44), e1(18, 2, 17), e1(22, 2, 13)],
    },
    VersionInfo {
        alignments: &[6, 26],
        ec: [e1(20, 1, 80), e1(18, 2, 32), e1(26, 2, 24), e1(16, 4, 9)],
    },
    VersionInfo {
        alignments: &[6, 30],
        ec: [e1(26, 1, 108), e1(24, 2, 43), e2(18, 2, 15, 2, 16), e2(22, 2, 11, 2, 12)],
    },
    VersionInfo {
        alignments: &[6, 34],
        ec: [e1(18, 2, 68), e1(16, 4, 27), e1(24, 4, 19), e1(28, 4, 15)],
    },
    VersionInfo {
        alignments: &[6, 22, 38],
        ec: [e1(20, 2, 78), e1(18, 4, 31), e2(18, 2, 14, 4, 15), e2(26, 4, 13, 1, 14)],
    },
    VersionInfo {
        alignments: &[6, 24, 42],
        ec: [e1(24, 2, 97), e2(22, 2, 38, 2, 39), e2(22, 4, 18, 2, 19), e2(26, 4, 14, 2, 15)],
    },
    VersionInfo {
        alignments: &[6, 26, 46],
        ec: [e1(30, 2, 116), e2(22, 3, 36, 2, 37), e2(20, 4, 16, 4, 17), e2(24, 4, 12, 4, 13)],
    },
    VersionInfo {
        alignments: &[6, 28, 50],
        ec: [e2(18, 2, 68, 2, 69), e2(26, 4, 43, 1, 44), e2(24, 6, 19, 2, 20), e2(28, 6, 15, 2, 16)],
    },
    VersionInfo {
        alignments: &[6, 30, 54],
        ec: [e1(20, 4, 81), e2(30, 1, 50, 4, 51), e2(28, 4, 22, 4, 23), e2(24, 3, 12, 8, 13)],
    },
    VersionInfo {
        alignments: &[6, 32, 58],
        ec: [e2(24, 2, 92, 2, 93), e2(22, 6, 36, 2, 37), e2(26, 4, 20, 6, 21), e2(28, 7, 14, 4, 15)],
    },
    VersionInfo {
        alignments: &[6, 34, 62],
        ec: [e1(26, 4, 107), e2(22, 8, 37, 1, 38), e2(24, 8, 20, 4, 21), e2(22, 12, 11, 4, 12)],
    },
    VersionInfo {
        alignments: &[6, 26, 46, 66],
        ec: [e2(30, 3, 115, 1, 116), e2(24, 4, 40, 5, 41), e2(20, 11, 16, 5, 17), e2(24, 11, 12, 5, 13)],
    },
    VersionInfo {
        alignments: &[6, 26, 48, 70],
        ec: [e2(22, 5, 87, 1, 88), e2(24, 5, 41, 5, 42), e2(30, 5, 24, 7, 25), e2(24, 11, 12, 7, 13)],
    },
    VersionInfo {
        alignments: &[6, 26, 50, 74],
        ec: [e2(24, 5, 98, 1, 99), e2(28, 7, 45, 3, 46), e2(24, 15, 19, 2, 20), e2(30, 3, 15, 13, 16)],
    },
    VersionInfo {
        alignments: &[6, 30, 54, 78],
        ec: [e2(28, 1, 107, 5, 108), e2(28, 10, 46, 1, 47), e2(28, 1, 22, 15, 23), e2(28, 2, 14, 17, 15)],
    },
    VersionInfo {
        alignments: &[6, 30, 56, 82],
        ec: [e2(30, 5, 120, 1, 121), e2(26, 9, 43, 4, 44), e2(28, 17, 22, 1, 23), e2(28, 2, 14, 19, 15)],
    },
    VersionInfo {
        alignments: &[6, 30, 58, 86],
        ec: [e2(28, 3, 113, 4, 114), e2(26, 3, 44, 11, 45), e2(26, 17, 21, 4, 22), e2(26, 9, 13, 16, 14)],
    },
    VersionInfo {
        alignments: &[6, 34, 62, 90],
        ec: [e2(28, 3, 107, 5, 108), e2(26, 3, 41, 13, 42), e2(30, 15, 24, 5, 25), e2(28, 15, 15, 10, 16)],
    },
    VersionInfo {
        alignments: &[6, 28, 50, 72, 94],
        ec: [e2(28, 4, 116, 4, 117), e1(26, 17, 42), e2(28, 17, 22, 6, 23), e2(30, 19, 16, 6, 17)],
    },
    VersionInfo {
        alignments: &[6, 26, 50, 74, 98],
        ec: [e2(28, 2, 111, 7, 112), e1(28, 17, 46), e2(30, 7, 24, 16, 25), e1(24, 34, 13)],
    },
    VersionInfo {
        alignments: &[6, 30, 54, 78, 102],
        ec: [e2(30, 4, 121, 5, 122), e2(28, 4, 47, 14, 48), e2(30, 11, 24, 14, 25), e2(30, 16, 15, 14, 16)],
    },
    VersionInfo {
        alignments: &[6, 28, 54, 80, 106],
        ec: [e2(30, 6, 117, 4, 118), e2(28, 6, 45, 14, 46), e2(30, 11, 24, 16, 25), e2(30, 30, 16, 2, 17)],
    },
    VersionInfo {
        alignments: &[6, 32, 58, 84, 110],
        ec: [e2(26, 8, 106, 4, 107), e2(28, 8, 47, 13, 48), e2(30, 7, 24, 22, 25), e2(30, 22, 15, 13, 16)],
    },
    VersionInfo {
        alignments: &[6, 30, 58, 86, 114],
        ec: [e2(28, 10, 114, 2, 115), e2(28, 19, 46, 4, 47), e2(28, 28, 22, 6, 23), e2(30, 33, 16, 4, 17)],
    },
    VersionInfo {
        alignments: &[6, 34, 62, 90, 118],
        ec: [e2(30, 8, 122, 4, 123), e2(28, 22, 45, 3, 46), e2(30, 8, 23, 26, 24), e2(30, 12, 15, 28, 16)],
    },
    VersionInfo {
        alignments: &[6, 26, 50, 74, 98, 122],
        ec: [e2(30, 3, 117, 10, 118), e2(28, 3, 45, 23, 46), e2(30, 4, 24, 31, 25), e2(30, 11, 15, 31, 16)],
    },
    VersionInfo {
        alignments: &[6, 30, 54, 78, 102, 126],
        ec: [e2(30, 7, 116, 7, 117), e2(28, 21, 45, 7, 46), e2(30, 1, 23, 37, 24), e2(30, 19, 15, 26, 16)],
    },
    VersionInfo {
        alignments: &[6, 26, 52, 78, 104, 130],
        ec: [e2(30, 5, 115, 10, 116), e2(28, 19, 47, 10, 48), e2(30, 15, 24, 25, 25), e2(30, 23, 15, 25, 16)],
    },
    VersionInfo {
        alignments: &[6, 30, 56, 82, 108, 134],
        ec: [e2(30, 13, 115, 3, 116), e2(28, 2, 46, 29, 47), e2(30, 42, 24, 1, 25), e2(30, 23, 15, 28, 16)],
    },
    VersionInfo {
        alignments: &[6, 34, 60, 86, 112, 138],
        ec: [e1(30, 17, 115), e2(28, 10, 46, 23, 47), e2(30, 10, 24, 35, 25), e2(30, 19, 15, 35, 16)],
    },
    VersionInfo {
        alignments: &[6, 30, 58, 86, 114, 142],
        ec: [e2(30, 17, 115, 1, 116), e2(28, 14, 46, 21, 47), e2(30, 29, 24, 19, 25), e2(30, 11, 15, 46, 16)],
    },
    VersionInfo {
        alignments: &[6, 34, 62, 90, 118, 146],
        ec: [e2(30, 13, 115, 6, 116), e2(28, 14, 46, 23, 47), e2(30, 44, 24, 7, 25), e2(30, 59, 16, 1, 17)],
    },
    VersionInfo {
        alignments: &[6, 30, 54, 78, 102, 126, 150],
        ec: [e2(30, 12, 121, 7, 122), e2(28, 12, 47, 26, 48), e2(30, 39, 24, 14, 25), e2(30, 22, 15, 41, 16)],
    },
    VersionInfo {
        alignments: &[6, 24, 50, 76, 102, 128, 154],
        ec: [e2(30, 6, 121, 14, 122), e2(28, 6, 47, 34, 48), e2(30, 46, 24, 10, 25), e2(30, 2, 15, 64, 16)],
    },
    VersionInfo {
        alignments: &[6, 28, 54, 80, 106, 132, 158],
        ec: [e2(30, 17, 122, 4, 123), e2(28, 29, 46, 14, 47), e2(30, 49, 24, 10, 25), e2(30, 24, 15, 46, 16)],
    },
    VersionInfo {
        alignments: &[6, 32, 58, 84, 110, 136, 162],
        ec: [e2(30, 4, 122, 18, 123), e2(28, 13, 46, 32, 47), e2(30, 48, 24, 14, 25), e2(30, 42, 15, 32, 16)],
    },
    VersionInfo {
        alignments: &[6, 26, 54, 82, 110, 138, 166],
        ec: [e2(30, 20, 117, 4, 118), e2(28, 40, 47, 7, 48), e2(30, 43, 24, 22, 25), e2(30, 10, 15, 67, 16)],
    },
    VersionInfo {
        alignments: &[6, 30, 58, 86, 114, 142, 170],
        ec: [e2(30, 19, 118, 6, 119), e2(28, 18, 47, 31, 48), e2(30, 34, 24, 34, 25), e2(30, 20, 15, 61, 16)],
    },
];

#[cfg(test)]
mod metadata_tests {
    use test_case::test_case;

    use super::{ECLevel, Mode, Version};
    use crate::common::error::QRError;

    #[test_case(ECLevel::L, 0b01)]
    #[test_case(ECLevel::M, 0b00)]
    #[test_case(ECLevel::Q, 0b11)]
    #[test_case(ECLevel::H, 0b10)]
    fn test_ec_level_bits(level: ECLevel, bits: u8) {
        assert_eq!(level.bits(), bits);
        assert_eq!(ECLevel::from_bits(bits), Ok(level));
    }

    #[test]
    fn test_ec_level_parse() {
        assert_eq!(ECLevel::parse("q"), Ok(ECLevel::Q));
        assert_eq!(ECLevel::parse(" H "), Ok(ECLevel::H));
        assert_eq!(ECLevel::parse("X"), Err(QRError::InvalidECLevel));
        assert_eq!(ECLevel::from_bits(4), Err(QRError::InvalidECLevel));
    }

    #[test_case(0x1, Mode::Numeric)]
    #[test_case(0x4, Mode::Byte)]
    #[test_case(0x8, Mode::Kanji)]
    #[test_case(0xD, Mode::Hanzi)]
    fn test_mode_bits(bits: u8, mode: Mode) {
        assert_eq!(Mode::from_bits(bits), Ok(mode));
        assert_eq!(mode.bits(), bits);
    }

    #[test]
    fn test_mode_from_bits_invalid() {
        assert_eq!(Mode::from_bits(0x6), Err(QRError::InvalidMode));
        assert_eq!(Mode::from_bits(0xA), Err(QRError::InvalidMode));
        assert_eq!(Mode::from_bits(0xF), Err(QRError::InvalidMode));
    }

    #[test_case(Mode::Numeric, 1, 10)]
    #[test_case(Mode::Numeric, 9, 10)]
    #[test_case(Mode::Numeric, 10, 12)]
    #[test_case(Mode::Numeric, 26, 12)]
    #[test_case(Mode::Numeric, 27, 14)]
    #[test_case(Mode::Alphanumeric, 5, 9)]
    #[test_case(Mode::Alphanumeric, 20, 11)]
    #[test_case(Mode::Alphanumeric, 40, 13)]
    #[test_case(Mode::Byte, 9, 8)]
    #[test_case(Mode::Byte, 10, 16)]
    #[test_case(Mode::Byte, 40, 16)]
    #[test_case(Mode::Kanji, 8, 8)]
    #[test_case(Mode::Kanji, 11, 10)]
    #[test_case(Mode::Kanji, 30, 12)]
    #[test_case(Mode::Eci, 15, 0)]
    fn test_char_count_bits(mode: Mode, version: u8, expected: usize) {
        let version = Version::new(version).unwrap();
        assert_eq!(mode.char_count_bits(version), expected);
    }

    #[test]
    fn test_version_bounds() {
        assert!(Version::new(1).is_ok());
        assert!(Version::new(40).is_ok());
        assert_eq!(Version::new(0), Err(QRError::InvalidVersion));
        assert_eq!(Version::new(41), Err(QRError::InvalidVersion));
    }

    #[test]
    fn test_version_width() {
        assert_eq!(Version::new(1).unwrap().width(), 21);
        assert_eq!(Version::new(7).unwrap().width(), 45);
        assert_eq!(Version::new(40).unwrap().width(), 177);
    }

    #[test]
    fn test_known_capacities() {
        let v1 = Version::new(1).unwrap();
        assert_eq!(v1.total_codewords(), 26);
        assert_eq!(v1.data_codewords(ECLevel::H), 9);
        assert_eq!(v1.data_codewords(ECLevel::L), 19);
        let v40 = Version::new(40).unwrap();
        assert_eq!(v40.total_codewords(), 3706);
        assert_eq!(v40.data_codewords(ECLevel::H), 1276);
    }

    // Block sums must re-derive the version total for every level
    #[test]
    fn test_table_consistency() {
        for num in 1..=40 {
            let version = Version::new(num).unwrap();
            let total = version.total_codewords();
            for level in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
                let ecb = version.ec_blocks(level);
                let sum: usize = ecb
                    .blocks()
                    .iter()
                    .map(|b| b.count * (b.data_codewords + ecb.ec_codewords_per_block))
                    .sum();
                assert_eq!(sum, total, "version {num} level {level}");
            }
        }
    }

    #[test]
    fn test_alignment_centers() {
        assert!(Version::new(1).unwrap().alignment_pattern_centers().is_empty());
        assert_eq!(Version::new(7).unwrap().alignment_pattern_centers(), &[6, 22, 38]);
        assert_eq!(
            Version::new(40).unwrap().alignment_pattern_centers(),
            &[6, 30, 58, 86, 114, 142, 170]
        );
    }
}
