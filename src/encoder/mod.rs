pub mod matrix;

use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::common::bits::BitSequence;
use crate::common::charset::Charset;
use crate::common::codec::{
    choose_mode, interleave_with_ec, push_eci, push_length_info, push_mode_info, push_segment,
    terminate_bits, DEFAULT_BYTE_MODE_ENCODING,
};
use crate::common::error::{QRError, QRResult};
use crate::common::grid::{Module, SymbolGrid};
use crate::common::mask::{choose_best_pattern, MaskPattern};
use crate::common::metadata::{ECLevel, Mode, Version};

// Symbol
//------------------------------------------------------------------------------

/// A finished QR symbol. Constructed in one shot once mode, version, mask and
/// grid are all known; immutable afterwards.
#[derive(Debug, Clone)]
pub struct Symbol {
    mode: Mode,
    ec_level: ECLevel,
    version: Version,
    mask_pattern: MaskPattern,
    grid: SymbolGrid,
}

impl Symbol {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ec_level
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn mask_pattern(&self) -> MaskPattern {
        self.mask_pattern
    }

    pub fn grid(&self) -> &SymbolGrid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn get(&self, x: usize, y: usize) -> Module {
        self.grid.get(x, y)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "<<")?;
        writeln!(f, " mode: {}", self.mode)?;
        writeln!(f, " ecLevel: {}", self.ec_level)?;
        writeln!(f, " version: {}", self.version)?;
        writeln!(f, " maskPattern: {}", *self.mask_pattern)?;
        writeln!(f, " matrix:")?;
        write!(f, "{}", self.grid)?;
        writeln!(f, ">>")
    }
}

// Builder
//------------------------------------------------------------------------------

/// Builder over text or byte content. Raw bytes are decoded as UTF-8 before
/// encoding, matching the charset-first pipeline: segment payloads are always
/// produced by transcoding text.
pub struct QRBuilder<'a> {
    data: Cow<'a, str>,
    ec_level: ECLevel,
    charset: Option<Charset>,
    // Transcoding used when no hint is given. Byte input keeps UTF-8 so the
    // payload bytes round-trip through the text pipeline.
    default_encoding: Charset,
    version: Option<Version>,
    mask: Option<MaskPattern>,
    gs1: bool,
    compact: bool,
}

impl<'a> QRBuilder<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            data: Cow::Borrowed(content),
            ec_level: ECLevel::L,
            charset: None,
            default_encoding: DEFAULT_BYTE_MODE_ENCODING,
            version: None,
            mask: None,
            gs1: false,
            compact: false,
        }
    }

    pub fn from_bytes(content: &[u8]) -> QRBuilder<'static> {
        QRBuilder {
            data: Cow::Owned(String::from_utf8_lossy(content).into_owned()),
            ec_level: ECLevel::L,
            charset: None,
            default_encoding: Charset::Utf8,
            version: None,
            mask: None,
            gs1: false,
            compact: false,
        }
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    /// Charset hint. Enables an ECI header for byte mode and makes Kanji mode
    /// eligible under Shift-JIS.
    pub fn charset(&mut self, charset: Charset) -> &mut Self {
        self.charset = Some(charset);
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    /// Marks the stream as GS1 formatted with a leading FNC1 tag.
    pub fn gs1(&mut self, gs1: bool) -> &mut Self {
        self.gs1 = gs1;
        self
    }

    pub fn compact(&mut self, compact: bool) -> &mut Self {
        self.compact = compact;
        self
    }
}

impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<Symbol> {
        if self.data.is_empty() {
            return Err(QRError::EmptyData);
        }
        if self.compact {
            return Err(QRError::CompactionUnsupported);
        }

        let encoding = self.charset.unwrap_or(self.default_encoding);
        let mode = choose_mode(&self.data, self.charset);

        let mut header_bits = BitSequence::new();
        if mode == Mode::Byte && self.charset.is_some() {
            if let Some(designator) = encoding.eci() {
                push_eci(designator, &mut header_bits);
            }
        }
        if self.gs1 {
            push_mode_info(Mode::Fnc1First, &mut header_bits);
        }
        push_mode_info(mode, &mut header_bits);

        let mut data_bits = BitSequence::new();
        push_segment(&self.data, mode, &mut data_bits, encoding)?;

        let version = match self.version {
            Some(version) => {
                let bits_needed = bits_needed(mode, &header_bits, &data_bits, version);
                if !will_fit(bits_needed, version, self.ec_level) {
                    return Err(QRError::CapacityOverflow);
                }
                version
            }
            None => recommend_version(self.ec_level, mode, &header_bits, &data_bits)?,
        };

        let mut bits = BitSequence::new();
        bits.extend(&header_bits);
        let num_letters =
            if mode == Mode::Byte { data_bits.byte_len() } else { self.data.chars().count() };
        push_length_info(num_letters, version, mode, &mut bits)?;
        bits.extend(&data_bits);

        let ec_blocks = version.ec_blocks(self.ec_level);
        let num_data_bytes = version.total_codewords() - ec_blocks.total_ec_codewords();
        terminate_bits(num_data_bytes, &mut bits)?;

        let final_bits = interleave_with_ec(
            &bits,
            version.total_codewords(),
            num_data_bytes,
            ec_blocks.num_blocks(),
        );

        let width = version.width();
        let build_grid = |pattern: MaskPattern| {
            let mut grid = SymbolGrid::new(width, width);
            matrix::build(&final_bits, self.ec_level, version, pattern, &mut grid);
            grid
        };

        let mask_pattern = match self.mask {
            Some(pattern) => pattern,
            None => choose_best_pattern(&build_grid),
        };

        Ok(Symbol {
            mode,
            ec_level: self.ec_level,
            version,
            mask_pattern,
            grid: build_grid(mask_pattern),
        })
    }
}

/// Encodes content with all defaults: EC level L, automatic version and mask.
pub fn encode(content: &str) -> QRResult<Symbol> {
    QRBuilder::new(content).build()
}

// Version resolution
//------------------------------------------------------------------------------

fn bits_needed(
    mode: Mode,
    header_bits: &BitSequence,
    data_bits: &BitSequence,
    version: Version,
) -> usize {
    header_bits.len() + mode.char_count_bits(version) + data_bits.len()
}

fn will_fit(num_input_bits: usize, version: Version, ec_level: ECLevel) -> bool {
    version.data_codewords(ec_level) >= (num_input_bits + 7) >> 3
}

fn choose_version(num_input_bits: usize, ec_level: ECLevel) -> QRResult<Version> {
    for number in 1..=40 {
        let version = Version::new(number)?;
        if will_fit(num_input_bits, version, ec_level) {
            return Ok(version);
        }
    }
    Err(QRError::DataTooLong)
}

// The char count width grows with the version, so a version picked against
// the smallest width gets validated once more at its own width
fn recommend_version(
    ec_level: ECLevel,
    mode: Mode,
    header_bits: &BitSequence,
    data_bits: &BitSequence,
) -> QRResult<Version> {
    let provisional = Version::new(1)?;
    let provisional_bits = bits_needed(mode, header_bits, data_bits, provisional);
    let provisional_version = choose_version(provisional_bits, ec_level)?;
    let bits = bits_needed(mode, header_bits, data_bits, provisional_version);
    choose_version(bits, ec_level)
}

#[cfg(test)]
mod builder_tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_empty_data() {
        assert!(matches!(encode(""), Err(QRError::EmptyData)));
    }

    #[test]
    fn test_compaction_unsupported() {
        let result = QRBuilder::new("hello").compact(true).build();
        assert!(matches!(result, Err(QRError::CompactionUnsupported)));
    }

    #[test]
    fn test_defaults() {
        let symbol = encode("hello").unwrap();
        assert_eq!(symbol.mode(), Mode::Byte);
        assert_eq!(symbol.ec_level(), ECLevel::L);
        assert_eq!(*symbol.version(), 1);
        assert_eq!(symbol.width(), 21);
    }

    #[test]
    fn test_pinned_version_is_kept() {
        let version = Version::new(7).unwrap();
        let symbol = QRBuilder::new("ABCDEF").version(version).build().unwrap();
        assert_eq!(symbol.version(), version);
        assert_eq!(symbol.width(), 45);
    }

    #[test]
    fn test_pinned_version_too_small() {
        let version = Version::new(1).unwrap();
        let content = "0".repeat(200);
        let result = QRBuilder::new(&content).version(version).build();
        assert!(matches!(result, Err(QRError::CapacityOverflow)));
    }

    #[test]
    fn test_data_too_long() {
        // 8000 digits exceed even version 40 at L
        let content = "9".repeat(8000);
        assert!(matches!(encode(&content), Err(QRError::DataTooLong)));
    }

    #[test]
    fn test_numeric_regression_3518_digits() {
        let content = "0".repeat(3518);
        let symbol = QRBuilder::new(&content).build().unwrap();
        assert_eq!(symbol.mode(), Mode::Numeric);
    }

    #[test]
    fn test_pinned_mask_is_kept() {
        let mask = MaskPattern::new(5).unwrap();
        let symbol = QRBuilder::new("MASKED").mask(mask).build().unwrap();
        assert_eq!(symbol.mask_pattern(), mask);
    }

    #[test]
    fn test_bytes_input_keeps_utf8_payload() {
        // U+65E5 U+672C truncated to Latin-1 would collapse to the two bytes
        // 0xE5 0x2C, colliding with this unrelated string
        let from_bytes =
            QRBuilder::from_bytes("\u{65e5}\u{672c}".as_bytes()).build().unwrap();
        let collision = QRBuilder::new("\u{e5},").build().unwrap();
        assert_eq!(from_bytes.mode(), Mode::Byte);
        assert_ne!(from_bytes.grid(), collision.grid());
    }

    #[test]
    fn test_bytes_input_emits_no_eci() {
        // Same bit stream with or without the text round trip when the
        // content is plain ASCII and no hint is given
        let from_bytes = QRBuilder::from_bytes(b"hello").build().unwrap();
        let from_text = QRBuilder::new("hello").build().unwrap();
        assert_eq!(from_bytes.grid(), from_text.grid());
    }

    #[test]
    fn test_bytes_input_decoded_as_utf8() {
        let symbol = QRBuilder::from_bytes("caf\u{e9}".as_bytes()).build().unwrap();
        assert_eq!(symbol.mode(), Mode::Byte);
    }

    #[test_case("0123456789", Mode::Numeric)]
    #[test_case("HELLO WORLD", Mode::Alphanumeric)]
    #[test_case("hello world", Mode::Byte)]
    fn test_mode_selection_end_to_end(content: &str, mode: Mode) {
        assert_eq!(encode(content).unwrap().mode(), mode);
    }

    #[test]
    fn test_kanji_requires_hint() {
        let content = "\u{65e5}\u{672c}";
        assert_eq!(encode(content).unwrap().mode(), Mode::Byte);
        let symbol = QRBuilder::new(content).charset(Charset::ShiftJis).build().unwrap();
        assert_eq!(symbol.mode(), Mode::Kanji);
    }

    #[test]
    fn test_gs1_header_consumes_capacity() {
        // 41 digits need 151 bits of the 152 available at version 1 L, so the
        // 4-bit FNC1 tag tips the payload into version 2
        let content = "1".repeat(41);
        let plain = QRBuilder::new(&content).build().unwrap();
        let gs1 = QRBuilder::new(&content).gs1(true).build().unwrap();
        assert_eq!(*plain.version(), 1);
        assert_eq!(*gs1.version(), 2);
    }

    #[test]
    fn test_determinism() {
        let a = encode("http://www.google.com/").unwrap();
        let b = encode("http://www.google.com/").unwrap();
        assert_eq!(a.mask_pattern(), b.mask_pattern());
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_google_url_at_m() {
        let mut builder = QRBuilder::new("http://www.google.com/");
        let symbol = builder.ec_level(ECLevel::M).build().unwrap();
        assert_eq!(symbol.mode(), Mode::Byte);
        assert_eq!(*symbol.version(), 2);
        assert_eq!(symbol.ec_level(), ECLevel::M);
    }
}
