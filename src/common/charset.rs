use encoding_rs::{EUC_JP, GBK, SHIFT_JIS};

use crate::common::error::{QRError, QRResult};

// Character set
//------------------------------------------------------------------------------

/// Supported byte-mode character sets. Transcoding of the multi-byte sets is
/// backed by encoding_rs; ISO-8859-1 is handled by direct code-point
/// truncation because encoding_rs resolves that label to windows-1252.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Iso8859_1,
    UsAscii,
    ShiftJis,
    Utf16Be,
    Utf16Le,
    Gb2312,
    EucJp,
}

impl Charset {
    const ALL: [Charset; 8] = [
        Charset::Utf8,
        Charset::Iso8859_1,
        Charset::UsAscii,
        Charset::ShiftJis,
        Charset::Utf16Be,
        Charset::Utf16Le,
        Charset::Gb2312,
        Charset::EucJp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF_8",
            Charset::Iso8859_1 => "ISO_8859_1",
            Charset::UsAscii => "US_ASCII",
            Charset::ShiftJis => "SHIFT_JIS",
            Charset::Utf16Be => "UTF_16BE",
            Charset::Utf16Le => "UTF_16LE",
            Charset::Gb2312 => "GB2312",
            Charset::EucJp => "EUC_JP",
        }
    }

    /// Resolves a charset from its name, tolerating case and the usual
    /// separator spellings ("utf-8", "Shift JIS", "iso8859_1", ...).
    pub fn for_name(name: &str) -> QRResult<Charset> {
        let upper = name.to_uppercase();
        // Separators folded to underscores, and removed outright
        let folded: String =
            upper.chars().map(|c| if matches!(c, '-' | ' ' | '.') { '_' } else { c }).collect();
        let stripped: String = folded.chars().filter(|c| *c != '_').collect();

        for cs in Self::ALL {
            let canon = cs.name();
            if folded == canon || stripped == canon.replace('_', "") {
                return Ok(cs);
            }
        }
        Err(QRError::InvalidCharacterSet)
    }

    /// ECI designator announced ahead of a byte-mode segment, where one is
    /// assigned. UTF-16LE and EUC-JP carry none here.
    pub fn eci(self) -> Option<u8> {
        match self {
            Charset::Iso8859_1 => Some(1),
            Charset::ShiftJis => Some(20),
            Charset::Utf16Be => Some(25),
            Charset::Utf8 => Some(26),
            Charset::UsAscii => Some(27),
            Charset::Gb2312 => Some(29),
            _ => None,
        }
    }

    pub fn encode(self, s: &str) -> QRResult<Vec<u8>> {
        match self {
            Charset::Utf8 => Ok(s.as_bytes().to_vec()),
            Charset::Iso8859_1 => Ok(s.chars().map(|c| c as u32 as u8).collect()),
            Charset::UsAscii => {
                if !s.is_ascii() {
                    return Err(QRError::InvalidChar);
                }
                Ok(s.as_bytes().to_vec())
            }
            Charset::Utf16Be => {
                Ok(s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect())
            }
            Charset::Utf16Le => {
                Ok(s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect())
            }
            Charset::ShiftJis | Charset::Gb2312 | Charset::EucJp => {
                let encoding = match self {
                    Charset::ShiftJis => SHIFT_JIS,
                    Charset::Gb2312 => GBK,
                    _ => EUC_JP,
                };
                let (out, _, had_errors) = encoding.encode(s);
                if had_errors {
                    return Err(QRError::InvalidChar);
                }
                Ok(out.into_owned())
            }
        }
    }

    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
            Charset::UsAscii => bytes.iter().map(|&b| (b & 0x7F) as char).collect(),
            Charset::Utf16Be => {
                let units: Vec<u16> =
                    bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
                String::from_utf16_lossy(&units)
            }
            Charset::Utf16Le => {
                let units: Vec<u16> =
                    bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
                String::from_utf16_lossy(&units)
            }
            Charset::ShiftJis | Charset::Gb2312 | Charset::EucJp => {
                let encoding = match self {
                    Charset::ShiftJis => SHIFT_JIS,
                    Charset::Gb2312 => GBK,
                    _ => EUC_JP,
                };
                let (out, _, _) = encoding.decode(bytes);
                out.into_owned()
            }
        }
    }
}
