use std::fmt::{Debug, Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    EmptyData,
    DataTooLong,
    CapacityOverflow,
    InvalidVersion,
    InvalidECLevel,
    InvalidMode,
    InvalidChar,
    InvalidMaskingPattern,
    InvalidCharacterSet,
    KanjiNotEvenBytes,
    InvalidKanjiSequence,
    CompactionUnsupported,
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            Self::EmptyData => "Empty data",
            Self::DataTooLong => "Data too long",
            Self::CapacityOverflow => "Data too big for requested version",
            Self::InvalidVersion => "Invalid version",
            Self::InvalidECLevel => "Invalid error correction level",
            Self::InvalidMode => "Invalid mode",
            Self::InvalidChar => "Invalid character",
            Self::InvalidMaskingPattern => "Invalid masking pattern",
            Self::InvalidCharacterSet => "Unknown character set",
            Self::KanjiNotEvenBytes => "Kanji byte size not even",
            Self::InvalidKanjiSequence => "Invalid kanji byte sequence",
            Self::CompactionUnsupported => "Compaction is not implemented",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for QRError {}

pub type QRResult<T> = Result<T, QRError>;
