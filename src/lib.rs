//! # enqr
//!
//! A Rust library for encoding QR codes per ISO/IEC 18004, with Reed-Solomon
//! error correction over GF(256).
//!
//! ## Features
//!
//! - **Mode Selection**: Automatic Numeric, Alphanumeric, Byte and Kanji segment modes
//! - **Reed-Solomon Error Correction**: Configurable levels (L, M, Q, H)
//! - **Charsets and ECI**: Content transcoding with Extended Channel Interpretation headers
//! - **Mask Scoring**: Exhaustive evaluation of all 8 data masks by penalty score
//!
//! ## Quick Start
//!
//! ```rust
//! use enqr::encode;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Simplest usage - all settings are automatically chosen
//! let symbol = encode("Hello, World!")?;
//! print!("{symbol}");
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use enqr::{Charset, ECLevel, MaskPattern, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let symbol = QRBuilder::new("Hello, World!")
//!     .version(Version::new(2)?)       // QR version (size) - if not provided, finds the smallest fit
//!     .ec_level(ECLevel::M)            // Error correction level - defaults to ECLevel::L
//!     .charset(Charset::Utf8)          // Charset hint - enables an ECI header for byte mode
//!     .mask(MaskPattern::new(3)?)      // Mask pattern - if not provided, finds the best by penalty score
//!     .build()?;
//!
//! assert_eq!(*symbol.version(), 2);
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod encoder;

pub use common::charset::Charset;
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Mode, Version};
pub use encoder::{encode, QRBuilder, Symbol};
