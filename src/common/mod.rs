pub mod bits;
pub mod charset;
pub mod codec;
pub mod ec;
pub mod error;
pub mod grid;
pub mod mask;
pub mod metadata;
