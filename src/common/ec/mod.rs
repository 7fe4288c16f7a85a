pub mod encoder;
pub mod galois;

pub use encoder::ReedSolomonEncoder;
pub use galois::{FieldPolynomial, GaloisField256, QR_CODE_FIELD};
