use crate::common::ec::galois::{FieldPolynomial, GaloisField256};

// Reed-Solomon encoder
//------------------------------------------------------------------------------

/// Systematic Reed-Solomon encoder over one field. Generator polynomials are
/// cached monotonically: generator(d) = generator(d-1) * (x - a^(d-1+base)),
/// and the cache is never invalidated. Safe for sequential reuse across
/// blocks; not meant for unsynchronized sharing.
pub struct ReedSolomonEncoder<'f> {
    field: &'f GaloisField256,
    generators: Vec<FieldPolynomial<'f>>,
}

impl<'f> ReedSolomonEncoder<'f> {
    pub fn new(field: &'f GaloisField256) -> Self {
        Self { field, generators: vec![FieldPolynomial::one(field)] }
    }

    fn generator(&mut self, degree: usize) -> &FieldPolynomial<'f> {
        let count = self.generators.len();
        if degree >= count {
            for d in count..=degree {
                let factor = FieldPolynomial::new(
                    self.field,
                    &[1, self.field.exp((d - 1) as u8 + self.field.generator_base())],
                );
                let next = self.generators[d - 1].multiply(&factor);
                self.generators.push(next);
            }
        }
        &self.generators[degree]
    }

    /// Computes `ec_count` parity codewords over the leading data codewords
    /// and writes them into the trailing `ec_count` slots of `codewords`.
    pub fn encode(&mut self, codewords: &mut [u8], ec_count: usize) {
        assert!(ec_count > 0, "No error correction bytes");
        assert!(codewords.len() > ec_count, "No data bytes provided");
        let data_len = codewords.len() - ec_count;

        let generator = self.generator(ec_count).clone();
        let info = FieldPolynomial::new(self.field, &codewords[..data_len]);
        let info = info.multiply_by_monomial(ec_count, 1);
        let (_, remainder) = info.divide(&generator);

        // Left-pad with zeros for the high-order coefficients the remainder
        // dropped during normalization
        let coefficients = remainder.coefficients();
        let num_zeros = ec_count - coefficients.len();
        let ec_slots = &mut codewords[data_len..];
        ec_slots[..num_zeros].fill(0);
        ec_slots[num_zeros..].copy_from_slice(coefficients);
    }
}
