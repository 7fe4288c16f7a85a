// Galois field
//------------------------------------------------------------------------------

/// GF(256) with exp/log tables built at compile time. The polynomial x (i.e.
/// 2) is a primitive element, so the exp table is filled by repeated doubling
/// with reduction by the primitive polynomial.
pub struct GaloisField256 {
    exp_table: [u8; 256],
    log_table: [u8; 256],
    generator_base: u8,
}

pub const SIZE: usize = 256;

/// The field used by QR symbols: x^8 + x^4 + x^3 + x^2 + 1, generator base 0.
pub static QR_CODE_FIELD: GaloisField256 = GaloisField256::new(0b1_0001_1101, 0);

impl GaloisField256 {
    pub const fn new(primitive: u16, generator_base: u8) -> Self {
        let mut exp_table = [0u8; SIZE];
        let mut log_table = [0u8; SIZE];

        let mut x: u16 = 1;
        let mut i = 0;
        while i < SIZE {
            exp_table[i] = x as u8;
            x *= 2;
            if x >= SIZE as u16 {
                x ^= primitive;
                x &= (SIZE - 1) as u16;
            }
            i += 1;
        }
        // log_table[0] stays 0 and is never consulted
        i = 0;
        while i < SIZE - 1 {
            log_table[exp_table[i] as usize] = i as u8;
            i += 1;
        }

        Self { exp_table, log_table, generator_base }
    }

    pub fn generator_base(&self) -> u8 {
        self.generator_base
    }

    pub fn exp(&self, a: u8) -> u8 {
        self.exp_table[a as usize]
    }

    pub fn log(&self, a: u8) -> u8 {
        assert!(a != 0, "Cannot perform log on 0 value");
        self.log_table[a as usize]
    }

    pub fn inverse(&self, a: u8) -> u8 {
        assert!(a != 0, "Cannot find inverse of 0 value");
        self.exp_table[SIZE - 1 - self.log_table[a as usize] as usize]
    }

    pub fn multiply(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log_sum = self.log_table[a as usize] as usize + self.log_table[b as usize] as usize;
        self.exp_table[log_sum % (SIZE - 1)]
    }
}

// Field polynomial
//------------------------------------------------------------------------------

/// Immutable polynomial over a GF(256). Coefficients are stored highest
/// degree first; the zero polynomial is the single coefficient `[0]`. All
/// binary operations require both operands to carry the *same* field handle.
#[derive(Clone)]
pub struct FieldPolynomial<'f> {
    field: &'f GaloisField256,
    coefficients: Vec<u8>,
}

impl<'f> FieldPolynomial<'f> {
    pub fn new(field: &'f GaloisField256, coefficients: &[u8]) -> Self {
        assert!(!coefficients.is_empty(), "Coefficients array is empty");
        let first_non_zero = coefficients.iter().position(|&c| c != 0);
        let coefficients = match first_non_zero {
            Some(i) => coefficients[i..].to_vec(),
            None => vec![0],
        };
        Self { field, coefficients }
    }

    pub fn zero(field: &'f GaloisField256) -> Self {
        Self { field, coefficients: vec![0] }
    }

    pub fn one(field: &'f GaloisField256) -> Self {
        Self { field, coefficients: vec![1] }
    }

    pub fn monomial(field: &'f GaloisField256, degree: usize, coefficient: u8) -> Self {
        if coefficient == 0 {
            return Self::zero(field);
        }
        let mut coefficients = vec![0; degree + 1];
        coefficients[0] = coefficient;
        Self { field, coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients[0] == 0
    }

    pub fn coefficient(&self, degree: usize) -> u8 {
        self.coefficients[self.coefficients.len() - 1 - degree]
    }

    pub fn coefficients(&self) -> &[u8] {
        &self.coefficients
    }

    fn assert_same_field(&self, other: &Self) {
        debug_assert!(
            std::ptr::eq(self.field, other.field),
            "Polynomials do not share the same field"
        );
    }

    pub fn evaluate_at(&self, a: u8) -> u8 {
        if a == 0 {
            return self.coefficient(0);
        }
        if a == 1 {
            return self.coefficients.iter().fold(0, |acc, &c| acc ^ c);
        }
        let mut result = self.coefficients[0];
        for &c in &self.coefficients[1..] {
            result = self.field.multiply(a, result) ^ c;
        }
        result
    }

    pub fn add(&self, other: &Self) -> Self {
        self.assert_same_field(other);
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }

        let (smaller, larger) = if self.coefficients.len() <= other.coefficients.len() {
            (&self.coefficients, &other.coefficients)
        } else {
            (&other.coefficients, &self.coefficients)
        };
        let diff = larger.len() - smaller.len();
        let mut sum = larger.clone();
        for (i, &c) in smaller.iter().enumerate() {
            sum[diff + i] ^= c;
        }
        Self::new(self.field, &sum)
    }

    pub fn multiply(&self, other: &Self) -> Self {
        self.assert_same_field(other);
        if self.is_zero() || other.is_zero() {
            return Self::zero(self.field);
        }
        let a = &self.coefficients;
        let b = &other.coefficients;
        let mut product = vec![0u8; a.len() + b.len() - 1];
        for (i, &ac) in a.iter().enumerate() {
            for (j, &bc) in b.iter().enumerate() {
                product[i + j] ^= self.field.multiply(ac, bc);
            }
        }
        Self::new(self.field, &product)
    }

    pub fn multiply_scalar(&self, scalar: u8) -> Self {
        if scalar == 0 {
            return Self::zero(self.field);
        }
        if scalar == 1 {
            return self.clone();
        }
        let product: Vec<u8> =
            self.coefficients.iter().map(|&c| self.field.multiply(c, scalar)).collect();
        Self { field: self.field, coefficients: product }
    }

    pub fn multiply_by_monomial(&self, degree: usize, coefficient: u8) -> Self {
        if coefficient == 0 {
            return Self::zero(self.field);
        }
        let mut product = vec![0u8; self.coefficients.len() + degree];
        for (i, &c) in self.coefficients.iter().enumerate() {
            product[i] = self.field.multiply(c, coefficient);
        }
        Self::new(self.field, &product)
    }

    /// Euclidean long division, returning (quotient, remainder).
    pub fn divide(&self, other: &Self) -> (Self, Self) {
        self.assert_same_field(other);
        assert!(!other.is_zero(), "Division by the zero polynomial");

        let mut quotient = Self::zero(self.field);
        let mut remainder = self.clone();

        let denominator_leading = other.coefficient(other.degree());
        let inverse_leading = self.field.inverse(denominator_leading);

        while remainder.degree() >= other.degree() && !remainder.is_zero() {
            let degree_diff = remainder.degree() - other.degree();
            let scale =
                self.field.multiply(remainder.coefficient(remainder.degree()), inverse_leading);
            let term = other.multiply_by_monomial(degree_diff, scale);
            let iteration_quotient = Self::monomial(self.field, degree_diff, scale);
            quotient = quotient.add(&iteration_quotient);
            remainder = remainder.add(&term);
        }

        (quotient, remainder)
    }
}

impl std::fmt::Debug for FieldPolynomial<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FieldPolynomial").field("coefficients", &self.coefficients).finish()
    }
}

#[cfg(test)]
mod galois_tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::{FieldPolynomial, QR_CODE_FIELD};

    #[test]
    fn test_exp_log() {
        assert_eq!(QR_CODE_FIELD.exp(0), 1);
        assert_eq!(QR_CODE_FIELD.exp(1), 2);
        assert_eq!(QR_CODE_FIELD.exp(7), 128);
        // 2^8 reduces by the primitive polynomial
        assert_eq!(QR_CODE_FIELD.exp(8), 0b0001_1101);
        assert_eq!(QR_CODE_FIELD.log(2), 1);
        assert_eq!(QR_CODE_FIELD.log(128), 7);
    }

    #[test]
    #[should_panic]
    fn test_log_of_zero() {
        QR_CODE_FIELD.log(0);
    }

    #[test_case(0, 5, 0)]
    #[test_case(5, 0, 0)]
    #[test_case(1, 37, 37)]
    #[test_case(2, 2, 4)]
    #[test_case(16, 128, 232)] // 2^4 * 2^7 = 2^11
    fn test_multiply(a: u8, b: u8, expected: u8) {
        assert_eq!(QR_CODE_FIELD.multiply(a, b), expected);
    }

    #[test]
    fn test_normalization() {
        let p = FieldPolynomial::new(&QR_CODE_FIELD, &[0, 0, 3, 7]);
        assert_eq!(p.coefficients(), &[3, 7]);
        assert_eq!(p.degree(), 1);
        let z = FieldPolynomial::new(&QR_CODE_FIELD, &[0, 0, 0]);
        assert!(z.is_zero());
        assert_eq!(z.coefficients(), &[0]);
    }

    #[test]
    fn test_evaluate_at() {
        // x^2 + 3x + 5
        let p = FieldPolynomial::new(&QR_CODE_FIELD, &[1, 3, 5]);
        assert_eq!(p.evaluate_at(0), 5);
        assert_eq!(p.evaluate_at(1), 1 ^ 3 ^ 5);
        let expected = QR_CODE_FIELD.multiply(2, 2) ^ QR_CODE_FIELD.multiply(3, 2) ^ 5;
        assert_eq!(p.evaluate_at(2), expected);
    }

    #[test]
    fn test_add() {
        let a = FieldPolynomial::new(&QR_CODE_FIELD, &[1, 0, 5]);
        let b = FieldPolynomial::new(&QR_CODE_FIELD, &[3, 7]);
        assert_eq!(a.add(&b).coefficients(), &[1, 3, 2]);
        let z = FieldPolynomial::zero(&QR_CODE_FIELD);
        assert_eq!(a.add(&z).coefficients(), a.coefficients());
    }

    #[test]
    fn test_multiply_by_monomial() {
        let p = FieldPolynomial::new(&QR_CODE_FIELD, &[2, 1]);
        let shifted = p.multiply_by_monomial(3, 1);
        assert_eq!(shifted.coefficients(), &[2, 1, 0, 0, 0]);
        assert!(p.multiply_by_monomial(3, 0).is_zero());
    }

    #[test]
    #[should_panic]
    fn test_divide_by_zero() {
        let p = FieldPolynomial::new(&QR_CODE_FIELD, &[1, 2, 3]);
        let z = FieldPolynomial::zero(&QR_CODE_FIELD);
        p.divide(&z);
    }

    proptest! {
        #[test]
        fn prop_inverse(a in 1u8..=255) {
            let inv = QR_CODE_FIELD.inverse(a);
            prop_assert_eq!(QR_CODE_FIELD.multiply(a, inv), 1);
        }

        // q * d + r == n
        #[test]
        fn prop_divide_round_trip(
            n in proptest::collection::vec(any::<u8>(), 1..20),
            d in proptest::collection::vec(any::<u8>(), 1..10),
        ) {
            let numerator = FieldPolynomial::new(&QR_CODE_FIELD, &n);
            let denominator = FieldPolynomial::new(&QR_CODE_FIELD, &d);
            prop_assume!(!denominator.is_zero());
            let (q, r) = numerator.divide(&denominator);
            let recombined = q.multiply(&denominator).add(&r);
            prop_assert_eq!(recombined.coefficients(), numerator.coefficients());
        }
    }
}
