//! NIST P-256 (prime256v1 / secp256r1) domain parameters.

use crypto_bigint::modular::ConstMontyForm;
use crypto_bigint::subtle::{Choice, ConstantTimeEq, ConstantTimeLess};
use crypto_bigint::{NonZero, U256, Uint, impl_modulus};

impl_modulus!(
    FieldModulus,
    U256,
    "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff"
);

/// Element of the base field, kept in Montgomery form.
pub(crate) type FieldElement = ConstMontyForm<FieldModulus, { U256::LIMBS }>;

/// Byte length of a canonically encoded field element.
pub const FIELD_BYTES: usize = 32;

/// Short Weierstrass curve `y^2 = x^3 + ax + b` over a prime field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EllipticCurve {
    /// Field modulus.
    pub p: NonZero<U256>,
    pub a: U256,
    pub b: U256,
    /// Base point `G`, as affine `(x, y)`.
    pub g: (U256, U256),
    /// Order of `G`.
    pub n: NonZero<U256>,
    /// Cofactor.
    pub h: u8,
}

pub const PRIME256V1: EllipticCurve = EllipticCurve {
    p: NonZero::<Uint<_>>::new_unwrap(U256::from_be_hex(
        "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
    )),
    a: U256::from_be_hex("ffffffff00000001000000000000000000000000fffffffffffffffffffffffc"),
    b: U256::from_be_hex("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b"),
    g: (
        U256::from_be_hex("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"),
        U256::from_be_hex("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"),
    ),
    n: NonZero::<Uint<_>>::new_unwrap(U256::from_be_hex(
        "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
    )),
    h: 1,
};

pub(crate) const EQUATION_A: FieldElement = FieldElement::new(&PRIME256V1.a);
pub(crate) const EQUATION_B: FieldElement = FieldElement::new(&PRIME256V1.b);

/// `p - 2`, the exponent for inversion by Fermat's little theorem.
pub(crate) const P_MINUS_TWO: U256 =
    U256::from_be_hex("ffffffff00000001000000000000000000000000fffffffffffffffffffffffd");

impl EllipticCurve {
    /// Returns whether `x` and `y` are both below `p`.
    pub(crate) fn is_reduced(&self, x: &U256, y: &U256) -> Choice {
        x.ct_lt(&self.p) & y.ct_lt(&self.p)
    }

    /// Returns whether the affine point `(x, y)` satisfies the curve equation.
    ///
    /// Unreduced coordinates are rejected rather than silently reduced mod `p`.
    pub fn contains(&self, x: &U256, y: &U256) -> bool {
        let reduced = self.is_reduced(x, y);
        // y^2 = x^3 + ax + b
        let fx = FieldElement::new(x);
        let fy = FieldElement::new(y);
        let lhs = fy * fy;
        let rhs = fx * fx * fx + EQUATION_A * fx + EQUATION_B;
        (reduced & lhs.ct_eq(&rhs)).into()
    }

    /// Returns whether `d` is a valid nonzero scalar below the group order.
    pub(crate) fn is_valid_scalar(&self, d: &U256) -> Choice {
        !d.ct_eq(&U256::ZERO) & d.ct_lt(&self.n)
    }
}
