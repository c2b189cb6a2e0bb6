//! Projective point arithmetic on P-256.
//!
//! Addition and doubling use the complete formulas of [Renes-Costello-Batina 2015]
//! specialised to `a = -3`, so no input (the identity included) takes a
//! different code path. Scalar multiplication is a Montgomery ladder over
//! every bit of the scalar.
//!
//! [Renes-Costello-Batina 2015]: https://eprint.iacr.org/2015/1060

use crate::curve::{EQUATION_B, FIELD_BYTES, FieldElement, P_MINUS_TWO, PRIME256V1};
use crypto_bigint::subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use crypto_bigint::{Encoding, U256};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ProjectivePoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl ProjectivePoint {
    /// The point at infinity, `(0 : 1 : 0)`.
    pub(crate) const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Lifts affine coordinates. The caller is responsible for checking that
    /// `(x, y)` is on the curve.
    pub(crate) fn from_affine(x: &U256, y: &U256) -> Self {
        Self {
            x: FieldElement::new(x),
            y: FieldElement::new(y),
            z: FieldElement::ONE,
        }
    }

    pub(crate) fn generator() -> Self {
        let (gx, gy) = PRIME256V1.g;
        Self::from_affine(&gx, &gy)
    }

    pub(crate) fn is_identity(&self) -> Choice {
        self.z.ct_eq(&FieldElement::ZERO)
    }

    /// Complete addition, Algorithm 4.
    pub(crate) fn add(&self, rhs: &Self) -> Self {
        let b = EQUATION_B;

        let xx = self.x * rhs.x; // 1
        let yy = self.y * rhs.y; // 2
        let zz = self.z * rhs.z; // 3
        let xy_pairs = ((self.x + self.y) * (rhs.x + rhs.y)) - (xx + yy); // 4-8
        let yz_pairs = ((self.y + self.z) * (rhs.y + rhs.z)) - (yy + zz); // 9-13
        let xz_pairs = ((self.x + self.z) * (rhs.x + rhs.z)) - (xx + zz); // 14-18

        let bzz_part = xz_pairs - (b * zz); // 19, 20
        let bzz3_part = bzz_part + bzz_part + bzz_part; // 21, 22
        let yy_m_bzz3 = yy - bzz3_part; // 23
        let yy_p_bzz3 = yy + bzz3_part; // 24

        let zz3 = zz + zz + zz; // 26, 27
        let bxz_part = (b * xz_pairs) - (zz3 + xx); // 25, 28, 29
        let bxz3_part = bxz_part + bxz_part + bxz_part; // 30, 31
        let xx3_m_zz3 = xx + xx + xx - zz3; // 32-34

        Self {
            x: (yy_p_bzz3 * xy_pairs) - (yz_pairs * bxz3_part), // 35, 39, 40
            y: (yy_p_bzz3 * yy_m_bzz3) + (xx3_m_zz3 * bxz3_part), // 36-38
            z: (yy_m_bzz3 * yz_pairs) + (xy_pairs * xx3_m_zz3), // 41-43
        }
    }

    /// Exception-free doubling, Algorithm 6.
    pub(crate) fn double(&self) -> Self {
        let b = EQUATION_B;

        let xx = self.x * self.x; // 1
        let yy = self.y * self.y; // 2
        let zz = self.z * self.z; // 3
        let xy = self.x * self.y;
        let xy2 = xy + xy; // 4, 5
        let xz = self.x * self.z;
        let xz2 = xz + xz; // 6, 7

        let bzz_part = (b * zz) - xz2; // 8, 9
        let bzz3_part = bzz_part + bzz_part + bzz_part; // 10, 11
        let yy_m_bzz3 = yy - bzz3_part; // 12
        let yy_p_bzz3 = yy + bzz3_part; // 13
        let y_frag = yy_p_bzz3 * yy_m_bzz3; // 14
        let x_frag = yy_m_bzz3 * xy2; // 15

        let zz3 = zz + zz + zz; // 16, 17
        let bxz2_part = (b * xz2) - (zz3 + xx); // 18-20
        let bxz6_part = bxz2_part + bxz2_part + bxz2_part; // 21, 22
        let xx3_m_zz3 = xx + xx + xx - zz3; // 23-25

        let y = y_frag + (xx3_m_zz3 * bxz6_part); // 26, 27
        let yz = self.y * self.z;
        let yz2 = yz + yz; // 28, 29
        let x = x_frag - (bxz6_part * yz2); // 30, 31
        let yz2_yy = yz2 * yy;
        let yz4_yy = yz2_yy + yz2_yy;
        let z = yz4_yy + yz4_yy; // 32-34

        Self { x, y, z }
    }

    /// Computes `scalar * self` with a Montgomery ladder.
    ///
    /// Every one of the 256 bit positions costs one addition, one doubling
    /// and two conditional swaps, whatever the value of the bit.
    pub(crate) fn mul(&self, scalar: &U256) -> Self {
        let bytes = scalar.to_be_bytes();
        let mut r0 = Self::IDENTITY;
        let mut r1 = *self;

        for i in (0..FIELD_BYTES * 8).rev() {
            let bit = Choice::from((bytes[FIELD_BYTES - 1 - i / 8] >> (i % 8)) & 1);
            Self::conditional_swap(&mut r0, &mut r1, bit);
            r1 = r0.add(&r1);
            r0 = r0.double();
            Self::conditional_swap(&mut r0, &mut r1, bit);
        }

        r0
    }

    /// Normalizes to affine `(x, y)`, or `None` for the point at infinity.
    pub(crate) fn to_affine(&self) -> Option<(U256, U256)> {
        if bool::from(self.is_identity()) {
            return None;
        }
        let z_inv = self.z.pow(&P_MINUS_TWO);
        Some(((self.x * z_inv).retrieve(), (self.y * z_inv).retrieve()))
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    /// Compares `(X1 : Y1 : Z1)` and `(X2 : Y2 : Z2)` by cross-multiplying
    /// with the other point's `Z`.
    fn ct_eq(&self, other: &Self) -> Choice {
        (self.x * other.z).ct_eq(&(other.x * self.z))
            & (self.y * other.z).ct_eq(&(other.y * self.z))
            & self.is_identity().ct_eq(&other.is_identity())
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}
