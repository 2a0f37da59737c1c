//! Core in-memory types for zkey contents
//!
//! Field elements are always canonical (not Montgomery) here; Montgomery
//! form only exists on the wire.

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// A field element in canonical form, `0 <= x < modulus`.
pub type FieldElement = BigUint;

/// Element of the quadratic extension `Fq2 = c0 + c1 * u`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fq2 {
    pub c0: FieldElement,
    pub c1: FieldElement,
}

impl Fq2 {
    pub fn new(c0: FieldElement, c1: FieldElement) -> Self {
        Self { c0, c1 }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self {
            c0: BigUint::one(),
            c1: BigUint::zero(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }
}

/// G1 point as `(x, y, z)`.
///
/// `z == 0` marks the point at infinity; any other `z` is a finite affine
/// point `(x, y)`. Decoded points use `z == 1`, and infinity decodes to
/// `(0, 1, 0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct G1Affine {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
}

impl G1Affine {
    /// Finite point with the given affine coordinates
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        Self {
            x,
            y,
            z: BigUint::one(),
        }
    }

    /// The point at infinity
    pub fn infinity() -> Self {
        Self {
            x: BigUint::zero(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }
}

impl Default for G1Affine {
    fn default() -> Self {
        Self::infinity()
    }
}

/// G2 point over `Fq2`, same flag convention as [`G1Affine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct G2Affine {
    pub x: Fq2,
    pub y: Fq2,
    pub z: Fq2,
}

impl G2Affine {
    pub fn new(x: Fq2, y: Fq2) -> Self {
        Self { x, y, z: Fq2::one() }
    }

    pub fn infinity() -> Self {
        Self {
            x: Fq2::zero(),
            y: Fq2::one(),
            z: Fq2::zero(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }
}

impl Default for G2Affine {
    fn default() -> Self {
        Self::infinity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infinity_markers() {
        let g1 = G1Affine::infinity();
        assert!(g1.is_infinity());
        assert_eq!(g1.y, BigUint::one());

        let g2 = G2Affine::infinity();
        assert!(g2.is_infinity());
        assert_eq!(g2.y, Fq2::one());
    }

    #[test]
    fn test_finite_points() {
        let p = G1Affine::new(BigUint::from(1u32), BigUint::from(2u32));
        assert!(!p.is_infinity());

        // x = 0 alone does not make a point infinite, only z does
        let q = G1Affine::new(BigUint::zero(), BigUint::from(2u32));
        assert!(!q.is_infinity());

        let r = G2Affine::new(Fq2::zero(), Fq2::one());
        assert!(!r.is_infinity());
    }
}
