//! Groth16 proving key model
//!
//! A [`ProvingKey`] is either built by a caller and handed to the writer,
//! or produced in one pass by the reader. Field elements are canonical.

use num_bigint::BigUint;

use crate::constants::PROTOCOL_GROTH16;
use crate::errors::KeyError;
use crate::field::n8_for;
use crate::types::{FieldElement, G1Affine, G2Affine};

/// Proving system stored in section 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Groth16,
}

impl Protocol {
    pub fn tag(&self) -> u32 {
        match self {
            Protocol::Groth16 => PROTOCOL_GROTH16,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            PROTOCOL_GROTH16 => Some(Protocol::Groth16),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Groth16 => "groth16",
        }
    }
}

/// R1CS matrix a sparse coefficient belongs to. C is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Matrix {
    A = 0,
    B = 1,
}

impl Matrix {
    pub fn id(&self) -> u32 {
        *self as u32
    }
}

impl TryFrom<u32> for Matrix {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Matrix::A),
            1 => Ok(Matrix::B),
            other => Err(other),
        }
    }
}

/// Nonzero entry of the A or B matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coefficient {
    pub matrix: Matrix,
    pub constraint: u32,
    pub signal: u32,
    /// Scalar field element
    pub value: FieldElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvingKey {
    pub protocol: Protocol,
    /// Base field modulus
    pub q: BigUint,
    /// Scalar field modulus
    pub r: BigUint,
    /// Total number of circuit variables
    pub n_vars: u32,
    /// Public variables, not counting the constant-one signal
    pub n_public: u32,
    /// FFT domain size (power of two)
    pub domain_size: u32,

    pub alfa1: G1Affine,
    pub beta1: G1Affine,
    pub delta1: G1Affine,
    pub beta2: G2Affine,
    pub gamma2: G2Affine,
    pub delta2: G2Affine,

    /// Input commitments, `n_public + 1` entries
    pub ic: Vec<G1Affine>,
    /// Sparse A/B coefficients
    pub ccoefs: Vec<Coefficient>,
    pub a: Vec<G1Affine>,
    pub b1: Vec<G1Affine>,
    pub b2: Vec<G2Affine>,
    /// Infinity for every public index (`i <= n_public`)
    pub c: Vec<G1Affine>,
    /// Quotient polynomial basis, `domain_size` entries
    pub h_exps: Vec<G1Affine>,
}

impl ProvingKey {
    /// Byte width of base field elements
    pub fn n8q(&self) -> usize {
        n8_for(&self.q)
    }

    /// Byte width of scalar field elements
    pub fn n8r(&self) -> usize {
        n8_for(&self.r)
    }

    /// Check counts, lengths and ranges.
    ///
    /// The public C entries are not checked here; see
    /// [`check_public_c`](Self::check_public_c).
    pub fn validate_shape(&self) -> Result<(), KeyError> {
        if self.n_public >= self.n_vars {
            return Err(KeyError::PublicNotBelowVars {
                n_vars: self.n_vars,
                n_public: self.n_public,
            });
        }
        if !self.domain_size.is_power_of_two() {
            return Err(KeyError::DomainSize(self.domain_size));
        }

        let n_vars = self.n_vars as usize;
        check_len("IC", self.ic.len(), self.n_public as usize + 1)?;
        check_len("A", self.a.len(), n_vars)?;
        check_len("B1", self.b1.len(), n_vars)?;
        check_len("B2", self.b2.len(), n_vars)?;
        check_len("C", self.c.len(), n_vars)?;
        check_len("hExps", self.h_exps.len(), self.domain_size as usize)?;
        if u32::try_from(self.ccoefs.len()).is_err() {
            return Err(KeyError::TooLarge {
                name: "ccoefs",
                count: self.ccoefs.len(),
            });
        }

        let q = &self.q;
        let vk_g1 = [&self.alfa1, &self.beta1, &self.delta1];
        check_g1s(q, "vk_g1", vk_g1.into_iter())?;
        let vk_g2 = [&self.beta2, &self.gamma2, &self.delta2];
        check_g2s(q, "vk_g2", vk_g2.into_iter())?;
        check_g1s(q, "IC", self.ic.iter())?;
        check_g1s(q, "A", self.a.iter())?;
        check_g1s(q, "B1", self.b1.iter())?;
        check_g2s(q, "B2", self.b2.iter())?;
        check_g1s(q, "C", self.c.iter())?;
        check_g1s(q, "hExps", self.h_exps.iter())?;

        if let Some(index) = self.ccoefs.iter().position(|c| c.value >= self.r) {
            return Err(KeyError::CoefficientRange { index });
        }
        Ok(())
    }

    /// Indices `i <= n_public` whose C entry is not the point at infinity
    pub fn public_c_violations(&self) -> impl Iterator<Item = u32> + '_ {
        self.c
            .iter()
            .take(self.n_public as usize + 1)
            .enumerate()
            .filter(|(_, p)| !p.is_infinity())
            .map(|(i, _)| i as u32)
    }

    pub fn check_public_c(&self) -> Result<(), KeyError> {
        match self.public_c_violations().next() {
            Some(index) => Err(KeyError::PublicCNotInfinity { index }),
            None => Ok(()),
        }
    }

    /// Full write-side validation
    pub fn validate(&self) -> Result<(), KeyError> {
        self.validate_shape()?;
        self.check_public_c()
    }
}

fn check_len(name: &'static str, actual: usize, expected: usize) -> Result<(), KeyError> {
    if actual != expected {
        return Err(KeyError::Length {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

// Infinity points are written as zeros, so their coordinates are not checked.
fn check_g1s<'a>(
    q: &BigUint,
    name: &'static str,
    points: impl Iterator<Item = &'a G1Affine>,
) -> Result<(), KeyError> {
    for (index, p) in points.enumerate() {
        if !p.is_infinity() && (&p.x >= q || &p.y >= q) {
            return Err(KeyError::CoordinateRange { name, index });
        }
    }
    Ok(())
}

fn check_g2s<'a>(
    q: &BigUint,
    name: &'static str,
    points: impl Iterator<Item = &'a G2Affine>,
) -> Result<(), KeyError> {
    for (index, p) in points.enumerate() {
        let coords = [&p.x.c0, &p.x.c1, &p.y.c0, &p.y.c1];
        if !p.is_infinity() && coords.iter().any(|c| *c >= q) {
            return Err(KeyError::CoordinateRange { name, index });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::constants::{bn254_q, bn254_r};
    use crate::types::Fq2;

    fn g1(i: u32) -> G1Affine {
        G1Affine::new(BigUint::from(i), BigUint::from(i + 1))
    }

    fn g2(i: u32) -> G2Affine {
        G2Affine::new(
            Fq2::new(BigUint::from(i), BigUint::from(i + 1)),
            Fq2::new(BigUint::from(i + 2), BigUint::from(i + 3)),
        )
    }

    /// Small BN254-moduli key with `n_vars = 4`, `n_public = 1`, domain 4
    pub(crate) fn sample_key() -> ProvingKey {
        let n_vars = 4u32;
        let n_public = 1u32;
        ProvingKey {
            protocol: Protocol::Groth16,
            q: bn254_q(),
            r: bn254_r(),
            n_vars,
            n_public,
            domain_size: 4,
            alfa1: g1(1),
            beta1: g1(3),
            delta1: G1Affine::infinity(),
            beta2: g2(5),
            gamma2: g2(9),
            delta2: G2Affine::infinity(),
            ic: vec![g1(20), G1Affine::infinity()],
            ccoefs: vec![
                Coefficient {
                    matrix: Matrix::A,
                    constraint: 0,
                    signal: 1,
                    value: BigUint::from(5u32),
                },
                Coefficient {
                    matrix: Matrix::B,
                    constraint: 2,
                    signal: 3,
                    value: bn254_r() - 1u32,
                },
                // duplicate key is accepted
                Coefficient {
                    matrix: Matrix::B,
                    constraint: 2,
                    signal: 3,
                    value: BigUint::from(1u32),
                },
            ],
            a: (0..n_vars).map(|i| g1(100 + i)).collect(),
            b1: (0..n_vars).map(|i| g1(200 + i)).collect(),
            b2: (0..n_vars).map(|i| g2(300 + i)).collect(),
            c: (0..n_vars)
                .map(|i| {
                    if i <= n_public {
                        G1Affine::infinity()
                    } else {
                        g1(400 + i)
                    }
                })
                .collect(),
            h_exps: (0..4).map(|i| g1(500 + i)).collect(),
        }
    }

    #[test]
    fn test_sample_key_is_valid() {
        let key = sample_key();
        key.validate().unwrap();
        assert_eq!(key.n8q(), 32);
        assert_eq!(key.n8r(), 32);
    }

    #[test]
    fn test_public_not_below_vars() {
        let mut key = sample_key();
        key.n_public = 4;
        assert_eq!(
            key.validate(),
            Err(KeyError::PublicNotBelowVars {
                n_vars: 4,
                n_public: 4
            })
        );
    }

    #[test]
    fn test_wrong_ic_length() {
        let mut key = sample_key();
        key.ic.push(G1Affine::infinity());
        assert_eq!(
            key.validate(),
            Err(KeyError::Length {
                name: "IC",
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_public_c_must_be_infinity() {
        let mut key = sample_key();
        key.c[1] = g1(7);
        assert_eq!(key.validate_shape(), Ok(()));
        assert_eq!(
            key.validate(),
            Err(KeyError::PublicCNotInfinity { index: 1 })
        );
        assert_eq!(key.public_c_violations().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_domain_size_power_of_two() {
        let mut key = sample_key();
        key.domain_size = 3;
        key.h_exps.pop();
        assert_eq!(key.validate(), Err(KeyError::DomainSize(3)));
    }

    #[test]
    fn test_out_of_range_values() {
        let mut key = sample_key();
        key.b1[2].y = bn254_q();
        assert_eq!(
            key.validate(),
            Err(KeyError::CoordinateRange {
                name: "B1",
                index: 2
            })
        );

        let mut key = sample_key();
        key.ccoefs[0].value = bn254_r();
        assert_eq!(key.validate(), Err(KeyError::CoefficientRange { index: 0 }));
    }

    #[test]
    fn test_matrix_ids() {
        assert_eq!(Matrix::try_from(0), Ok(Matrix::A));
        assert_eq!(Matrix::try_from(1), Ok(Matrix::B));
        assert_eq!(Matrix::try_from(2), Err(2));
        assert_eq!(Matrix::B.id(), 1);
        assert_eq!(Protocol::from_tag(1), Some(Protocol::Groth16));
        assert_eq!(Protocol::from_tag(2), None);
    }
}
