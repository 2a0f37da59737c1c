//! Montgomery field codec
//!
//! A [`FieldCodec`] is built once per modulus and carries the Montgomery
//! radix `R = 2^(8*n8) mod p` together with `R^-1`, `R^2` and `R^-2`.
//! In-memory values are canonical; the wire holds `x*R mod p` as an
//! `n8`-byte little-endian integer. Section-4 coefficient values use the
//! doubly scaled form `x*R^2 mod p`.

use std::io::{Read, Seek, Write};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::binfile::{BinFileReader, BinFileWriter};
use crate::errors::{FieldError, RangeError, Result};
use crate::types::FieldElement;

/// Byte width used on the wire for a modulus: the smallest multiple of
/// 8 bytes that holds it.
pub fn n8_for(modulus: &BigUint) -> usize {
    let bits = modulus.bits().max(1) as usize;
    ((bits - 1) / 64 + 1) * 8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCodec {
    modulus: BigUint,
    n8: usize,
    label: &'static str,
    r: BigUint,
    r_inv: BigUint,
    r2: BigUint,
    r2_inv: BigUint,
}

impl FieldCodec {
    /// Build a codec for `modulus`, deriving the wire width from it
    pub fn new(modulus: BigUint) -> std::result::Result<Self, FieldError> {
        if modulus < BigUint::from(2u32) {
            return Err(FieldError::InvalidModulus);
        }
        let n8 = n8_for(&modulus);
        let r = (BigUint::one() << (8 * n8)) % &modulus;
        let r_inv = r.modinv(&modulus).ok_or(FieldError::InvalidModulus)?;
        let r2 = (&r * &r) % &modulus;
        let r2_inv = (&r_inv * &r_inv) % &modulus;
        Ok(Self {
            modulus,
            n8,
            label: "field",
            r,
            r_inv,
            r2,
            r2_inv,
        })
    }

    /// Name used in range errors ("q", "r", ...)
    pub fn named(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn n8(&self) -> usize {
        self.n8
    }

    pub fn is_canonical(&self, x: &FieldElement) -> bool {
        x < &self.modulus
    }

    pub fn to_montgomery(&self, x: &FieldElement) -> BigUint {
        debug_assert!(self.is_canonical(x));
        (x * &self.r) % &self.modulus
    }

    pub fn from_montgomery(&self, m: &BigUint) -> FieldElement {
        (m * &self.r_inv) % &self.modulus
    }

    /// `x*R mod p` as `n8` little-endian bytes
    pub fn encode(&self, x: &FieldElement) -> Vec<u8> {
        self.pad(self.to_montgomery(x))
    }

    /// Inverse of [`encode`](Self::encode). The wire integer must be reduced.
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<FieldElement, FieldError> {
        let m = self.reduced(bytes)?;
        Ok(self.from_montgomery(&m))
    }

    /// `x*R^2 mod p` as `n8` little-endian bytes
    pub fn encode_double(&self, x: &FieldElement) -> Vec<u8> {
        debug_assert!(self.is_canonical(x));
        self.pad((x * &self.r2) % &self.modulus)
    }

    /// Inverse of [`encode_double`](Self::encode_double)
    pub fn decode_double(&self, bytes: &[u8]) -> std::result::Result<FieldElement, FieldError> {
        let m = self.reduced(bytes)?;
        Ok((m * &self.r2_inv) % &self.modulus)
    }

    pub fn write<W: Write + Seek>(&self, w: &mut BinFileWriter<W>, x: &FieldElement) -> Result<()> {
        w.write_bytes(&self.encode(x))
    }

    pub fn write_double<W: Write + Seek>(
        &self,
        w: &mut BinFileWriter<W>,
        x: &FieldElement,
    ) -> Result<()> {
        w.write_bytes(&self.encode_double(x))
    }

    pub fn read<R: Read + Seek>(&self, r: &mut BinFileReader<R>) -> Result<FieldElement> {
        let buf = self.read_raw(r)?;
        self.decode(&buf).map_err(|_| self.range_error(r))
    }

    pub fn read_double<R: Read + Seek>(&self, r: &mut BinFileReader<R>) -> Result<FieldElement> {
        let buf = self.read_raw(r)?;
        self.decode_double(&buf).map_err(|_| self.range_error(r))
    }

    fn read_raw<R: Read + Seek>(&self, r: &mut BinFileReader<R>) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.n8];
        r.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn range_error<R: Read + Seek>(&self, r: &BinFileReader<R>) -> crate::errors::ZKeyError {
        RangeError {
            section: r.current_section().unwrap_or_default(),
            field: self.label,
        }
        .into()
    }

    fn reduced(&self, bytes: &[u8]) -> std::result::Result<BigUint, FieldError> {
        let m = BigUint::from_bytes_le(bytes);
        if m >= self.modulus {
            return Err(FieldError::NotReduced);
        }
        Ok(m)
    }

    fn pad(&self, m: BigUint) -> Vec<u8> {
        if m.is_zero() {
            return vec![0u8; self.n8];
        }
        let mut bytes = m.to_bytes_le();
        bytes.resize(self.n8, 0);
        bytes
    }
}
